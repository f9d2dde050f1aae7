use serde_json::Value;

/// One catalog entry: record key plus display label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: &'static str,
    pub label: &'static str,
}

/// Every exportable column, in default export order.
pub const COLUMNS: [ColumnDescriptor; 8] = [
    ColumnDescriptor { key: "id", label: "ID" },
    ColumnDescriptor { key: "name", label: "Имя" },
    ColumnDescriptor { key: "username", label: "Логин" },
    ColumnDescriptor { key: "email", label: "Email" },
    ColumnDescriptor { key: "phone", label: "Телефон" },
    ColumnDescriptor { key: "website", label: "Сайт" },
    ColumnDescriptor { key: "company", label: "Компания" },
    ColumnDescriptor { key: "city", label: "Город" },
];

/// One resolved entry of the column plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
}

/// Resolve a column selection against the catalog.
///
/// An empty selection yields the whole catalog in catalog order. A non-empty
/// selection is honored verbatim: selection order, duplicates included. A key
/// without a catalog entry keeps the key itself as its label.
pub fn resolve(selected: &[String]) -> Vec<Column> {
    if selected.is_empty() {
        return COLUMNS
            .iter()
            .map(|c| Column {
                key: c.key.to_string(),
                label: c.label.to_string(),
            })
            .collect();
    }
    selected
        .iter()
        .map(|key| {
            let label = COLUMNS
                .iter()
                .find(|c| c.key == key.as_str())
                .map(|c| c.label.to_string())
                .unwrap_or_else(|| key.clone());
            Column {
                key: key.clone(),
                label,
            }
        })
        .collect()
}

/// Project one record field to its cell text.
///
/// `company` and `city` read the nested `company.name` and `address.city`
/// paths. Anything missing, non-addressable or null becomes the empty
/// string; this never fails, whatever shape the record has.
pub fn project(record: &Value, key: &str) -> String {
    let value = match key {
        "company" => record.get("company").and_then(|c| c.get("name")),
        "city" => record.get("address").and_then(|a| a.get("city")),
        _ => record.get(key),
    };
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
