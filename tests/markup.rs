use serde_json::{Value, json};

use roster_pdf::{build_report, resolve};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn users() -> Vec<Value> {
    (1..=5)
        .map(|i| {
            json!({
                "name": format!("User {i}"),
                "email": format!("user{i}@example.com"),
            })
        })
        .collect()
}

#[test]
fn table_shape_follows_records_and_selection() {
    let selected = ["name".to_string(), "email".to_string()];
    let columns = resolve(&selected);
    let markup = build_report(&users(), &columns, "01.01.2026, 12:00");

    assert_eq!(count(&markup, "<thead>"), 1);
    assert_eq!(count(&markup, "<th "), 2);
    // header row plus five body rows
    assert_eq!(count(&markup, "<tr>"), 6);
    assert_eq!(count(&markup, "<td "), 10);

    let name_at = markup.find("Имя").expect("name header present");
    let email_at = markup.find("Email").expect("email header present");
    assert!(name_at < email_at);
}

#[test]
fn cell_styles_match_the_report_look() {
    let columns = resolve(&[]);
    let markup = build_report(&users(), &columns, "01.01.2026, 12:00");

    assert!(markup.contains(
        "background:#646cff;color:white;padding:6px 8px;text-align:left;\
         border:1px solid #ddd;font-family:Roboto,Arial,sans-serif;"
    ));
    assert!(markup.contains(
        "padding:5px 8px;border:1px solid #ddd;font-family:Roboto,Arial,sans-serif;"
    ));
    assert!(markup.contains("border-collapse:collapse"));
}

#[test]
fn field_values_are_escaped() {
    let tricky = vec![json!({
        "name": "<script>alert('x')</script>",
        "email": "a&b@example.com\"",
    })];
    let selected = ["name".to_string(), "email".to_string()];
    let markup = build_report(&tricky, &resolve(&selected), "01.01.2026, 12:00");

    assert!(!markup.contains("<script>"));
    assert!(markup.contains("&lt;script&gt;alert(&apos;x&apos;)&lt;/script&gt;"));
    assert!(markup.contains("a&amp;b@example.com&quot;"));
}

#[test]
fn empty_record_set_still_renders_header_and_title() {
    let markup = build_report(&[], &resolve(&[]), "01.01.2026, 12:00");

    assert_eq!(count(&markup, "<th "), 8);
    assert_eq!(count(&markup, "<td "), 0);
    assert!(markup.contains("Отчет по пользователям"));
    assert!(markup.contains("Дата генерации: "));
}

#[test]
fn stamp_appears_verbatim() {
    let markup = build_report(&[], &resolve(&[]), "24.08.2026, 09:30");
    assert!(markup.contains("Дата генерации: 24.08.2026, 09:30"));
}
