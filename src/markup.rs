use serde_json::Value;

use crate::columns::{Column, project};

/// Heading shown above the table.
pub(crate) const REPORT_TITLE: &str = "Отчет по пользователям";
/// Label in front of the generation timestamp.
pub(crate) const STAMP_LABEL: &str = "Дата генерации";
/// Two-digit day.month.year, comma, 24h clock.
pub(crate) const STAMP_FORMAT: &str = "%d.%m.%Y, %H:%M";

const HEADER_CELL_STYLE: &str = "background:#646cff;color:white;padding:6px 8px;text-align:left;border:1px solid #ddd;font-family:Roboto,Arial,sans-serif;";
const BODY_CELL_STYLE: &str =
    "padding:5px 8px;border:1px solid #ddd;font-family:Roboto,Arial,sans-serif;";

/// Escape text for element content and attribute values.
pub(crate) fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Build the self-contained report document: title, generation stamp and the
/// projected record table, styled inline.
///
/// Exactly one header row, one body row per record, cells in column-plan
/// order. Every dynamic string goes through [`escape_html`], and void
/// elements are self-closed so the off-screen renderer can parse the result
/// strictly.
pub fn build_report(records: &[Value], columns: &[Column], stamp: &str) -> String {
    let header_cells: String = columns
        .iter()
        .map(|c| format!("<th style=\"{HEADER_CELL_STYLE}\">{}</th>", escape_html(&c.label)))
        .collect();

    let body_rows: String = records
        .iter()
        .map(|record| {
            let cells: String = columns
                .iter()
                .map(|c| {
                    format!(
                        "<td style=\"{BODY_CELL_STYLE}\">{}</td>",
                        escape_html(&project(record, &c.key))
                    )
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"UTF-8\"/>\n\
         <link href=\"https://fonts.googleapis.com/css2?family=Roboto:wght@400;700&amp;display=swap\" rel=\"stylesheet\"/>\n\
         </head>\n\
         <body style=\"margin:0;padding:20px;font-family:Roboto,Arial,sans-serif;background:white;\">\n\
         <h1 style=\"text-align:center;font-size:18px;margin:0 0 10px;font-weight:700;\">{title}</h1>\n\
         <p style=\"text-align:center;font-size:10px;margin:0 0 15px;color:#333;\">{label}: {stamp}</p>\n\
         <table style=\"width:100%;border-collapse:collapse;font-size:9px;font-family:Roboto,Arial,sans-serif;\">\n\
         <thead><tr>{header_cells}</tr></thead>\n\
         <tbody>{body_rows}</tbody>\n\
         </table>\n\
         </body>\n\
         </html>",
        title = escape_html(REPORT_TITLE),
        label = escape_html(STAMP_LABEL),
        stamp = escape_html(stamp),
    )
}
