//! Parses injected markup into the content tree the layout engine walks.
//!
//! The document arrives as well-formed XML with a DTD prologue, so
//! `roxmltree` with DTD parsing enabled handles it directly. Elements the
//! report never emits are skipped rather than rejected.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Error, Result};
use crate::render::style::{self, Style};

pub(crate) struct ContentTree {
    pub(crate) body: Style,
    pub(crate) blocks: Vec<Block>,
}

pub(crate) enum Block {
    Text(TextBlock),
    Table(TableBlock),
}

pub(crate) struct TextBlock {
    pub(crate) text: String,
    pub(crate) style: Style,
}

pub(crate) struct TableBlock {
    pub(crate) style: Style,
    pub(crate) header: Vec<Cell>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

pub(crate) struct Cell {
    pub(crate) text: String,
    pub(crate) style: Style,
}

pub(crate) fn parse(markup: &str) -> Result<ContentTree> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let document = Document::parse_with_options(markup, options)
        .map_err(|e| Error::Markup(format!("unparsable markup: {e}")))?;

    let body = document
        .root()
        .descendants()
        .find(|n| n.has_tag_name("body"))
        .ok_or_else(|| Error::Markup("markup has no body element".to_string()))?;

    let body_style = effective(&body, &Style::default());
    let mut blocks = Vec::new();
    for child in body.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "h1" | "p" => blocks.push(Block::Text(TextBlock {
                text: text_of(&child),
                style: effective(&child, &body_style),
            })),
            "table" => blocks.push(Block::Table(parse_table(&child, &body_style))),
            _ => {}
        }
    }

    Ok(ContentTree {
        body: body_style,
        blocks,
    })
}

fn parse_table(table: &Node, parent: &Style) -> TableBlock {
    let table_style = effective(table, parent);
    let mut header = Vec::new();
    let mut rows = Vec::new();

    for child in table.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "thead" => {
                for tr in child.children().filter(|n| n.has_tag_name("tr")) {
                    let cells = parse_row(&tr, &table_style);
                    if header.is_empty() {
                        header = cells;
                    } else {
                        rows.push(cells);
                    }
                }
            }
            "tbody" => {
                for tr in child.children().filter(|n| n.has_tag_name("tr")) {
                    rows.push(parse_row(&tr, &table_style));
                }
            }
            "tr" => rows.push(parse_row(&child, &table_style)),
            _ => {}
        }
    }

    TableBlock {
        style: table_style,
        header,
        rows,
    }
}

fn parse_row(tr: &Node, table_style: &Style) -> Vec<Cell> {
    tr.children()
        .filter(|n| n.has_tag_name("th") || n.has_tag_name("td"))
        .map(|cell| Cell {
            text: text_of(&cell),
            style: effective(&cell, table_style),
        })
        .collect()
}

/// Concatenated text content of a node, trimmed at the ends.
fn text_of(node: &Node) -> String {
    let text: String = node.descendants().filter_map(|n| n.text()).collect();
    text.trim().to_string()
}

/// Resolve the effective style of an element: built-in defaults for the
/// tag, overlaid with its inline `style` attribute, with inheritable
/// properties filled from the parent.
fn effective(node: &Node, parent: &Style) -> Style {
    let defaults = style::tag_defaults(node.tag_name().name());
    let inline = node
        .attribute("style")
        .map(style::parse_style)
        .unwrap_or_default();
    defaults.apply(&inline).inherit(parent)
}
