//! Positions the content tree inside the surface viewport.
//!
//! Output is a flat draw list in CSS pixel coordinates with the origin at
//! the top-left corner. Heights grow with content; the viewport width is
//! the only fixed dimension.

use crate::fonts::{FontBook, FontId};
use crate::render::content::{Block, Cell, ContentTree, TableBlock, TextBlock};
use crate::render::style::{Alignment, Border, Style};

pub(crate) const DEFAULT_FONT_SIZE: f32 = 16.0;

pub(crate) enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [u8; 3],
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: FontId,
        size: f32,
        color: [u8; 3],
    },
}

pub(crate) struct DrawList {
    pub(crate) ops: Vec<DrawOp>,
    /// Total document height in CSS pixels, including the body box.
    pub(crate) content_height: f32,
}

pub(crate) fn lay_out(tree: &ContentTree, width: f32, fonts: &mut FontBook) -> DrawList {
    let margin = tree.body.margin.unwrap_or([0.0; 4]);
    let padding = tree.body.padding.unwrap_or([0.0; 4]);
    let left = margin[3] + padding[3];
    let content_width = (width - left - margin[1] - padding[1]).max(0.0);

    let mut ops = Vec::new();
    let mut y = margin[0] + padding[0];
    for block in &tree.blocks {
        y = match block {
            Block::Text(text) => lay_out_text(text, left, y, content_width, fonts, &mut ops),
            Block::Table(table) => lay_out_table(table, left, y, content_width, fonts, &mut ops),
        };
    }

    DrawList {
        ops,
        content_height: y + padding[2] + margin[2],
    }
}

fn font_for(style: &Style, fonts: &mut FontBook) -> FontId {
    let families: &[String] = style.font_family.as_deref().unwrap_or(&[]);
    fonts.resolve(families, style.bold.unwrap_or(false))
}

fn lay_out_text(
    block: &TextBlock,
    left: f32,
    mut y: f32,
    width: f32,
    fonts: &mut FontBook,
    ops: &mut Vec<DrawOp>,
) -> f32 {
    let margin = block.style.margin.unwrap_or([0.0; 4]);
    let size = block.style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
    let font = font_for(&block.style, fonts);
    let color = block.style.color.unwrap_or([0, 0, 0]);
    let alignment = block.style.alignment.unwrap_or(Alignment::Left);
    let line_h = size * fonts.line_h_ratio(font);
    let ascent = size * fonts.ascender_ratio(font);

    y += margin[0];
    for line in wrap_text(&block.text, font, size, width, fonts) {
        let line_width = fonts.text_width(font, &line, size);
        let x = match alignment {
            Alignment::Left => left,
            Alignment::Center => left + (width - line_width) / 2.0,
            Alignment::Right => left + width - line_width,
        };
        ops.push(DrawOp::Text {
            x,
            baseline: y + ascent,
            text: line,
            font,
            size,
            color,
        });
        y += line_h;
    }
    y + margin[2]
}

/// Greedy word wrap. Words never break internally; a word wider than the
/// available width gets a line of its own and overflows.
fn wrap_text(
    text: &str,
    font: FontId,
    size: f32,
    max_width: f32,
    fonts: &mut FontBook,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && fonts.text_width(font, &candidate, size) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn lay_out_table(
    table: &TableBlock,
    left: f32,
    mut y: f32,
    width: f32,
    fonts: &mut FontBook,
    ops: &mut Vec<DrawOp>,
) -> f32 {
    let ncols = table
        .rows
        .iter()
        .map(Vec::len)
        .fold(table.header.len(), usize::max);
    if ncols == 0 {
        return y;
    }

    let margin = table.style.margin.unwrap_or([0.0; 4]);
    y += margin[0];

    let widths = fit_columns(table, ncols, width, fonts);
    // The collapsed grid uses one border for every edge; take it from the
    // first cell that declares one.
    let border = table
        .header
        .iter()
        .chain(table.rows.iter().flatten())
        .find_map(|cell| cell.style.border);

    let mut row_edges = vec![y];
    if !table.header.is_empty() {
        y = lay_out_row(&table.header, &widths, left, y, border, fonts, ops);
        row_edges.push(y);
    }
    for row in &table.rows {
        y = lay_out_row(row, &widths, left, y, border, fonts, ops);
        row_edges.push(y);
    }

    if let Some(border) = border
        && row_edges.len() > 1
    {
        draw_grid(&row_edges, &widths, left, border, ops);
    }

    y + margin[2]
}

struct PreparedCell {
    lines: Vec<String>,
    font: FontId,
    size: f32,
    color: [u8; 3],
    background: Option<[u8; 3]>,
    alignment: Alignment,
    padding: [f32; 4],
    line_h: f32,
    ascent: f32,
}

fn lay_out_row(
    cells: &[Cell],
    widths: &[f32],
    left: f32,
    y: f32,
    border: Option<Border>,
    fonts: &mut FontBook,
    ops: &mut Vec<DrawOp>,
) -> f32 {
    let mut prepared = Vec::with_capacity(cells.len());
    let mut row_h: f32 = 0.0;
    for (cell, &col_w) in cells.iter().zip(widths) {
        let size = cell.style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let font = font_for(&cell.style, fonts);
        let padding = cell.style.padding.unwrap_or([0.0; 4]);
        let text_width = (col_w - padding[1] - padding[3]).max(1.0);
        let lines = wrap_text(&cell.text, font, size, text_width, fonts);
        let line_h = size * fonts.line_h_ratio(font);
        let content_h = padding[0] + lines.len() as f32 * line_h + padding[2];
        row_h = row_h.max(content_h);
        prepared.push(PreparedCell {
            lines,
            font,
            size,
            color: cell.style.color.unwrap_or([0, 0, 0]),
            background: cell.style.background,
            alignment: cell.style.alignment.unwrap_or(Alignment::Left),
            padding,
            line_h,
            ascent: size * fonts.ascender_ratio(font),
        });
    }
    // Each row carries one collapsed border edge.
    row_h += border.map_or(0.0, |b| b.width);

    let mut x = left;
    for (cell, &col_w) in prepared.iter().zip(widths) {
        if let Some(background) = cell.background {
            ops.push(DrawOp::Rect {
                x,
                y,
                w: col_w,
                h: row_h,
                color: background,
            });
        }
        let text_width = (col_w - cell.padding[1] - cell.padding[3]).max(1.0);
        let mut line_y = y + cell.padding[0];
        for line in &cell.lines {
            let line_width = fonts.text_width(cell.font, line, cell.size);
            let line_x = match cell.alignment {
                Alignment::Left => x + cell.padding[3],
                Alignment::Center => x + cell.padding[3] + (text_width - line_width) / 2.0,
                Alignment::Right => x + col_w - cell.padding[1] - line_width,
            };
            ops.push(DrawOp::Text {
                x: line_x,
                baseline: line_y + cell.ascent,
                text: line.clone(),
                font: cell.font,
                size: cell.size,
                color: cell.color,
            });
            line_y += cell.line_h;
        }
        x += col_w;
    }

    y + row_h
}

/// Distribute the table width over its columns. Every column starts from
/// an equal share; columns whose longest word does not fit grow to their
/// minimum, the others give up width proportionally, and the result is
/// scaled back so the table keeps its declared width.
fn fit_columns(table: &TableBlock, ncols: usize, total: f32, fonts: &mut FontBook) -> Vec<f32> {
    let mut min_widths = vec![0.0f32; ncols];
    for row in std::iter::once(&table.header).chain(table.rows.iter()) {
        for (i, cell) in row.iter().enumerate() {
            let size = cell.style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
            let font = font_for(&cell.style, fonts);
            let padding = cell.style.padding.unwrap_or([0.0; 4]);
            let pad_h = padding[1] + padding[3];
            min_widths[i] = min_widths[i].max(pad_h);
            for word in cell.text.split_whitespace() {
                let needed = fonts.text_width(font, word, size) + pad_h;
                min_widths[i] = min_widths[i].max(needed);
            }
        }
    }

    let mut widths = vec![total / ncols as f32; ncols];
    let extra: f32 = widths
        .iter()
        .zip(&min_widths)
        .map(|(w, m)| (m - w).max(0.0))
        .sum();
    if extra > 0.0 {
        let shrinkable: f32 = widths
            .iter()
            .zip(&min_widths)
            .map(|(w, m)| (w - m).max(0.0))
            .sum();
        let factor = if shrinkable > 0.0 {
            (extra / shrinkable).min(1.0)
        } else {
            0.0
        };
        for (w, m) in widths.iter_mut().zip(&min_widths) {
            if *w < *m {
                *w = *m;
            } else {
                *w -= (*w - *m) * factor;
            }
        }
        let sum: f32 = widths.iter().sum();
        if sum > 0.0 {
            let scale = total / sum;
            for w in widths.iter_mut() {
                *w *= scale;
            }
        }
    }
    widths
}

fn draw_grid(row_edges: &[f32], widths: &[f32], left: f32, border: Border, ops: &mut Vec<DrawOp>) {
    let half = border.width / 2.0;
    let top = row_edges[0];
    let bottom = row_edges[row_edges.len() - 1];
    let table_width: f32 = widths.iter().sum();

    for &edge in row_edges {
        ops.push(DrawOp::Rect {
            x: left - half,
            y: edge - half,
            w: table_width + border.width,
            h: border.width,
            color: border.color,
        });
    }
    let mut x = left;
    ops.push(DrawOp::Rect {
        x: x - half,
        y: top,
        w: border.width,
        h: bottom - top,
        color: border.color,
    });
    for &w in widths {
        x += w;
        ops.push(DrawOp::Rect {
            x: x - half,
            y: top,
            w: border.width,
            h: bottom - top,
            color: border.color,
        });
    }
}
