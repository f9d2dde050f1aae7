//! Inline style declarations for the injected markup.
//!
//! Only the properties the report document actually uses are understood;
//! unknown declarations are skipped without comment, the way a browser would.

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Border {
    pub(crate) width: f32,
    pub(crate) color: [u8; 3],
}

/// Resolved styling for one element. `None` means "not set here"; the
/// cascade in [`Style::apply`] and [`Style::inherit`] fills the gaps.
#[derive(Clone, Debug, Default)]
pub(crate) struct Style {
    pub(crate) font_size: Option<f32>,
    pub(crate) font_family: Option<Vec<String>>,
    pub(crate) bold: Option<bool>,
    pub(crate) color: Option<[u8; 3]>,
    pub(crate) background: Option<[u8; 3]>,
    pub(crate) alignment: Option<Alignment>,
    /// top, right, bottom, left
    pub(crate) margin: Option<[f32; 4]>,
    pub(crate) padding: Option<[f32; 4]>,
    pub(crate) border: Option<Border>,
}

impl Style {
    /// Overlay `inline` declarations onto this style; inline wins.
    pub(crate) fn apply(mut self, inline: &Style) -> Style {
        if inline.font_size.is_some() {
            self.font_size = inline.font_size;
        }
        if inline.font_family.is_some() {
            self.font_family = inline.font_family.clone();
        }
        if inline.bold.is_some() {
            self.bold = inline.bold;
        }
        if inline.color.is_some() {
            self.color = inline.color;
        }
        if inline.background.is_some() {
            self.background = inline.background;
        }
        if inline.alignment.is_some() {
            self.alignment = inline.alignment;
        }
        if inline.margin.is_some() {
            self.margin = inline.margin;
        }
        if inline.padding.is_some() {
            self.padding = inline.padding;
        }
        if inline.border.is_some() {
            self.border = inline.border;
        }
        self
    }

    /// Fill the inheritable properties still unset here from the parent.
    /// Box properties (margin, padding, border, background) never inherit.
    pub(crate) fn inherit(mut self, parent: &Style) -> Style {
        if self.font_size.is_none() {
            self.font_size = parent.font_size;
        }
        if self.font_family.is_none() {
            self.font_family = parent.font_family.clone();
        }
        if self.color.is_none() {
            self.color = parent.color;
        }
        if self.alignment.is_none() {
            self.alignment = parent.alignment;
        }
        self
    }
}

/// Built-in styling for the handful of elements the report uses, applied
/// beneath any inline declarations.
pub(crate) fn tag_defaults(tag: &str) -> Style {
    let mut style = Style::default();
    match tag {
        "h1" => {
            style.font_size = Some(32.0);
            style.bold = Some(true);
            style.margin = Some([21.4, 0.0, 21.4, 0.0]);
        }
        "p" => {
            style.margin = Some([16.0, 0.0, 16.0, 0.0]);
        }
        "th" => {
            style.bold = Some(true);
            style.alignment = Some(Alignment::Center);
        }
        "body" => {
            style.margin = Some([8.0, 8.0, 8.0, 8.0]);
        }
        _ => {}
    }
    style
}

/// Parse a `style` attribute value into a [`Style`].
pub(crate) fn parse_style(attr: &str) -> Style {
    let mut style = Style::default();
    for declaration in attr.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        match property.as_str() {
            "font-size" => style.font_size = parse_px(value),
            "font-family" => style.font_family = Some(parse_font_stack(value)),
            "font-weight" => style.bold = parse_weight(value),
            "color" => style.color = parse_color(value),
            "background" | "background-color" => style.background = parse_color(value),
            "text-align" => style.alignment = Some(parse_alignment(value)),
            "margin" => style.margin = parse_box_shorthand(value),
            "padding" => style.padding = parse_box_shorthand(value),
            "border" => style.border = parse_border(value),
            // Collapsed grid and full-width tables are the only supported
            // modes, so these carry no information.
            "border-collapse" | "width" => {}
            _ => {}
        }
    }
    style
}

fn parse_px(value: &str) -> Option<f32> {
    if value == "0" {
        return Some(0.0);
    }
    value.strip_suffix("px")?.trim().parse().ok()
}

fn parse_weight(value: &str) -> Option<bool> {
    match value {
        "bold" | "bolder" => Some(true),
        "normal" | "lighter" => Some(false),
        _ => value.parse::<u32>().ok().map(|w| w >= 600),
    }
}

fn parse_alignment(value: &str) -> Alignment {
    match value {
        "center" => Alignment::Center,
        "right" | "end" => Alignment::Right,
        _ => Alignment::Left,
    }
}

pub(crate) fn parse_color(value: &str) -> Option<[u8; 3]> {
    match value {
        "white" => return Some([255, 255, 255]),
        "black" => return Some([0, 0, 0]),
        _ => {}
    }
    let hex = value.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        _ => None,
    }
}

/// CSS box shorthand: one value covers all sides, two are vertical then
/// horizontal, three are top, horizontal, bottom, four are clockwise from
/// the top.
fn parse_box_shorthand(value: &str) -> Option<[f32; 4]> {
    let parts: Vec<f32> = value
        .split_whitespace()
        .map(parse_px)
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [all] => Some([*all; 4]),
        [v, h] => Some([*v, *h, *v, *h]),
        [t, h, b] => Some([*t, *h, *b, *h]),
        [t, r, b, l] => Some([*t, *r, *b, *l]),
        _ => None,
    }
}

fn parse_border(value: &str) -> Option<Border> {
    let mut width = None;
    let mut color = None;
    for part in value.split_whitespace() {
        if let Some(w) = parse_px(part) {
            width = Some(w);
            continue;
        }
        if let Some(c) = parse_color(part) {
            color = Some(c);
        }
    }
    Some(Border {
        width: width?,
        color: color.unwrap_or([0, 0, 0]),
    })
}

fn parse_font_stack(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|f| !f.is_empty())
        .collect()
}
