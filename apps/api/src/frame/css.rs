//! Value parsing for the inline style declarations the templates emit.
//!
//! Only what the layout needs: lengths (`px`, `pt`, `mm`, `em`, `%`, bare
//! numbers), one-to-four value box shorthands, and `border` shorthands.

use crate::render::node::Style;

/// CSS px per millimetre at 96 dpi.
pub const PX_PER_MM: f32 = 96.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
    Auto,
}

impl Length {
    /// Resolves against `basis` (the containing width for percentages).
    pub fn resolve(self, basis: f32) -> Option<f32> {
        match self {
            Length::Px(px) => Some(px),
            Length::Percent(pct) => Some(basis * pct / 100.0),
            Length::Auto => None,
        }
    }
}

pub fn parse_length(value: &str, font_size: f32) -> Option<Length> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("auto") {
        return Some(Length::Auto);
    }
    let number = |suffix: &str| -> Option<f32> {
        value
            .strip_suffix(suffix)?
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
    };
    if let Some(n) = number("px") {
        Some(Length::Px(n))
    } else if let Some(n) = number("%") {
        Some(Length::Percent(n))
    } else if let Some(n) = number("rem") {
        Some(Length::Px(n * 16.0))
    } else if let Some(n) = number("em") {
        Some(Length::Px(n * font_size))
    } else if let Some(n) = number("pt") {
        Some(Length::Px(n * 96.0 / 72.0))
    } else if let Some(n) = number("mm") {
        Some(Length::Px(n * PX_PER_MM))
    } else {
        value
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Length::Px)
    }
}

/// Parses a length and resolves it to px, treating `auto` and garbage as 0.
pub fn px(value: &str, font_size: f32, basis: f32) -> f32 {
    parse_length(value, font_size)
        .and_then(|l| l.resolve(basis))
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Reads `{prefix}` as a 1–4 value shorthand, then lets the
/// `{prefix}-top|right|bottom|left` longhands override it.
pub fn edges(style: &Style, prefix: &str, font_size: f32, basis: f32) -> Edges {
    let mut out = Edges::default();
    if let Some(shorthand) = style.get(prefix) {
        let values: Vec<f32> = shorthand
            .split_whitespace()
            .map(|v| px(v, font_size, basis))
            .collect();
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l, ..] => (*t, *r, *b, *l),
            [] => (0.0, 0.0, 0.0, 0.0),
        };
        out = Edges {
            top,
            right,
            bottom,
            left,
        };
    }
    for (side, slot) in [
        ("top", &mut out.top),
        ("right", &mut out.right),
        ("bottom", &mut out.bottom),
        ("left", &mut out.left),
    ] {
        if let Some(value) = style.get(&format!("{prefix}-{side}")) {
            *slot = px(value, font_size, basis);
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Borders
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BorderSide {
    pub width: f32,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Borders {
    pub top: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
    pub left: Option<BorderSide>,
}

impl Borders {
    pub fn widths(&self) -> Edges {
        let w = |side: &Option<BorderSide>| side.as_ref().map_or(0.0, |s| s.width);
        Edges {
            top: w(&self.top),
            right: w(&self.right),
            bottom: w(&self.bottom),
            left: w(&self.left),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

const BORDER_STYLES: &[&str] = &[
    "solid", "dashed", "dotted", "double", "groove", "ridge", "inset", "outset",
];

/// Parses `"2px solid #1e40af"`. `none`, `hidden` and zero widths yield `None`.
pub fn parse_border(value: &str, font_size: f32, current_color: &str) -> Option<BorderSide> {
    let mut width = None;
    let mut color = None;
    let mut styled = false;
    for token in value.split_whitespace() {
        let lower = token.to_ascii_lowercase();
        if lower == "none" || lower == "hidden" {
            return None;
        }
        if BORDER_STYLES.contains(&lower.as_str()) {
            styled = true;
        } else if let Some(Length::Px(w)) = parse_length(token, font_size) {
            width = Some(w);
        } else {
            color = Some(token.to_string());
        }
    }
    if !styled {
        return None;
    }
    let width = width.unwrap_or(3.0);
    if width <= 0.0 {
        return None;
    }
    Some(BorderSide {
        width,
        color: color.unwrap_or_else(|| current_color.to_string()),
    })
}

pub fn borders(style: &Style, font_size: f32, current_color: &str) -> Borders {
    let all = style
        .get("border")
        .and_then(|v| parse_border(v, font_size, current_color));
    let side = |name: &str| match style.get(&format!("border-{name}")) {
        Some(value) => parse_border(value, font_size, current_color),
        None => all.clone(),
    };
    Borders {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

/// Whether a background value paints anything.
pub fn paints(color: &str) -> bool {
    let color = color.trim().to_ascii_lowercase();
    !(color.is_empty() || color == "transparent" || color == "none" || color == "inherit")
}

pub fn is_bold(weight: &str) -> bool {
    match weight.trim() {
        "bold" | "bolder" => true,
        other => other.parse::<u16>().map(|w| w >= 600).unwrap_or(false),
    }
}
