//! Box layout over a `Surface`.
//!
//! A small subset of CSS visual formatting, enough for the templates:
//! - block boxes stack vertically with margins, borders and padding
//!   (`box-sizing: border-box`, no margin collapsing);
//! - `display: flex` lays children out in rows with `gap`, explicit or
//!   percentage widths, shrink-to-fit, `flex-grow`, `flex-wrap` and
//!   `justify-content`;
//! - runs of text and inline elements are broken into lines greedily using
//!   the static glyph tables in `metrics`;
//! - `display: none` subtrees produce no boxes.
//!
//! Inheritable text properties (font, colour, line height, alignment,
//! decoration, transform, visibility) cascade down through `TextStyle`.

use crate::frame::css::{self, Borders, Edges, Length};
use crate::frame::metrics::FontFamily;
use crate::frame::surface::{LiveKind, NodeId, Surface};
use crate::render::node::Style;

const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_LINE_HEIGHT: f32 = 1.2;
/// Baseline position within a line box, as a fraction of the font size below
/// the line's vertical centre.
const BASELINE_OFFSET: f32 = 0.35;

const INLINE_TAGS: &[&str] = &["a", "span", "strong", "b", "em", "i", "small", "code", "br"];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inherited text style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
    /// Multiple of `font_size`.
    pub line_height: f32,
    pub align: TextAlign,
    pub underline: bool,
    pub uppercase: bool,
    pub visible: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_size: DEFAULT_FONT_SIZE,
            family: FontFamily::Sans,
            bold: false,
            italic: false,
            color: "#000000".to_string(),
            line_height: DEFAULT_LINE_HEIGHT,
            align: TextAlign::Left,
            underline: false,
            uppercase: false,
            visible: true,
        }
    }
}

impl TextStyle {
    /// The style of an element with `tag` and inline `style`, given its
    /// parent's computed style.
    pub fn cascade(&self, tag: &str, style: &Style) -> TextStyle {
        let mut out = self.clone();
        match tag {
            "h1" | "h2" | "h3" | "h4" | "strong" | "b" | "th" => out.bold = true,
            "em" | "i" => out.italic = true,
            _ => {}
        }
        if let Some(size) = style
            .get("font-size")
            .and_then(|v| css::parse_length(v, self.font_size))
            .and_then(|l| l.resolve(self.font_size))
        {
            out.font_size = size.max(0.0);
        }
        if let Some(family) = style.get("font-family") {
            out.family = FontFamily::from_css(family);
        }
        if let Some(weight) = style.get("font-weight") {
            out.bold = css::is_bold(weight);
        }
        if let Some(font_style) = style.get("font-style") {
            out.italic = matches!(font_style.trim(), "italic" | "oblique");
        }
        if let Some(color) = style.get("color").map(str::trim) {
            if !matches!(color, "inherit" | "currentColor" | "currentcolor") {
                out.color = color.to_string();
            }
        }
        if let Some(line_height) = style.get("line-height").map(str::trim) {
            out.line_height = if line_height == "normal" {
                DEFAULT_LINE_HEIGHT
            } else if let Ok(multiple) = line_height.parse::<f32>() {
                multiple.max(0.0)
            } else {
                match css::parse_length(line_height, out.font_size) {
                    Some(Length::Px(px)) if out.font_size > 0.0 => px / out.font_size,
                    Some(Length::Percent(pct)) => pct / 100.0,
                    _ => out.line_height,
                }
            };
        }
        if let Some(align) = style.get("text-align") {
            out.align = match align.trim() {
                "center" => TextAlign::Center,
                "right" | "end" => TextAlign::Right,
                _ => TextAlign::Left,
            };
        }
        if let Some(decoration) = style.get("text-decoration") {
            out.underline = decoration.contains("underline");
        }
        if let Some(transform) = style.get("text-transform") {
            out.uppercase = transform.trim() == "uppercase";
        }
        if let Some(visibility) = style.get("visibility") {
            out.visible = !matches!(visibility.trim(), "hidden" | "collapse");
        }
        out
    }

    pub fn line_px(&self) -> f32 {
        self.font_size * self.line_height
    }

    pub fn measure(&self, text: &str) -> f32 {
        self.family
            .metrics()
            .measure_px(text, self.font_size, self.bold)
    }

    pub fn space(&self) -> f32 {
        self.family.metrics().space_px(self.font_size)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout output
// ────────────────────────────────────────────────────────────────────────────

/// A run of words on one line sharing a source node and style.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Element the text belongs to.
    pub node: NodeId,
    pub text: String,
    pub x: f32,
    pub width: f32,
    /// Whether a space separates this fragment from the previous one.
    pub space_before: bool,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    pub y: f32,
    pub height: f32,
    pub baseline: f32,
    pub fragments: Vec<Fragment>,
}

impl LineBox {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 && fragment.space_before {
                out.push(' ');
            }
            out.push_str(&fragment.text);
        }
        out
    }

    pub fn right(&self) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.x + f.width)
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub node: NodeId,
    /// Border box.
    pub rect: Rect,
    pub margin: Edges,
    pub background: Option<String>,
    pub borders: Borders,
    pub visible: bool,
    /// Lines of inline content placed directly in this box.
    pub lines: Vec<LineBox>,
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    pub fn outer_height(&self) -> f32 {
        self.margin.top + self.rect.height + self.margin.bottom
    }

    /// Right-most and bottom-most coordinates of anything in this subtree.
    pub fn extent(&self) -> (f32, f32) {
        let mut right = self.rect.right();
        let mut bottom = self.rect.bottom();
        for line in &self.lines {
            right = right.max(line.right());
            bottom = bottom.max(line.y + line.height);
        }
        for child in &self.children {
            let (r, b) = child.extent();
            right = right.max(r);
            bottom = bottom.max(b);
        }
        (right, bottom)
    }

    /// Preorder visit of this box and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a LayoutBox)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn find(&self, predicate: impl Fn(&LayoutBox) -> bool) -> Vec<&LayoutBox> {
        let mut found = Vec::new();
        self.walk(&mut |b| {
            if predicate(b) {
                found.push(b);
            }
        });
        found
    }

    /// Text of every line in this subtree, in paint order.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines: Vec<(f32, f32, String)> = Vec::new();
        self.walk(&mut |b| {
            for line in &b.lines {
                let x = line.fragments.first().map_or(0.0, |f| f.x);
                lines.push((line.y, x, line.text()));
            }
        });
        lines.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        lines.into_iter().map(|(_, _, text)| text).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn layout_root(surface: &Surface, id: NodeId, width: f32) -> Option<LayoutBox> {
    let inherited = inherited_style(surface, id);
    Engine { surface }.block(id, 0.0, 0.0, width, &inherited, false)
}

/// Computed text style of `id`'s parent, cascaded from the surface root.
fn inherited_style(surface: &Surface, id: NodeId) -> TextStyle {
    let mut chain = Vec::new();
    let mut cursor = surface.node(id).parent;
    while let Some(parent) = cursor {
        chain.push(parent);
        cursor = surface.node(parent).parent;
    }
    chain.iter().rev().fold(TextStyle::default(), |acc, ancestor| {
        match &surface.node(*ancestor).kind {
            LiveKind::Element { tag, style, .. } => acc.cascade(tag, style),
            LiveKind::Text(_) => acc,
        }
    })
}

fn display(style: &Style) -> &str {
    style.get("display").map(str::trim).unwrap_or("")
}

enum Token {
    Word {
        node: NodeId,
        text: String,
        space_before: bool,
        style: TextStyle,
        width: f32,
    },
    Break,
}

struct FlexItem {
    node: NodeId,
    basis: f32,
    /// Floor when shrinking: the item's min-content width.
    min: f32,
    grow: f32,
    shrinks: bool,
}

/// Min-content and max-content widths, margins included.
#[derive(Debug, Clone, Copy, Default)]
struct Intrinsic {
    min: f32,
    max: f32,
}

impl Intrinsic {
    fn widest(self, other: Intrinsic) -> Intrinsic {
        Intrinsic {
            min: self.min.max(other.min),
            max: self.max.max(other.max),
        }
    }
}

struct Engine<'a> {
    surface: &'a Surface,
}

impl Engine<'_> {
    /// Lays out element `id` in a slot at (`x`, `y`) that is `avail` px wide.
    /// With `stretch`, the box fills the slot regardless of its own `width`.
    fn block(
        &self,
        id: NodeId,
        x: f32,
        y: f32,
        avail: f32,
        parent: &TextStyle,
        stretch: bool,
    ) -> Option<LayoutBox> {
        let LiveKind::Element { tag, style, .. } = &self.surface.node(id).kind else {
            return None;
        };
        if display(style) == "none" {
            return None;
        }
        let text = parent.cascade(tag, style);
        let fs = text.font_size;
        let margin = css::edges(style, "margin", fs, avail);
        let padding = css::edges(style, "padding", fs, avail);
        let borders = css::borders(style, fs, &text.color);
        let border = borders.widths();

        let mut width = avail - margin.horizontal();
        if !stretch {
            if let Some(explicit) = style
                .get("width")
                .and_then(|v| css::parse_length(v, fs))
                .and_then(|l| l.resolve(avail))
            {
                width = explicit;
            }
        }
        if let Some(max) = style
            .get("max-width")
            .and_then(|v| css::parse_length(v, fs))
            .and_then(|l| l.resolve(avail))
        {
            width = width.min(max);
        }
        let width = width.max(0.0);

        let content_x = x + margin.left + border.left + padding.left;
        let content_y = y + margin.top + border.top + padding.top;
        let content_w = (width - border.horizontal() - padding.horizontal()).max(0.0);

        let (children, lines, content_h) = if display(style) == "flex" {
            self.flex(id, style, content_x, content_y, content_w, &text)
        } else {
            self.flow(id, content_x, content_y, content_w, &text)
        };

        let mut height = content_h + padding.vertical() + border.vertical();
        if let Some(Length::Px(h)) = style.get("height").and_then(|v| css::parse_length(v, fs)) {
            height = h;
        }
        if let Some(Length::Px(min)) = style
            .get("min-height")
            .and_then(|v| css::parse_length(v, fs))
        {
            height = height.max(min);
        }

        let background = style
            .get("background-color")
            .or_else(|| style.get("background"))
            .filter(|c| css::paints(c))
            .map(|c| c.trim().to_string());

        Some(LayoutBox {
            node: id,
            rect: Rect {
                x: x + margin.left,
                y: y + margin.top,
                width,
                height: height.max(0.0),
            },
            margin,
            background,
            borders,
            visible: text.visible,
            lines,
            children,
        })
    }

    fn is_inline(&self, id: NodeId) -> bool {
        match &self.surface.node(id).kind {
            LiveKind::Text(_) => true,
            LiveKind::Element { tag, style, .. } => match display(style) {
                "block" | "flex" | "list-item" => false,
                "inline" | "inline-block" | "inline-flex" => true,
                _ => INLINE_TAGS.contains(&tag.as_str()),
            },
        }
    }

    /// Normal flow: block children stack, inline runs become line boxes.
    fn flow(
        &self,
        id: NodeId,
        x: f32,
        y: f32,
        width: f32,
        text: &TextStyle,
    ) -> (Vec<LayoutBox>, Vec<LineBox>, f32) {
        let mut cursor = y;
        let mut boxes = Vec::new();
        let mut lines = Vec::new();
        let mut run: Vec<NodeId> = Vec::new();

        for &child in &self.surface.node(id).children {
            if self.is_inline(child) {
                run.push(child);
                continue;
            }
            if !run.is_empty() {
                let (mut placed, height) = self.inline(&run, x, cursor, width, text);
                lines.append(&mut placed);
                cursor += height;
                run.clear();
            }
            if let Some(b) = self.block(child, x, cursor, width, text, false) {
                cursor += b.outer_height();
                boxes.push(b);
            }
        }
        if !run.is_empty() {
            let (mut placed, height) = self.inline(&run, x, cursor, width, text);
            lines.append(&mut placed);
            cursor += height;
        }
        (boxes, lines, cursor - y)
    }

    fn tokens(&self, run: &[NodeId], text: &TextStyle) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pending_space = false;
        for &id in run {
            self.collect_tokens(id, text, &mut tokens, &mut pending_space);
        }
        tokens
    }

    fn collect_tokens(
        &self,
        id: NodeId,
        inherited: &TextStyle,
        tokens: &mut Vec<Token>,
        pending_space: &mut bool,
    ) {
        let node = self.surface.node(id);
        match &node.kind {
            LiveKind::Text(raw) => {
                let owner = node.parent.unwrap_or(id);
                let mut push = |word: &mut String, pending: &mut bool| {
                    let text = if inherited.uppercase {
                        word.to_uppercase()
                    } else {
                        std::mem::take(word)
                    };
                    word.clear();
                    tokens.push(Token::Word {
                        node: owner,
                        width: inherited.measure(&text),
                        text,
                        space_before: *pending,
                        style: inherited.clone(),
                    });
                    *pending = false;
                };
                let mut word = String::new();
                for ch in raw.chars() {
                    if ch.is_whitespace() && ch != '\u{00a0}' {
                        if !word.is_empty() {
                            push(&mut word, pending_space);
                        }
                        *pending_space = true;
                    } else {
                        word.push(ch);
                    }
                }
                if !word.is_empty() {
                    push(&mut word, pending_space);
                }
            }
            LiveKind::Element { tag, style, .. } => {
                if display(style) == "none" {
                    return;
                }
                if tag == "br" {
                    tokens.push(Token::Break);
                    *pending_space = false;
                    return;
                }
                let computed = inherited.cascade(tag, style);
                for &child in &node.children {
                    self.collect_tokens(child, &computed, tokens, pending_space);
                }
            }
        }
    }

    /// Breaks an inline run into lines no wider than `width` (a single word
    /// wider than the line overflows on its own line).
    fn inline(
        &self,
        run: &[NodeId],
        x: f32,
        y: f32,
        width: f32,
        block: &TextStyle,
    ) -> (Vec<LineBox>, f32) {
        let tokens = self.tokens(run, block);
        if tokens.is_empty() {
            return (Vec::new(), 0.0);
        }

        let mut lines = Vec::new();
        let mut cursor = y;
        let mut current: Vec<Fragment> = Vec::new();
        let mut line_width = 0.0_f32;

        let mut finish = |current: &mut Vec<Fragment>, line_width: &mut f32, cursor: &mut f32| {
            let line = finish_line(std::mem::take(current), *line_width, x, *cursor, width, block);
            *cursor += line.height;
            lines.push(line);
            *line_width = 0.0;
        };

        for token in tokens {
            match token {
                Token::Break => finish(&mut current, &mut line_width, &mut cursor),
                Token::Word {
                    node,
                    text,
                    space_before,
                    style,
                    width: word_width,
                } => {
                    let mut space = if current.is_empty() || !space_before {
                        0.0
                    } else {
                        style.space()
                    };
                    if !current.is_empty() && line_width + space + word_width > width {
                        finish(&mut current, &mut line_width, &mut cursor);
                        space = 0.0;
                    }
                    let start = line_width + space;
                    line_width = start + word_width;
                    match current.last_mut() {
                        Some(last) if last.node == node && last.style == style => {
                            if space > 0.0 {
                                last.text.push(' ');
                            }
                            last.text.push_str(&text);
                            last.width = line_width - last.x;
                        }
                        _ => current.push(Fragment {
                            node,
                            text,
                            x: start,
                            width: word_width,
                            space_before: space > 0.0,
                            style,
                        }),
                    }
                }
            }
        }
        if !current.is_empty() {
            finish(&mut current, &mut line_width, &mut cursor);
        }
        (lines, cursor - y)
    }

    fn flex(
        &self,
        id: NodeId,
        style: &Style,
        x: f32,
        y: f32,
        width: f32,
        text: &TextStyle,
    ) -> (Vec<LayoutBox>, Vec<LineBox>, f32) {
        let fs = text.font_size;
        let (row_gap, column_gap) = gaps(style, fs, width);
        let wrap = matches!(style.get("flex-wrap").map(str::trim), Some("wrap"));
        let justify = style.get("justify-content").map(str::trim).unwrap_or("flex-start");

        let items: Vec<FlexItem> = self
            .surface
            .node(id)
            .children
            .iter()
            .filter_map(|&child| self.flex_item(child, width, text))
            .collect();
        if items.is_empty() {
            return (Vec::new(), Vec::new(), 0.0);
        }

        let mut rows: Vec<Vec<FlexItem>> = Vec::new();
        let mut used = 0.0_f32;
        for item in items {
            match rows.last_mut() {
                Some(row) if !wrap || used + column_gap + item.basis <= width => {
                    used += column_gap + item.basis;
                    row.push(item);
                }
                _ => {
                    used = item.basis;
                    rows.push(vec![item]);
                }
            }
        }

        let mut boxes = Vec::new();
        let mut cursor = y;
        for (row_index, mut row) in rows.into_iter().enumerate() {
            if row_index > 0 {
                cursor += row_gap;
            }
            let gaps_total = column_gap * (row.len() - 1) as f32;
            let mut used: f32 = row.iter().map(|i| i.basis).sum::<f32>() + gaps_total;

            if used > width {
                shrink(&mut row, used - width);
                used = row.iter().map(|i| i.basis).sum::<f32>() + gaps_total;
            }
            let mut free = (width - used).max(0.0);
            let grow: f32 = row.iter().map(|i| i.grow).sum();
            if free > 0.0 && grow > 0.0 {
                for item in row.iter_mut() {
                    item.basis += free * item.grow / grow;
                }
                free = 0.0;
            }

            let n = row.len() as f32;
            let (mut offset, between) = match justify {
                "center" => (free / 2.0, column_gap),
                "flex-end" | "end" | "right" => (free, column_gap),
                "space-between" if row.len() > 1 => (0.0, column_gap + free / (n - 1.0)),
                "space-around" => (free / n / 2.0, column_gap + free / n),
                "space-evenly" => (free / (n + 1.0), column_gap + free / (n + 1.0)),
                _ => (0.0, column_gap),
            };

            let mut row_height = 0.0_f32;
            for item in &row {
                if let Some(b) = self.block(item.node, x + offset, cursor, item.basis, text, true) {
                    row_height = row_height.max(b.outer_height());
                    boxes.push(b);
                }
                offset += item.basis + between;
            }
            cursor += row_height;
        }
        (boxes, Vec::new(), cursor - y)
    }

    fn flex_item(&self, id: NodeId, container_width: f32, parent: &TextStyle) -> Option<FlexItem> {
        let LiveKind::Element { tag, style, .. } = &self.surface.node(id).kind else {
            return None;
        };
        if display(style) == "none" {
            return None;
        }
        let fs = parent.cascade(tag, style).font_size;
        let number = |value: Option<&str>| {
            value
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|n| n.is_finite() && *n >= 0.0)
        };
        let grow = number(
            style
                .get("flex-grow")
                .or_else(|| style.get("flex").and_then(|v| v.split_whitespace().next())),
        )
        .unwrap_or(0.0);
        let shrinks = number(style.get("flex-shrink")).map_or(true, |s| s > 0.0);

        let content = self.intrinsic(id, parent);
        let explicit = style
            .get("width")
            .or_else(|| style.get("flex-basis"))
            .and_then(|v| css::parse_length(v, fs))
            .and_then(|l| l.resolve(container_width));
        let basis = match explicit {
            Some(width) => width + css::edges(style, "margin", fs, container_width).horizontal(),
            None => content.max,
        };
        Some(FlexItem {
            node: id,
            basis,
            min: content.min.min(basis),
            grow,
            shrinks,
        })
    }

    fn intrinsic(&self, id: NodeId, parent: &TextStyle) -> Intrinsic {
        let LiveKind::Element { tag, style, .. } = &self.surface.node(id).kind else {
            return Intrinsic::default();
        };
        if display(style) == "none" {
            return Intrinsic::default();
        }
        let text = parent.cascade(tag, style);
        let fs = text.font_size;
        let margin = css::edges(style, "margin", fs, 0.0);
        let padding = css::edges(style, "padding", fs, 0.0);
        let border = css::borders(style, fs, &text.color).widths();
        let chrome = margin.horizontal() + padding.horizontal() + border.horizontal();

        if let Some(Length::Px(width)) = style.get("width").and_then(|v| css::parse_length(v, fs)) {
            let outer = width + margin.horizontal();
            return Intrinsic {
                min: outer,
                max: outer,
            };
        }

        let children = &self.surface.node(id).children;
        let content = if display(style) == "flex" {
            let (_, column_gap) = gaps(style, fs, 0.0);
            let parts: Vec<Intrinsic> = children
                .iter()
                .filter(|&&c| self.surface.node(c).text().is_none())
                .map(|&c| self.intrinsic(c, &text))
                .collect();
            let gaps_total = column_gap * parts.len().saturating_sub(1) as f32;
            let wraps = matches!(style.get("flex-wrap").map(str::trim), Some("wrap"));
            Intrinsic {
                min: if wraps {
                    parts.iter().map(|p| p.min).fold(0.0, f32::max)
                } else {
                    parts.iter().map(|p| p.min).sum::<f32>() + gaps_total
                },
                max: parts.iter().map(|p| p.max).sum::<f32>() + gaps_total,
            }
        } else {
            let mut widest = Intrinsic::default();
            let mut run: Vec<NodeId> = Vec::new();
            for &child in children {
                if self.is_inline(child) {
                    run.push(child);
                } else {
                    widest = widest.widest(self.run_intrinsic(&run, &text));
                    run.clear();
                    widest = widest.widest(self.intrinsic(child, &text));
                }
            }
            widest.widest(self.run_intrinsic(&run, &text))
        };
        Intrinsic {
            min: content.min + chrome,
            max: content.max + chrome,
        }
    }

    /// Longest word and unbroken line of an inline run.
    fn run_intrinsic(&self, run: &[NodeId], text: &TextStyle) -> Intrinsic {
        let mut out = Intrinsic::default();
        let mut line = 0.0_f32;
        let mut first = true;
        for token in self.tokens(run, text) {
            match token {
                Token::Break => {
                    out.max = out.max.max(line);
                    line = 0.0;
                    first = true;
                }
                Token::Word {
                    width,
                    space_before,
                    style,
                    ..
                } => {
                    if !first && space_before {
                        line += style.space();
                    }
                    line += width;
                    out.min = out.min.max(width);
                    first = false;
                }
            }
        }
        out.max = out.max.max(line);
        out
    }
}

/// Takes `overflow` px out of the shrinkable items in proportion to their
/// basis, never below an item's min-content width.
fn shrink(row: &mut [FlexItem], mut overflow: f32) {
    for _ in 0..row.len() {
        let shrinkable: f32 = row
            .iter()
            .filter(|i| i.shrinks && i.basis > i.min)
            .map(|i| i.basis)
            .sum();
        if overflow <= 0.01 || shrinkable <= 0.0 {
            break;
        }
        let mut absorbed = 0.0;
        for item in row.iter_mut().filter(|i| i.shrinks && i.basis > i.min) {
            let target = (item.basis - overflow * item.basis / shrinkable).max(item.min);
            absorbed += item.basis - target;
            item.basis = target;
        }
        overflow -= absorbed;
    }
}

fn gaps(style: &Style, font_size: f32, basis: f32) -> (f32, f32) {
    let mut row = 0.0;
    let mut column = 0.0;
    if let Some(gap) = style.get("gap") {
        let values: Vec<f32> = gap
            .split_whitespace()
            .map(|v| css::px(v, font_size, basis))
            .collect();
        match values.as_slice() {
            [both] => (row, column) = (*both, *both),
            [r, c, ..] => (row, column) = (*r, *c),
            [] => {}
        }
    }
    if let Some(v) = style.get("row-gap") {
        row = css::px(v, font_size, basis);
    }
    if let Some(v) = style.get("column-gap") {
        column = css::px(v, font_size, basis);
    }
    (row, column)
}

fn finish_line(
    mut fragments: Vec<Fragment>,
    line_width: f32,
    x: f32,
    y: f32,
    width: f32,
    block: &TextStyle,
) -> LineBox {
    let tallest = fragments
        .iter()
        .map(|f| f.style.line_px())
        .fold(block.line_px(), f32::max);
    let largest_font = fragments
        .iter()
        .map(|f| f.style.font_size)
        .fold(block.font_size, f32::max);
    let offset = match block.align {
        TextAlign::Left => 0.0,
        TextAlign::Center => ((width - line_width) / 2.0).max(0.0),
        TextAlign::Right => (width - line_width).max(0.0),
    };
    for fragment in &mut fragments {
        fragment.x += x + offset;
    }
    LineBox {
        y,
        height: tallest,
        baseline: y + tallest / 2.0 + largest_font * BASELINE_OFFSET,
        fragments,
    }
}
