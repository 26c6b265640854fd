//! Live, mutable copy of a layout tree.
//!
//! Templates produce immutable `Node` trees; a `Surface` is what those trees
//! become once attached to a frame. Nodes live in an arena addressed by
//! `NodeId`, inline styles can be changed in place, and layout is computed on
//! demand against the surface's viewport width.

use serde::Serialize;

use crate::frame::layout::{self, LayoutBox};
use crate::render::node::{Element, Node, Style};

/// Attribute marking the container whose subtree is exported.
pub const PRINTABLE_ROOT_ATTR: &str = "data-printable-root";

/// Classes whose elements never reach an export.
const NON_PRINTABLE_CLASSES: &[&str] = &["no-print", "export-button", "ai-assist-button"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum LiveKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
        style: Style,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveNode {
    pub kind: LiveKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl LiveNode {
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            LiveKind::Element { tag, .. } => Some(tag),
            LiveKind::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        match &self.kind {
            LiveKind::Element { classes, .. } => classes.iter().any(|c| c == class),
            LiveKind::Text(_) => false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            LiveKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            LiveKind::Text(_) => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match &self.kind {
            LiveKind::Element { style, .. } => Some(style),
            LiveKind::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            LiveKind::Text(text) => Some(text),
            LiveKind::Element { .. } => None,
        }
    }

    /// Interactive chrome: buttons and anything marked as never printed.
    pub fn is_non_printable(&self) -> bool {
        match &self.kind {
            LiveKind::Element { tag, classes, .. } => is_chrome(tag, classes),
            LiveKind::Text(_) => false,
        }
    }
}

/// Whether an element with `tag` and `classes` is editor chrome.
pub fn is_chrome(tag: &str, classes: &[String]) -> bool {
    tag == "button"
        || classes
            .iter()
            .any(|c| NON_PRINTABLE_CLASSES.contains(&c.as_str()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    nodes: Vec<LiveNode>,
    root: NodeId,
    viewport_width: f32,
}

impl Surface {
    /// Builds the live tree for `content`. The root of the surface is the
    /// root of `content`.
    pub fn attach(content: &Node, viewport_width: f32) -> Self {
        let mut surface = Surface {
            nodes: Vec::new(),
            root: NodeId(0),
            viewport_width: viewport_width.max(0.0),
        };
        surface.root = surface.insert(content, None);
        surface
    }

    fn insert(&mut self, node: &Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let kind = match node {
            Node::Text { text } => LiveKind::Text(text.clone()),
            Node::Element(element) => LiveKind::Element {
                tag: element.tag.clone(),
                classes: element.classes.clone(),
                attrs: element.attrs.clone(),
                style: element.style.clone(),
            },
        };
        self.nodes.push(LiveNode {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Node::Element(element) = node {
            for child in &element.children {
                let child_id = self.insert(child, Some(id));
                self.nodes[id.0].children.push(child_id);
            }
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &LiveNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width.max(0.0);
    }

    pub fn style_value(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id).style().and_then(|s| s.get(property))
    }

    /// Sets (`Some`) or removes (`None`) an inline declaration and returns
    /// the previous value. No-op on text nodes.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: Option<&str>) -> Option<String> {
        match &mut self.nodes[id.0].kind {
            LiveKind::Element { style, .. } => {
                let previous = style.get(property).map(str::to_string);
                match value {
                    Some(value) => style.set(property, value),
                    None => {
                        style.remove(property);
                    }
                }
                previous
            }
            LiveKind::Text(_) => None,
        }
    }

    /// Preorder descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// `id` and its descendants matching `predicate`, in document order.
    pub fn query(&self, id: NodeId, predicate: impl Fn(&LiveNode) -> bool) -> Vec<NodeId> {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter(|n| predicate(self.node(*n)))
            .collect()
    }

    pub fn find_printable_root(&self) -> Option<NodeId> {
        self.query(self.root, |n| n.attr(PRINTABLE_ROOT_ATTR).is_some())
            .into_iter()
            .next()
    }

    /// Deep copy of the subtree at `id` with its current inline styles.
    pub fn clone_subtree(&self, id: NodeId) -> Node {
        let node = self.node(id);
        match &node.kind {
            LiveKind::Text(text) => Node::text(text.clone()),
            LiveKind::Element {
                tag,
                classes,
                attrs,
                style,
            } => Node::Element(Element {
                tag: tag.clone(),
                classes: classes.clone(),
                attrs: attrs.clone(),
                style: style.clone(),
                children: node
                    .children
                    .iter()
                    .map(|child| self.clone_subtree(*child))
                    .collect(),
            }),
        }
    }

    /// Positions `id` at the origin with the full viewport width available.
    /// `None` when the node is not displayed or the viewport has no width.
    pub fn layout(&self, id: NodeId) -> Option<LayoutBox> {
        if self.viewport_width <= 0.0 {
            return None;
        }
        layout::layout_root(self, id, self.viewport_width)
    }

    /// Scroll size of `id`: the larger of its own box and the extent of
    /// everything laid out inside it.
    pub fn measure(&self, id: NodeId) -> Size {
        let Some(root) = self.layout(id) else {
            return Size::ZERO;
        };
        let (right, bottom) = root.extent();
        let size = Size {
            width: right.max(root.rect.right()) - root.rect.x,
            height: bottom.max(root.rect.bottom()) - root.rect.y,
        };
        if size.is_empty() {
            Size::ZERO
        } else {
            size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::el;

    fn sample() -> Node {
        el("div")
            .attr(PRINTABLE_ROOT_ATTR, "true")
            .child(el("button").class("export-button").text("Export"))
            .child(
                el("section")
                    .class("resume-section")
                    .child(el("h2").text("Skills"))
                    .child(el("p").css("color", "#111111").text("Rust")),
            )
            .into()
    }

    #[test]
    fn test_attach_and_clone_round_trips() {
        let node = sample();
        let surface = Surface::attach(&node, 800.0);
        assert_eq!(surface.clone_subtree(surface.root()), node);
    }

    #[test]
    fn test_set_style_returns_previous_and_restores() {
        let mut surface = Surface::attach(&sample(), 800.0);
        let p = surface.query(surface.root(), |n| n.tag() == Some("p"))[0];
        assert_eq!(
            surface.set_style(p, "color", Some("#ff0000")),
            Some("#111111".to_string())
        );
        assert_eq!(surface.set_style(p, "display", Some("none")), None);
        surface.set_style(p, "display", None);
        surface.set_style(p, "color", Some("#111111"));
        assert_eq!(surface.clone_subtree(surface.root()), sample());
    }

    #[test]
    fn test_non_printable_detection() {
        let surface = Surface::attach(&sample(), 800.0);
        let chrome = surface.query(surface.root(), LiveNode::is_non_printable);
        assert_eq!(chrome.len(), 1);
        assert_eq!(surface.node(chrome[0]).tag(), Some("button"));
    }

    #[test]
    fn test_find_printable_root() {
        let wrapped: Node = el("body").child(sample()).into();
        let surface = Surface::attach(&wrapped, 800.0);
        let root = surface.find_printable_root().expect("marker present");
        assert_ne!(root, surface.root());
        assert_eq!(surface.node(root).parent, Some(surface.root()));
    }

    #[test]
    fn test_measure_zero_viewport_or_hidden_root() {
        let surface = Surface::attach(&sample(), 0.0);
        assert_eq!(surface.measure(surface.root()), Size::ZERO);

        let mut surface = Surface::attach(&sample(), 800.0);
        assert!(!surface.measure(surface.root()).is_empty());
        let root = surface.root();
        surface.set_style(root, "display", Some("none"));
        assert_eq!(surface.measure(root), Size::ZERO);
    }

    #[test]
    fn test_measure_empty_container_is_zero() {
        let surface = Surface::attach(&el("div").into(), 800.0);
        assert_eq!(surface.measure(surface.root()), Size::ZERO);
    }
}
