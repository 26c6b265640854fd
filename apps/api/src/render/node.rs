//! Layout tree produced by the templates.
//!
//! Deliberately small: elements with a tag, classes, attributes and inline
//! style declarations, plus text leaves. Two trees built from the same input
//! compare equal with `==`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text { text: String },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text { text: value.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text { .. } => None,
        }
    }

    /// Concatenated text of this subtree, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// All elements in this subtree (including `self`) matching `predicate`.
    pub fn find_all<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if predicate(element) {
                found.push(element);
            }
        });
        found
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Node::Element(element) = self {
            visit(element);
            for child in &element.children {
                child.walk(visit);
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inline style
// ────────────────────────────────────────────────────────────────────────────

/// Ordered inline style declarations. Setting an existing property replaces
/// it in place, so restoring a value never reorders declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Style(Vec<(String, String)>);

impl Style {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((property.to_string(), value)),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.0.iter().position(|(name, _)| name == property)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Element
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub style: Style,
    pub children: Vec<Node>,
}

/// Starts a new element builder.
pub fn el(tag: &str) -> Element {
    Element {
        tag: tag.to_string(),
        ..Default::default()
    }
}

impl Element {
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn css(mut self, property: &str, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(Node::text(value));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_set_replaces_in_place() {
        let mut style = Style::default();
        style.set("color", "#000");
        style.set("display", "block");
        style.set("color", "#fff");
        assert_eq!(style.to_css(), "color: #fff; display: block");
    }

    #[test]
    fn test_find_all_and_text_content() {
        let tree: Node = el("div")
            .child(el("h2").text("Experience"))
            .child(el("p").class("body").text("Built things"))
            .into();
        let headings = tree.find_all(&|e| e.tag == "h2");
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text_content(), "Experience");
        assert_eq!(tree.text_content(), "ExperienceBuilt things");
    }
}
