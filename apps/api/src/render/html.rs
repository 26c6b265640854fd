use crate::render::node::{Element, Node};

/// Serializes a layout tree to HTML markup with inline styles.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(&escape_text(text)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if !element.classes.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&escape_attr(&element.classes.join(" ")));
        out.push('"');
    }
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if !element.style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&escape_attr(&element.style.to_css()));
        out.push('"');
    }
    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::el;

    #[test]
    fn test_to_html_escapes_text_and_attributes() {
        let node: Node = el("a")
            .class("link")
            .attr("href", "https://example.com/?a=1&b=\"2\"")
            .css("color", "#2563eb")
            .text("R&D <lead>")
            .into();
        assert_eq!(
            to_html(&node),
            "<a class=\"link\" href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\" \
             style=\"color: #2563eb\">R&amp;D &lt;lead&gt;</a>"
        );
    }
}
