//! Template rendering: `Document` + `TemplateId` → layout tree.
//!
//! Rendering is a pure function. Optional fields never fail a render; each
//! has a fallback (empty, placeholder label, or the section is omitted).

pub mod classic;
pub mod html;
pub mod modern;
pub mod node;
pub mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::model::Document;
use node::{el, Element, Node};

/// Class carried by the root element of every rendered template.
pub const DOCUMENT_CLASS: &str = "resume-document";
/// Class carried by every section block; page breaks avoid splitting these.
pub const SECTION_CLASS: &str = "resume-section";

pub const SANS_STACK: &str = "Inter, Roboto, Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    /// Single column, monochrome, ATS-friendly.
    #[default]
    Classic,
    /// Coloured header band over a main column and a sidebar.
    Modern,
}

impl TemplateId {
    pub const ALL: [TemplateId; 2] = [TemplateId::Classic, TemplateId::Modern];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

/// Renders `doc` with the given template.
pub fn render(doc: &Document, template: TemplateId) -> Node {
    match template {
        TemplateId::Classic => classic::render_classic(doc),
        TemplateId::Modern => modern::render_modern(doc),
    }
}

/// Wraps a heading and body into a section block keyed by `key`.
pub(crate) fn section(key: &str, heading: Element, body: Vec<Node>) -> Node {
    el("section")
        .class(SECTION_CLASS)
        .attr("data-section", key)
        .child(heading)
        .children(body)
        .into()
}

/// An anchor element; templates decide colour, export decides decoration.
pub(crate) fn link(href: &str, label: &str) -> Element {
    el("a").attr("href", href.trim()).text(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::demo::demo_document;
    use crate::document::model::{Experience, Personal};

    fn section_keys(node: &Node) -> Vec<String> {
        node.find_all(&|e| e.has_class(SECTION_CLASS))
            .into_iter()
            .filter_map(|e| e.attr_value("data-section").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_render_is_deterministic_for_every_template() {
        let doc = demo_document();
        for template in TemplateId::ALL {
            assert_eq!(render(&doc, template), render(&doc, template));
        }
    }

    #[test]
    fn test_empty_experience_renders_no_experience_section() {
        let mut doc = demo_document();
        doc.experience.clear();
        for template in TemplateId::ALL {
            let tree = render(&doc, template);
            assert!(!section_keys(&tree).contains(&"experience".to_string()));
            let headings: Vec<String> = tree
                .find_all(&|e| e.tag == "h2")
                .into_iter()
                .map(|e| e.text_content())
                .collect();
            assert!(
                !headings.iter().any(|h| h.to_lowercase().contains("experience")),
                "{template}: {headings:?}"
            );
        }
    }

    #[test]
    fn test_minimal_document_has_header_only() {
        let doc = Document {
            personal: Personal {
                first_name: "Ana".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        for template in TemplateId::ALL {
            let tree = render(&doc, template);
            let names = tree.find_all(&|e| e.tag == "h1");
            assert_eq!(names.len(), 1);
            assert!(names[0].text_content().contains("Ana"));
            assert!(tree.find_all(&|e| e.tag == "h2").is_empty(), "{template}");
            assert!(section_keys(&tree).is_empty());
        }
    }

    #[test]
    fn test_current_position_date_text() {
        let mut doc = Document::default();
        doc.add_entry(Experience {
            company: "Atlas".to_string(),
            position: "Designer".to_string(),
            start_date: "Mar 2022".to_string(),
            end_date: "Jun 2023".to_string(),
            is_current: true,
            ..Default::default()
        });
        for template in TemplateId::ALL {
            let tree = render(&doc, template);
            let dates = tree.find_all(&|e| e.has_class("entry-date"));
            assert_eq!(dates.len(), 1, "{template}");
            assert_eq!(dates[0].text_content(), "Mar 2022 – Present");
        }
    }

    #[test]
    fn test_partial_entries_use_placeholders() {
        let mut doc = Document::default();
        doc.add_entry(Experience::default());
        let tree = render(&doc, TemplateId::Classic);
        assert!(tree.text_content().contains("Company"));
        assert!(tree.find_all(&|e| e.has_class("entry-date")).is_empty());
    }

    #[test]
    fn test_template_id_parse() {
        assert_eq!("Modern".parse::<TemplateId>().unwrap(), TemplateId::Modern);
        assert!("fancy".parse::<TemplateId>().is_err());
    }
}
