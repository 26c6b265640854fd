//! Two-column template: coloured header band, main column, tinted sidebar.

use crate::document::model::{Document, Education, Experience, Personal, Project};
use crate::render::node::{el, Element, Node};
use crate::render::text::{
    contact_items, format_range, group_skills, join_present, normalize_bullets, or_placeholder,
};
use crate::render::{link, section, DOCUMENT_CLASS, SANS_STACK};

const ACCENT: &str = "#1e40af";
const ACCENT_SOFT: &str = "#bfdbfe";
const SIDEBAR_BG: &str = "#eff6ff";
const INK: &str = "#1f2937";
const MUTED: &str = "#475569";
const BULLET: &str = "▸";

pub fn render_modern(doc: &Document) -> Node {
    let main: Vec<Node> = [summary(doc), experience(doc), projects(doc), achievements(doc)]
        .into_iter()
        .flatten()
        .collect();
    let sidebar: Vec<Node> = [
        skills(doc),
        education(doc),
        chips_section("languages", "Languages", &doc.extras.languages),
        certifications(doc),
        chips_section("interests", "Interests", &doc.extras.interests),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut root = el("div")
        .class(DOCUMENT_CLASS)
        .class("template-modern")
        .attr("data-template", "modern")
        .css("font-family", SANS_STACK)
        .css("font-size", "10px")
        .css("line-height", "1.3")
        .css("color", INK)
        .css("background-color", "#ffffff")
        .child(header(&doc.personal));

    let (has_main, has_sidebar) = (!main.is_empty(), !sidebar.is_empty());
    if has_main || has_sidebar {
        let mut body = el("div")
            .class("resume-body")
            .css("display", "flex")
            .css("gap", "20px")
            .css("padding", "16px 24px");
        if has_main {
            body = body.child(
                el("main")
                    .class("resume-main")
                    .css("width", if has_sidebar { "62%" } else { "100%" })
                    .children(main),
            );
        }
        if has_sidebar {
            body = body.child(
                el("aside")
                    .class("resume-sidebar")
                    .css("width", if has_main { "38%" } else { "100%" })
                    .css("background-color", SIDEBAR_BG)
                    .css("padding", "12px")
                    .children(sidebar),
            );
        }
        root = root.child(body);
    }
    root.into()
}

fn heading(title: &str) -> Element {
    el("h2")
        .css("font-size", "13px")
        .css("font-weight", "bold")
        .css("color", ACCENT)
        .css("text-transform", "uppercase")
        .css("margin-bottom", "6px")
        .css("padding-bottom", "2px")
        .css("border-bottom", format!("2px solid {ACCENT_SOFT}"))
        .text(title)
}

fn block(key: &str, title: &str, body: Vec<Node>) -> Node {
    let mut node = section(key, heading(title), body);
    if let Node::Element(element) = &mut node {
        element.style.set("margin-bottom", "12px");
    }
    node
}

fn bullets(text: &str) -> Option<Node> {
    let lines = normalize_bullets(text);
    if lines.is_empty() {
        return None;
    }
    Some(Node::from(el("div").css("margin-top", "3px").children(
        lines.iter().map(|line| {
            Node::from(
                el("div")
                    .class("resume-bullet")
                    .css("margin-bottom", "2px")
                    .text(format!("{BULLET} {line}")),
            )
        }),
    )))
}

fn chip(label: &str) -> Node {
    el("span")
        .class("chip")
        .css("background-color", ACCENT)
        .css("color", "#ffffff")
        .css("padding", "1px 6px")
        .css("font-size", "9px")
        .text(label)
        .into()
}

fn chip_row<'a>(labels: impl IntoIterator<Item = &'a str>) -> Element {
    el("div")
        .css("display", "flex")
        .css("flex-wrap", "wrap")
        .css("gap", "4px")
        .css("margin-bottom", "6px")
        .children(labels.into_iter().map(chip))
}

fn date_line(dates: String) -> Option<Node> {
    if dates.is_empty() {
        return None;
    }
    Some(
        el("div")
            .class("entry-date")
            .css("color", MUTED)
            .css("font-size", "9px")
            .text(dates)
            .into(),
    )
}

fn non_blank(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn header(personal: &Personal) -> Node {
    let name = personal.full_name();
    let mut header = el("header")
        .class("resume-header")
        .css("background-color", ACCENT)
        .css("color", "#ffffff")
        .css("padding", "20px 24px")
        .child(
            el("h1")
                .css("font-size", "24px")
                .css("font-weight", "bold")
                .text(or_placeholder(&name, "Your Name")),
        );

    if !personal.title.trim().is_empty() {
        header = header.child(
            el("div")
                .css("font-size", "12px")
                .css("color", ACCENT_SOFT)
                .css("margin-top", "2px")
                .text(personal.title.trim()),
        );
    }

    let mut contacts = el("div")
        .class("resume-contact")
        .css("display", "flex")
        .css("flex-wrap", "wrap")
        .css("gap", "12px")
        .css("margin-top", "8px")
        .css("font-size", "9px");
    let mut any = false;
    if !personal.location.trim().is_empty() {
        contacts = contacts.child(el("span").text(personal.location.trim()));
        any = true;
    }
    for item in contact_items(personal) {
        contacts = match &item.href {
            Some(href) => contacts.child(link(href, &item.label).css("color", "#ffffff")),
            None => contacts.child(el("span").text(item.label)),
        };
        any = true;
    }
    if any {
        header = header.child(contacts);
    }
    header.into()
}

// ────────────────────────────────────────────────────────────────────────────
// Main column
// ────────────────────────────────────────────────────────────────────────────

fn summary(doc: &Document) -> Option<Node> {
    let lines = normalize_bullets(&doc.summary);
    if lines.is_empty() {
        return None;
    }
    let paragraph = el("p").css("color", INK).text(lines.join(" "));
    Some(block("summary", "Summary", vec![paragraph.into()]))
}

fn experience(doc: &Document) -> Option<Node> {
    if doc.experience.is_empty() {
        return None;
    }
    let entries = doc.experience.iter().map(experience_entry).collect();
    Some(block("experience", "Experience", entries))
}

fn experience_entry(exp: &Experience) -> Node {
    let company = join_present(
        &[or_placeholder(&exp.company, "Company"), exp.location.as_str()],
        " · ",
    );
    el("div")
        .class("resume-entry")
        .css("margin-bottom", "8px")
        .child(
            el("h3")
                .css("font-size", "11px")
                .css("font-weight", "bold")
                .text(or_placeholder(&exp.position, "Position")),
        )
        .child(el("div").css("color", ACCENT).text(company))
        .children(date_line(format_range(
            &exp.start_date,
            &exp.end_date,
            exp.is_current,
        )))
        .children(bullets(&exp.description))
        .into()
}

fn projects(doc: &Document) -> Option<Node> {
    if doc.projects.is_empty() {
        return None;
    }
    let entries = doc.projects.iter().map(project_entry).collect();
    Some(block("projects", "Projects", entries))
}

fn project_entry(project: &Project) -> Node {
    let mut entry = el("div")
        .class("resume-entry")
        .css("margin-bottom", "8px")
        .child(
            el("h3")
                .css("font-size", "11px")
                .css("font-weight", "bold")
                .text(or_placeholder(&project.name, "Project")),
        );

    let technologies: Vec<&str> = non_blank(&project.technologies).collect();
    if !technologies.is_empty() {
        entry = entry.child(
            el("div")
                .css("color", MUTED)
                .css("font-size", "9px")
                .text(technologies.join(" · ")),
        );
    }

    let mut links = el("div").class("resume-links").css("display", "flex").css("gap", "8px");
    let mut any = false;
    for (label, href) in [("Live", &project.url), ("Repository", &project.repository_url)] {
        if !href.trim().is_empty() {
            links = links.child(link(href, label).css("color", ACCENT));
            any = true;
        }
    }
    if any {
        entry = entry.child(links);
    }
    entry.children(bullets(&project.description)).into()
}

fn achievements(doc: &Document) -> Option<Node> {
    if doc.achievements.is_empty() {
        return None;
    }
    let entries = doc
        .achievements
        .iter()
        .map(|achievement| {
            Node::from(
                el("div")
                    .class("resume-entry")
                    .css("margin-bottom", "6px")
                    .child(
                        el("h3")
                            .css("font-size", "11px")
                            .css("font-weight", "bold")
                            .text(or_placeholder(&achievement.title, "Achievement")),
                    )
                    .children(date_line(achievement.date.trim().to_string()))
                    .children(bullets(&achievement.description)),
            )
        })
        .collect();
    Some(block("achievements", "Achievements", entries))
}

// ────────────────────────────────────────────────────────────────────────────
// Sidebar
// ────────────────────────────────────────────────────────────────────────────

fn skills(doc: &Document) -> Option<Node> {
    let groups = group_skills(&doc.skills);
    if groups.is_empty() {
        return None;
    }
    let mut body = Vec::with_capacity(groups.len() * 2);
    for group in &groups {
        body.push(Node::from(
            el("div")
                .css("font-weight", "600")
                .css("color", ACCENT)
                .css("margin-bottom", "2px")
                .text(group.category.clone()),
        ));
        body.push(chip_row(group.skills.iter().map(String::as_str)).into());
    }
    Some(block("skills", "Skills", body))
}

fn education(doc: &Document) -> Option<Node> {
    if doc.education.is_empty() {
        return None;
    }
    let entries = doc.education.iter().map(education_entry).collect();
    Some(block("education", "Education", entries))
}

fn education_entry(edu: &Education) -> Node {
    let degree = join_present(&[or_placeholder(&edu.degree, "Degree"), edu.field.as_str()], " in ");
    let mut entry = el("div")
        .class("resume-entry")
        .css("margin-bottom", "6px")
        .child(el("div").css("font-weight", "bold").text(degree))
        .child(el("div").text(or_placeholder(&edu.institution, "Institution")))
        .children(date_line(format_range(&edu.start_date, &edu.end_date, false)));
    if !edu.location.trim().is_empty() {
        entry = entry.child(el("div").css("color", MUTED).text(edu.location.trim()));
    }
    if !edu.gpa.trim().is_empty() {
        entry = entry.child(el("div").text(format!("GPA: {}", edu.gpa.trim())));
    }
    entry.into()
}

fn certifications(doc: &Document) -> Option<Node> {
    let items: Vec<Node> = non_blank(&doc.extras.certifications)
        .map(|cert| {
            Node::from(
                el("div")
                    .class("resume-bullet")
                    .css("margin-bottom", "2px")
                    .text(format!("{BULLET} {cert}")),
            )
        })
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(block("certifications", "Certifications", items))
}

fn chips_section(key: &str, title: &str, items: &[String]) -> Option<Node> {
    let labels: Vec<&str> = non_blank(items).collect();
    if labels.is_empty() {
        return None;
    }
    Some(block(key, title, vec![chip_row(labels).into()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::demo::demo_document;

    fn region<'a>(tree: &'a Node, class: &str) -> Option<&'a Element> {
        tree.find_all(&|e| e.has_class(class)).into_iter().next()
    }

    #[test]
    fn test_modern_splits_main_and_sidebar() {
        let tree = render_modern(&demo_document());
        let main = region(&tree, "resume-main").expect("main column");
        let sidebar = region(&tree, "resume-sidebar").expect("sidebar");
        assert_eq!(main.style.get("width"), Some("62%"));
        assert_eq!(sidebar.style.get("background-color"), Some(SIDEBAR_BG));

        let main_text = main.text_content();
        assert!(main_text.contains("EXPERIENCE") || main_text.contains("Experience"));
        assert!(sidebar.text_content().contains("Skills"));
    }

    #[test]
    fn test_modern_omits_empty_sidebar() {
        let mut doc = demo_document();
        doc.skills.clear();
        doc.education.clear();
        doc.extras = Default::default();
        let tree = render_modern(&doc);
        assert!(region(&tree, "resume-sidebar").is_none());
        let main = region(&tree, "resume-main").expect("main column");
        assert_eq!(main.style.get("width"), Some("100%"));
    }

    #[test]
    fn test_modern_sidebar_takes_full_width_without_main() {
        let mut doc = demo_document();
        doc.summary.clear();
        doc.experience.clear();
        doc.projects.clear();
        doc.achievements.clear();
        let tree = render_modern(&doc);
        assert!(region(&tree, "resume-main").is_none());
        let sidebar = region(&tree, "resume-sidebar").expect("sidebar");
        assert_eq!(sidebar.style.get("width"), Some("100%"));
    }

    #[test]
    fn test_modern_header_band_carries_contacts() {
        let tree = render_modern(&demo_document());
        let header = region(&tree, "resume-header").expect("header");
        assert_eq!(header.style.get("background-color"), Some(ACCENT));
        let anchors: Vec<_> = Node::from(header.clone())
            .find_all(&|e| e.tag == "a")
            .into_iter()
            .filter_map(|a| a.attr_value("href").map(str::to_string))
            .collect();
        assert!(anchors.iter().any(|href| href.starts_with("mailto:")));
    }

    #[test]
    fn test_modern_summary_is_a_paragraph() {
        let tree = render_modern(&demo_document());
        let summary = tree.find_all(&|e| e.attr_value("data-section") == Some("summary"));
        assert_eq!(summary.len(), 1);
        assert!(Node::from(summary[0].clone())
            .find_all(&|e| e.has_class("resume-bullet"))
            .is_empty());
    }
}
