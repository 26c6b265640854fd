//! Single-column monochrome template.
//!
//! Section order: header, summary, skills, experience, projects, education,
//! certifications, achievements, additional information.

use crate::document::model::{Achievement, Document, Education, Experience, Personal, Project};
use crate::render::node::{el, Element, Node};
use crate::render::text::{
    contact_items, format_range, group_skills, join_present, normalize_bullets, or_placeholder,
};
use crate::render::{link, section, DOCUMENT_CLASS, SANS_STACK};

const INK: &str = "#000000";
const BULLET: &str = "•";

pub fn render_classic(doc: &Document) -> Node {
    let sections = [
        summary(doc),
        skills(doc),
        experience(doc),
        projects(doc),
        education(doc),
        certifications(doc),
        achievements(doc),
        additional(doc),
    ];

    el("div")
        .class(DOCUMENT_CLASS)
        .class("template-classic")
        .attr("data-template", "classic")
        .css("font-family", SANS_STACK)
        .css("font-size", "10px")
        .css("line-height", "1.15")
        .css("color", INK)
        .css("background-color", "#ffffff")
        .child(header(&doc.personal))
        .children(sections.into_iter().flatten())
        .into()
}

fn heading(title: &str) -> Element {
    el("h2")
        .css("font-size", "12px")
        .css("font-weight", "bold")
        .css("margin-bottom", "4px")
        .css("padding-bottom", "2px")
        .css("border-bottom", "1px solid #000000")
        .text(title)
}

fn bullet(text: &str) -> Node {
    el("div")
        .class("resume-bullet")
        .css("margin-bottom", "2px")
        .text(format!("{BULLET} {text}"))
        .into()
}

fn bullets(text: &str) -> Option<Node> {
    let lines = normalize_bullets(text);
    if lines.is_empty() {
        return None;
    }
    Some(
        el("div")
            .css("margin-left", "8px")
            .css("margin-top", "2px")
            .children(lines.iter().map(|line| bullet(line)))
            .into(),
    )
}

fn block(key: &str, title: &str, body: Vec<Node>) -> Node {
    let mut node = section(key, heading(title), body);
    if let Node::Element(element) = &mut node {
        element.style.set("margin-bottom", "8px");
    }
    node
}

/// Title on the left, optional date on the right.
fn title_row(title: String, date: String) -> Node {
    let mut row = el("div")
        .css("display", "flex")
        .css("justify-content", "space-between")
        .css("margin-bottom", "2px")
        .child(el("span").css("font-weight", "600").text(title));
    if !date.is_empty() {
        row = row.child(
            el("span")
                .class("entry-date")
                .css("margin-left", "8px")
                .text(date),
        );
    }
    row.into()
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn header(personal: &Personal) -> Node {
    let name = personal.full_name();
    let mut header = el("header")
        .class("resume-header")
        .css("text-align", "center")
        .css("border-bottom", "2px solid #000000")
        .css("padding-bottom", "6px")
        .css("margin-bottom", "8px")
        .child(
            el("h1")
                .css("font-size", "20px")
                .css("font-weight", "bold")
                .css("margin-bottom", "2px")
                .text(or_placeholder(&name, "Your Name")),
        );

    if !personal.title.trim().is_empty() {
        header = header.child(el("div").css("font-size", "11px").text(personal.title.trim()));
    }
    if !personal.location.trim().is_empty() {
        header = header.child(el("div").text(personal.location.trim()));
    }

    let contacts = contact_items(personal);
    if !contacts.is_empty() {
        let mut line = el("div").class("resume-contact").css("margin-top", "4px");
        for (i, item) in contacts.iter().enumerate() {
            if i > 0 {
                line = line.text(" | ");
            }
            line = match &item.href {
                Some(href) => line.child(link(href, &item.label).css("color", INK)),
                None => line.text(item.label.clone()),
            };
        }
        header = header.child(line);
    }
    header.into()
}

fn summary(doc: &Document) -> Option<Node> {
    let body = bullets(&doc.summary)?;
    Some(block("summary", "Profile Summary", vec![body]))
}

fn skills(doc: &Document) -> Option<Node> {
    let groups = group_skills(&doc.skills);
    if groups.is_empty() {
        return None;
    }
    let rows = groups
        .iter()
        .map(|group| {
            Node::from(el("div")
                .css("margin-bottom", "3px")
                .child(
                    el("span")
                        .css("font-weight", "600")
                        .text(format!("{}: ", group.category)),
                )
                .child(el("span").text(group.skills.join(", "))))
        })
        .collect();
    Some(block("skills", "Technical Skills", rows))
}

fn experience(doc: &Document) -> Option<Node> {
    if doc.experience.is_empty() {
        return None;
    }
    let entries = doc.experience.iter().map(experience_entry).collect();
    Some(block("experience", "Experience", entries))
}

fn experience_entry(exp: &Experience) -> Node {
    let title = format!(
        "{} — {}",
        or_placeholder(&exp.company, "Company"),
        or_placeholder(&exp.position, "Position")
    );
    let dates = format_range(&exp.start_date, &exp.end_date, exp.is_current);
    let mut entry = el("div")
        .class("resume-entry")
        .css("margin-bottom", "6px")
        .child(title_row(title, dates));
    if !exp.location.trim().is_empty() {
        entry = entry.child(
            el("div")
                .css("font-style", "italic")
                .text(exp.location.trim()),
        );
    }
    entry.children(bullets(&exp.description)).into()
}

fn projects(doc: &Document) -> Option<Node> {
    if doc.projects.is_empty() {
        return None;
    }
    let entries = doc.projects.iter().map(project_entry).collect();
    Some(block("projects", "Projects", entries))
}

fn project_entry(project: &Project) -> Node {
    let technologies = project
        .technologies
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let title = join_present(
        &[or_placeholder(&project.name, "Project"), technologies.as_str()],
        " | ",
    );

    let mut entry = el("div")
        .class("resume-entry")
        .css("margin-bottom", "6px")
        .child(title_row(title, String::new()));

    let links: Vec<(&str, &str)> = [("Live", &project.url), ("Repository", &project.repository_url)]
        .into_iter()
        .filter(|(_, href)| !href.trim().is_empty())
        .map(|(label, href)| (label, href.as_str()))
        .collect();
    if !links.is_empty() {
        let mut line = el("div").class("resume-links");
        for (i, (label, href)) in links.into_iter().enumerate() {
            if i > 0 {
                line = line.text(" | ");
            }
            line = line.child(link(href, label).css("color", INK));
        }
        entry = entry.child(line);
    }
    entry.children(bullets(&project.description)).into()
}

fn education(doc: &Document) -> Option<Node> {
    if doc.education.is_empty() {
        return None;
    }
    let entries = doc.education.iter().map(education_entry).collect();
    Some(block("education", "Education", entries))
}

fn education_entry(edu: &Education) -> Node {
    let degree = join_present(&[or_placeholder(&edu.degree, "Degree"), edu.field.as_str()], ", ");
    let title = format!("{degree} — {}", or_placeholder(&edu.institution, "Institution"));
    let details = join_present(
        &[
            format_range(&edu.start_date, &edu.end_date, false).as_str(),
            edu.location.as_str(),
        ],
        " | ",
    );

    let mut entry = el("div")
        .class("resume-entry")
        .css("margin-bottom", "4px")
        .child(el("div").css("font-weight", "600").text(title));
    if !details.is_empty() {
        entry = entry.child(el("div").text(details));
    }
    if !edu.gpa.trim().is_empty() {
        entry = entry.child(el("div").text(format!("GPA: {}", edu.gpa.trim())));
    }
    entry.into()
}

fn certifications(doc: &Document) -> Option<Node> {
    let items: Vec<Node> = non_blank(&doc.extras.certifications)
        .map(|cert| bullet(cert))
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(block("certifications", "Certifications", items))
}

fn achievements(doc: &Document) -> Option<Node> {
    if doc.achievements.is_empty() {
        return None;
    }
    let entries = doc.achievements.iter().map(achievement_entry).collect();
    Some(block("achievements", "Achievements", entries))
}

fn achievement_entry(achievement: &Achievement) -> Node {
    el("div")
        .class("resume-entry")
        .css("margin-bottom", "4px")
        .child(title_row(
            or_placeholder(&achievement.title, "Achievement").to_string(),
            achievement.date.trim().to_string(),
        ))
        .children(bullets(&achievement.description))
        .into()
}

fn additional(doc: &Document) -> Option<Node> {
    let rows: Vec<Node> = [
        ("Languages", &doc.extras.languages),
        ("Interests", &doc.extras.interests),
    ]
    .into_iter()
    .filter_map(|(label, items)| {
        let items: Vec<&str> = non_blank(items).collect();
        if items.is_empty() {
            return None;
        }
        Some(Node::from(
            el("div")
                .css("margin-bottom", "3px")
                .child(el("span").css("font-weight", "600").text(format!("{label}: ")))
                .child(el("span").text(items.join(", "))),
        ))
    })
    .collect();
    if rows.is_empty() {
        return None;
    }
    Some(block("additional", "Additional Information", rows))
}

fn non_blank(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::demo::demo_document;
    use crate::document::model::Skill;
    use crate::render::SECTION_CLASS;

    #[test]
    fn test_classic_section_order() {
        let tree = render_classic(&demo_document());
        let keys: Vec<_> = tree
            .find_all(&|e| e.has_class(SECTION_CLASS))
            .into_iter()
            .filter_map(|e| e.attr_value("data-section"))
            .collect();
        assert_eq!(
            keys,
            vec![
                "summary",
                "skills",
                "experience",
                "projects",
                "education",
                "certifications",
                "achievements",
                "additional"
            ]
        );
    }

    #[test]
    fn test_classic_bullets_use_own_marker_once() {
        let tree = render_classic(&demo_document());
        let bullets = tree.find_all(&|e| e.has_class("resume-bullet"));
        assert!(!bullets.is_empty());
        for b in bullets {
            let text = b.text_content();
            assert!(text.starts_with("• "), "{text}");
            assert!(!text.starts_with("• •") && !text.starts_with("• -"), "{text}");
        }
    }

    #[test]
    fn test_classic_skills_rows_follow_grouping() {
        let mut doc = Document::default();
        for (name, category) in [("Go", "Languages"), ("React", "Frontend"), ("Rust", "Languages")] {
            doc.add_entry(Skill {
                name: name.to_string(),
                category: category.to_string(),
                ..Default::default()
            });
        }
        let tree = render_classic(&doc);
        let skills = tree.find_all(&|e| e.attr_value("data-section") == Some("skills"));
        assert_eq!(
            skills[0].text_content(),
            "Technical SkillsLanguages: Go, RustFrontend: React"
        );
    }

    #[test]
    fn test_blank_extras_omit_sections() {
        let mut doc = Document::default();
        doc.extras.certifications = vec!["  ".to_string()];
        doc.extras.languages = vec![String::new()];
        let tree = render_classic(&doc);
        assert!(tree.find_all(&|e| e.has_class(SECTION_CLASS)).is_empty());
    }
}
