//! Text normalization shared by every template.

use serde::Serialize;

use crate::document::model::{Personal, Skill};

pub const RANGE_SEPARATOR: &str = " – ";
pub const PRESENT: &str = "Present";
pub const UNCATEGORIZED: &str = "Other";

/// Glyphs users type (or paste) in front of bullet lines.
const BULLET_GLYPHS: &[char] = &['•', '-', '*', '–', '—', '·', '▪', '▸', '◦', '‣'];

/// Formats `start – end`. A current entry ends at "Present". Missing halves
/// collapse without leaving a dangling separator; when neither date was given
/// the range is empty.
pub fn format_range(start: &str, end: &str, current: bool) -> String {
    let start = start.trim();
    let end = end.trim();
    if start.is_empty() && end.is_empty() {
        return String::new();
    }
    let end = if current { PRESENT } else { end };
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start}{RANGE_SEPARATOR}{end}"),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (true, true) => String::new(),
    }
}

/// Splits free text into bullet lines: one per non-blank line, trimmed, with
/// any leading bullet glyphs removed so the template can add its own marker.
///
/// Idempotent: feeding the joined output back in yields the same bullets.
pub fn normalize_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let mut line = line.trim();
    while let Some(rest) = line.strip_prefix(BULLET_GLYPHS) {
        line = rest.trim_start();
    }
    line.trim_end()
}

/// Skills sharing a display category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

/// Groups skills by category in first-seen order, keeping insertion order
/// inside each group. Skills without a category land in a trailing "Other"
/// group. Blank skill names are skipped.
pub fn group_skills(skills: &[Skill]) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    let mut uncategorized: Vec<String> = Vec::new();

    for skill in skills {
        let name = skill.name.trim();
        if name.is_empty() {
            continue;
        }
        let category = skill.category.trim();
        if category.is_empty() || category.eq_ignore_ascii_case(UNCATEGORIZED) {
            uncategorized.push(name.to_string());
            continue;
        }
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.skills.push(name.to_string()),
            None => groups.push(SkillGroup {
                category: category.to_string(),
                skills: vec![name.to_string()],
            }),
        }
    }

    if !uncategorized.is_empty() {
        groups.push(SkillGroup {
            category: UNCATEGORIZED.to_string(),
            skills: uncategorized,
        });
    }
    groups
}

/// A single contact channel shown in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactItem {
    pub label: String,
    pub href: Option<String>,
}

/// Contact channels in display order, skipping blanks.
pub fn contact_items(personal: &Personal) -> Vec<ContactItem> {
    let mut items = Vec::new();
    let plain = |value: &str| ContactItem {
        label: value.trim().to_string(),
        href: None,
    };
    if !personal.phone.trim().is_empty() {
        items.push(plain(&personal.phone));
    }
    if !personal.email.trim().is_empty() {
        items.push(ContactItem {
            label: personal.email.trim().to_string(),
            href: Some(format!("mailto:{}", personal.email.trim())),
        });
    }
    for (label, url) in [
        ("LinkedIn", &personal.linkedin),
        ("GitHub", &personal.github),
    ] {
        if !url.trim().is_empty() {
            items.push(ContactItem {
                label: label.to_string(),
                href: Some(url.trim().to_string()),
            });
        }
    }
    if !personal.website.trim().is_empty() {
        items.push(ContactItem {
            label: display_url(&personal.website),
            href: Some(personal.website.trim().to_string()),
        });
    }
    items
}

/// Drops the scheme and trailing slash for display.
pub fn display_url(url: &str) -> String {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.trim_end_matches('/').to_string()
}

/// Returns `value` trimmed, or `fallback` when blank.
pub fn or_placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Joins the non-blank parts with `separator`.
pub fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: &str) -> Skill {
        Skill {
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_range_cases() {
        assert_eq!(format_range("", "", false), "");
        assert_eq!(format_range("Jan 2023", "", true), "Jan 2023 – Present");
        assert_eq!(format_range("2018", "2022", false), "2018 – 2022");
        assert_eq!(format_range("2018", "", false), "2018");
        assert_eq!(format_range("", "2022", false), "2022");
    }

    #[test]
    fn test_format_range_current_ignores_end_date() {
        assert_eq!(format_range("Mar 2022", "Dec 2023", true), "Mar 2022 – Present");
    }

    #[test]
    fn test_format_range_without_any_dates_is_empty_even_when_current() {
        assert_eq!(format_range("  ", "", true), "");
    }

    #[test]
    fn test_normalize_bullets_strips_markers_and_blanks() {
        let text = "• Led the team\n\n  - Shipped v2  \n*   Cut costs by 20%\n   \n";
        assert_eq!(
            normalize_bullets(text),
            vec!["Led the team", "Shipped v2", "Cut costs by 20%"]
        );
    }

    #[test]
    fn test_normalize_bullets_is_idempotent() {
        let samples = [
            "• one\n- two\n* three",
            "- - nested marker\n•\n  • •  spaced",
            "plain line\r\nwindows line\r\n",
            "",
            "–\n—\n▸ arrow",
        ];
        for text in samples {
            let once = normalize_bullets(text);
            let twice = normalize_bullets(&once.join("\n"));
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_group_skills_preserves_orders() {
        let skills = vec![
            skill("Go", "Languages"),
            skill("React", "Frontend"),
            skill("Rust", "Languages"),
        ];
        let groups = group_skills(&skills);
        let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["Languages", "Frontend"]);
        assert_eq!(groups[0].skills, vec!["Go", "Rust"]);
    }

    #[test]
    fn test_group_skills_uncategorized_last() {
        let skills = vec![
            skill("Docker", ""),
            skill("Go", "Languages"),
            skill("Kafka", "  "),
        ];
        let groups = group_skills(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].category, UNCATEGORIZED);
        assert_eq!(groups[1].skills, vec!["Docker", "Kafka"]);
    }

    #[test]
    fn test_contact_items_order_and_blanks() {
        let personal = Personal {
            email: "a@b.io".to_string(),
            phone: "555".to_string(),
            website: "https://ana.dev/".to_string(),
            ..Default::default()
        };
        let labels: Vec<_> = contact_items(&personal)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["555", "a@b.io", "ana.dev"]);
    }
}
