//! Field-level validation for the editing UI.
//!
//! Issues are reported per field path (e.g. `personal.email`,
//! `experience.1.company`). Validation never blocks rendering or export; the
//! renderer normalizes whatever it is given.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use crate::document::model::Document;

pub const MAX_SHORT_TEXT_LENGTH: usize = 500;
pub const MAX_TEXT_LENGTH: usize = 10_000;
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    pub fn issue_for(&self, field: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.field == field)
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<FieldIssue>,
}

impl Checker {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{label} is required"));
        } else {
            self.max_len(field, value, MAX_SHORT_TEXT_LENGTH);
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.push(field, format!("Must be at most {max} characters (got {len})"));
        }
    }

    fn url(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if value.len() > MAX_URL_LENGTH {
            self.push(field, format!("URL must be at most {MAX_URL_LENGTH} characters"));
            return;
        }
        if !is_absolute_web_url(value) {
            self.push(field, "Must be a valid absolute URL (http or https)");
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() && !email_pattern().is_match(value) {
            self.push(field, "Provide a valid email address");
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn is_absolute_web_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Validates every field of the document and collects all issues.
pub fn validate_document(doc: &Document) -> ValidationReport {
    let mut check = Checker::default();

    let personal = &doc.personal;
    check.required("personal.firstName", &personal.first_name, "First name");
    check.required("personal.lastName", &personal.last_name, "Last name");
    check.max_len("personal.title", &personal.title, MAX_SHORT_TEXT_LENGTH);
    check.email("personal.email", &personal.email);
    check.max_len("personal.phone", &personal.phone, 50);
    check.url("personal.website", &personal.website);
    check.url("personal.linkedin", &personal.linkedin);
    check.url("personal.github", &personal.github);

    check.max_len("summary", &doc.summary, MAX_TEXT_LENGTH);

    for (i, exp) in doc.experience.iter().enumerate() {
        check.required(&format!("experience.{i}.company"), &exp.company, "Company");
        check.required(&format!("experience.{i}.position"), &exp.position, "Position");
        check.max_len(
            &format!("experience.{i}.description"),
            &exp.description,
            MAX_TEXT_LENGTH,
        );
    }

    for (i, edu) in doc.education.iter().enumerate() {
        check.required(
            &format!("education.{i}.institution"),
            &edu.institution,
            "Institution",
        );
        check.required(&format!("education.{i}.degree"), &edu.degree, "Degree");
    }

    for (i, skill) in doc.skills.iter().enumerate() {
        check.required(&format!("skills.{i}.name"), &skill.name, "Skill name");
    }

    for (i, project) in doc.projects.iter().enumerate() {
        check.required(&format!("projects.{i}.name"), &project.name, "Project name");
        check.max_len(
            &format!("projects.{i}.description"),
            &project.description,
            MAX_TEXT_LENGTH,
        );
        check.url(&format!("projects.{i}.url"), &project.url);
        check.url(&format!("projects.{i}.repositoryUrl"), &project.repository_url);
    }

    for (i, achievement) in doc.achievements.iter().enumerate() {
        check.required(&format!("achievements.{i}.title"), &achievement.title, "Title");
    }

    let extras = [
        ("languages", &doc.extras.languages),
        ("certifications", &doc.extras.certifications),
        ("interests", &doc.extras.interests),
    ];
    for (group, items) in extras {
        for (i, item) in items.iter().enumerate() {
            if item.trim().is_empty() {
                check.push(format!("extras.{group}.{i}"), "Entry cannot be empty");
            }
        }
    }

    ValidationReport {
        valid: check.issues.is_empty(),
        issues: check.issues,
    }
}
