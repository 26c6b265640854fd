//! Export configuration: paper size, margins, link styling and file name.
//!
//! All lengths are millimetres. An `ExportConfig` is validated once in
//! `ExportConfig::new` and immutable afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::model::Personal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    #[serde(rename = "A4", alias = "a4")]
    A4,
    #[serde(rename = "Letter", alias = "letter")]
    Letter,
}

impl PaperSize {
    /// (width, height) in millimetres, portrait.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::Letter => "Letter",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" | "us-letter" => Ok(PaperSize::Letter),
            other => Err(format!("unknown paper size '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Margins
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBox {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl MarginBox {
    pub const fn uniform(mm: f32) -> Self {
        MarginBox {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }

    /// CSS `margin` value, e.g. `19.05mm 15.24mm 19.05mm 15.24mm`.
    pub fn css(&self) -> String {
        format!(
            "{}mm {}mm {}mm {}mm",
            self.top, self.right, self.bottom, self.left
        )
    }

    fn sides(&self) -> [(&'static str, f32); 4] {
        [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ]
    }
}

/// Named margin presets. `Resume` is the default: slightly tighter at the
/// sides than top and bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginProfile {
    /// 0.5 in.
    Small,
    /// 1 in.
    Medium,
    /// 1.5 in.
    Large,
    /// 0.75 in top and bottom, 0.6 in left and right.
    #[default]
    Resume,
    Custom(MarginBox),
}

impl MarginProfile {
    pub fn resolve(&self) -> MarginBox {
        match self {
            MarginProfile::Small => MarginBox::uniform(12.7),
            MarginProfile::Medium => MarginBox::uniform(25.4),
            MarginProfile::Large => MarginBox::uniform(38.1),
            MarginProfile::Resume => MarginBox {
                top: 19.05,
                right: 15.24,
                bottom: 19.05,
                left: 15.24,
            },
            MarginProfile::Custom(margins) => *margins,
        }
    }
}

impl FromStr for MarginProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(MarginProfile::Small),
            "medium" => Ok(MarginProfile::Medium),
            "large" => Ok(MarginProfile::Large),
            "resume" => Ok(MarginProfile::Resume),
            other => Err(format!("unknown margin profile '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / validated config
// ────────────────────────────────────────────────────────────────────────────

/// Export options as sent by a client. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRequest {
    pub paper_size: Option<PaperSize>,
    pub margins: Option<MarginProfile>,
    /// Links stay visually distinct in the output. Defaults to `true`.
    pub include_links: Option<bool>,
    pub filename: Option<String>,
}

/// Service-wide defaults used when a request leaves a field out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportDefaults {
    pub paper: PaperSize,
    pub margins: MarginProfile,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{side} margin must be a finite number")]
    NonFiniteMargin { side: &'static str },

    #[error("{side} margin must not be negative (got {value}mm)")]
    NegativeMargin { side: &'static str, value: f32 },

    #[error("margins leave no printable area on {paper} paper")]
    NoPrintableArea { paper: PaperSize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    paper: PaperSize,
    margins: MarginBox,
    include_links: bool,
    filename: String,
}

impl ExportConfig {
    pub fn new(
        request: ExportRequest,
        personal: &Personal,
        defaults: &ExportDefaults,
    ) -> Result<Self, ConfigError> {
        let paper = request.paper_size.unwrap_or(defaults.paper);
        let margins = request.margins.unwrap_or(defaults.margins).resolve();

        for (side, value) in margins.sides() {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteMargin { side });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeMargin { side, value });
            }
        }

        let (width, height) = paper.dimensions_mm();
        if margins.left + margins.right >= width || margins.top + margins.bottom >= height {
            return Err(ConfigError::NoPrintableArea { paper });
        }

        let filename = request
            .filename
            .as_deref()
            .and_then(sanitize_filename)
            .unwrap_or_else(|| default_filename(personal));

        Ok(ExportConfig {
            paper,
            margins,
            include_links: request.include_links.unwrap_or(true),
            filename,
        })
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn margins(&self) -> MarginBox {
        self.margins
    }

    pub fn include_links(&self) -> bool {
        self.include_links
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// (width, height) of the area inside the margins, in millimetres.
    pub fn printable_area_mm(&self) -> (f32, f32) {
        let (width, height) = self.paper.dimensions_mm();
        (
            width - self.margins.left - self.margins.right,
            height - self.margins.top - self.margins.bottom,
        )
    }

    /// The `@page` rule for print output.
    pub fn page_css(&self) -> String {
        let (width, height) = self.paper.dimensions_mm();
        format!(
            "@page {{ size: {width}mm {height}mm; margin: {}; }}",
            self.margins.css()
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// File names
// ────────────────────────────────────────────────────────────────────────────

/// Lowercases, collapses whitespace and punctuation to `-`, strips anything
/// not filesystem-safe and appends `.pdf`. `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stem = if trimmed.to_ascii_lowercase().ends_with(".pdf") {
        &trimmed[..trimmed.len() - 4]
    } else {
        trimmed
    };
    let slug = slug::slugify(stem);
    if slug.is_empty() {
        None
    } else {
        Some(format!("{slug}.pdf"))
    }
}

/// `<first>-<last>-resume.pdf`, or `resume.pdf` without a name.
pub fn default_filename(personal: &Personal) -> String {
    let name = personal.full_name();
    if name.trim().is_empty() {
        return "resume.pdf".to_string();
    }
    sanitize_filename(&format!("{name} resume")).unwrap_or_else(|| "resume.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal(first: &str, last: &str) -> Personal {
        Personal {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
    }

    fn config(request: ExportRequest) -> Result<ExportConfig, ConfigError> {
        ExportConfig::new(request, &personal("Jordan", "Rivera"), &ExportDefaults::default())
    }

    #[test]
    fn test_default_filename_from_name() {
        let cfg = config(ExportRequest::default()).unwrap();
        assert_eq!(cfg.filename(), "jordan-rivera-resume.pdf");
        assert_eq!(default_filename(&personal("", "")), "resume.pdf");
        assert_eq!(default_filename(&personal("José", "")), "jose-resume.pdf");
    }

    #[test]
    fn test_supplied_filename_is_sanitized() {
        let cfg = config(ExportRequest {
            filename: Some("  My  CV / Final.PDF ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cfg.filename(), "my-cv-final.pdf");

        let cfg = config(ExportRequest {
            filename: Some("///".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cfg.filename(), "jordan-rivera-resume.pdf");
    }

    #[test]
    fn test_margin_profiles_resolve_to_millimetres() {
        assert_eq!(MarginProfile::Small.resolve(), MarginBox::uniform(12.7));
        assert_eq!(MarginProfile::Medium.resolve(), MarginBox::uniform(25.4));
        assert_eq!(MarginProfile::Large.resolve(), MarginBox::uniform(38.1));
        let resume = MarginProfile::default().resolve();
        assert_eq!((resume.top, resume.left), (19.05, 15.24));
    }

    #[test]
    fn test_defaults_are_a4_resume_with_links() {
        let cfg = config(ExportRequest::default()).unwrap();
        assert_eq!(cfg.paper(), PaperSize::A4);
        assert_eq!(cfg.margins(), MarginProfile::Resume.resolve());
        assert!(cfg.include_links());
        let (w, h) = cfg.printable_area_mm();
        assert!((w - (210.0 - 30.48)).abs() < 1e-3);
        assert!((h - (297.0 - 38.1)).abs() < 1e-3);
    }

    #[test]
    fn test_negative_custom_margin_rejected() {
        let err = config(ExportRequest {
            margins: Some(MarginProfile::Custom(MarginBox {
                top: 10.0,
                right: -1.0,
                bottom: 10.0,
                left: 10.0,
            })),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NegativeMargin {
                side: "right",
                value: -1.0
            }
        );
    }

    #[test]
    fn test_non_finite_and_oversized_margins_rejected() {
        let nan = config(ExportRequest {
            margins: Some(MarginProfile::Custom(MarginBox::uniform(f32::NAN))),
            ..Default::default()
        });
        assert!(matches!(nan, Err(ConfigError::NonFiniteMargin { side: "top" })));

        let huge = config(ExportRequest {
            paper_size: Some(PaperSize::Letter),
            margins: Some(MarginProfile::Custom(MarginBox::uniform(110.0))),
            ..Default::default()
        });
        assert_eq!(
            huge,
            Err(ConfigError::NoPrintableArea {
                paper: PaperSize::Letter
            })
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ExportRequest = serde_json::from_str(
            r#"{"paperSize":"Letter","margins":"small","includeLinks":false}"#,
        )
        .unwrap();
        let cfg = config(request).unwrap();
        assert_eq!(cfg.paper(), PaperSize::Letter);
        assert_eq!(cfg.margins(), MarginBox::uniform(12.7));
        assert!(!cfg.include_links());
        assert_eq!(
            cfg.page_css(),
            "@page { size: 215.9mm 279.4mm; margin: 12.7mm 12.7mm 12.7mm 12.7mm; }"
        );
    }
}
