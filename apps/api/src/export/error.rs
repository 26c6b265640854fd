use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pipeline step a host failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Fonts,
    Capture,
    Rasterize,
    Assemble,
    Save,
    Print,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportStage::Fonts => "font loading",
            ExportStage::Capture => "capture",
            ExportStage::Rasterize => "rasterization",
            ExportStage::Assemble => "PDF assembly",
            ExportStage::Save => "save",
            ExportStage::Print => "print",
        })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("preview container was not available after {attempts} attempts")]
    FrameUnavailable { attempts: u32 },

    #[error("content has no size to export ({width}x{height})")]
    EmptyContent { width: f32, height: f32 },

    #[error("print surface could not be opened: {0}")]
    PrintSurfaceBlocked(String),

    #[error("export failed during {stage}: {source:#}")]
    Failed {
        stage: ExportStage,
        #[source]
        source: anyhow::Error,
    },
}

impl ExportError {
    /// Wraps a host failure, keeping the original cause.
    pub fn failed(stage: ExportStage, source: impl Into<anyhow::Error>) -> Self {
        ExportError::Failed {
            stage,
            source: source.into(),
        }
    }

    /// Stable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::FrameUnavailable { .. } => "PREVIEW_NOT_READY",
            ExportError::EmptyContent { .. } => "EMPTY_CONTENT",
            ExportError::PrintSurfaceBlocked(_) => "PRINT_SURFACE_BLOCKED",
            ExportError::Failed { .. } => "EXPORT_FAILED",
        }
    }

    /// What the user should do about it.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::FrameUnavailable { .. } => {
                "The preview is not ready yet. Wait a moment and try again."
            }
            ExportError::EmptyContent { .. } => {
                "There is nothing to export yet. Add some content to your resume first."
            }
            ExportError::PrintSurfaceBlocked(_) => {
                "The print window was blocked. Allow pop-ups for this site and try again."
            }
            ExportError::Failed { .. } => "Export failed. Please try again.",
        }
    }
}
