//! Turning a mounted frame into paper.
//!
//! Two strategies share one configuration and one error type:
//! - `print::print` hands a print-ready HTML document to a print facility
//!   (Strategy A, vector output, pagination left to the facility);
//! - `pdf::export_pdf` rasterizes the frame and assembles the image into a
//!   PDF itself (Strategy B).
//!
//! Neither leaves a trace on the live frame.

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod paginate;
pub mod pdf;
pub mod print;
pub mod raster;
pub mod sink;
pub mod svg;

use std::time::Duration;

use crate::frame::RetryPolicy;

/// Runtime knobs shared by both strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    /// Device pixels per CSS pixel for Strategy B.
    pub raster_scale: f32,
    pub print_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            retry: RetryPolicy::default(),
            raster_scale: 2.0,
            print_timeout: print::DEFAULT_PRINT_TIMEOUT,
        }
    }
}
