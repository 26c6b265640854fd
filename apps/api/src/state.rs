use std::sync::Arc;

use crate::assist::AssistClient;
use crate::config::Config;
use crate::document::store::SessionStore;
use crate::export::host::ExportHost;
use crate::export::raster::Rasterizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub config: Config,
    /// `None` when no AI backend is configured.
    pub assist: Option<AssistClient>,
    /// Readiness signals awaited before a capture.
    pub host: Arc<dyn ExportHost>,
    /// Pluggable rasterizer for PDF export. Default: SvgRasterizer.
    pub rasterizer: Arc<dyn Rasterizer>,
}
