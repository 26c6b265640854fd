//! Host seams the export pipeline waits on before capturing.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use resvg::usvg::fontdb;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

#[async_trait]
pub trait ExportHost: Send + Sync {
    /// Resolves once every font the document may use is loaded.
    async fn fonts_ready(&self) -> anyhow::Result<()>;

    /// Yields once so pending layout work settles before measuring.
    async fn next_frame(&self);
}

/// System fonts, loaded on first use and shared by every export.
#[derive(Debug, Default)]
pub struct FontLibrary {
    db: OnceCell<Arc<fontdb::Database>>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded database. The first caller pays for the filesystem scan;
    /// concurrent callers wait on the same load.
    pub async fn database(&self) -> anyhow::Result<Arc<fontdb::Database>> {
        self.db
            .get_or_try_init(|| async {
                tokio::task::spawn_blocking(|| {
                    let mut db = fontdb::Database::new();
                    db.load_system_fonts();
                    if db.is_empty() {
                        warn!("no system fonts found; rasterized text will be missing");
                    } else {
                        debug!(faces = db.len(), "font database loaded");
                    }
                    Arc::new(db)
                })
                .await
                .context("font loading task failed")
            })
            .await
            .cloned()
    }

    /// The database if it has already been loaded.
    pub fn loaded(&self) -> Option<Arc<fontdb::Database>> {
        self.db.get().cloned()
    }
}

/// The server-side host: fonts come from the shared library and a frame
/// boundary is a scheduler yield.
#[derive(Debug, Clone)]
pub struct ServerHost {
    fonts: Arc<FontLibrary>,
}

impl ServerHost {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        ServerHost { fonts }
    }
}

#[async_trait]
impl ExportHost for ServerHost {
    async fn fonts_ready(&self) -> anyhow::Result<()> {
        self.fonts.database().await.map(|_| ())
    }

    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }
}
