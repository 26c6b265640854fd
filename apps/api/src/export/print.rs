//! Strategy A: hand a print-ready HTML document to the platform's print
//! facility and let it paginate.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::export::config::ExportConfig;
use crate::export::error::{ExportError, ExportStage};
use crate::frame::surface::{is_chrome, NodeId, Surface};
use crate::frame::{Frame, RetryPolicy};
use crate::render::html::{escape_text, to_html};
use crate::render::node::Node;

pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(30);

const BASE_CSS: &str = "\
*, *::before, *::after { box-sizing: border-box; }
html, body { margin: 0; padding: 0; background: #ffffff; }
body { font-family: Inter, Roboto, 'Helvetica Neue', Arial, sans-serif; }
* { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }
[style*=\"background\"], [style*=\"color\"] { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }
.resume-container { width: 100%; max-width: 100%; margin: 0; padding: 0; box-shadow: none; border: none; }
.resume-section { page-break-inside: avoid; break-inside: avoid; }
h1, h2, h3, h4, h5, h6 { page-break-after: avoid; break-after: avoid; page-break-inside: avoid; }
";

const LINKS_SHOWN: &str = "a { color: #0000EE !important; text-decoration: underline !important; }";
const LINKS_PLAIN: &str = "a { color: inherit !important; text-decoration: none !important; }";

/// A standalone HTML document ready for a print facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintDocument {
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintOutcome {
    Completed,
    /// The job never reported back; it was closed and treated as done.
    TimedOut,
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("print surface blocked: {0}")]
    Blocked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait PrintFacility: Send + Sync {
    async fn open(&self, document: PrintDocument) -> Result<Box<dyn PrintJob>, PrintError>;
}

#[async_trait]
pub trait PrintJob: Send {
    /// Resolves when the job completes or is dismissed.
    async fn wait(&mut self) -> anyhow::Result<()>;

    async fn close(&mut self);
}

/// Builds the print document for the subtree at `root`: chrome removed,
/// page geometry and colour rules added.
pub fn build_print_document(surface: &Surface, root: NodeId, config: &ExportConfig) -> PrintDocument {
    let mut content = surface.clone_subtree(root);
    strip_chrome(&mut content);

    let title = config
        .filename()
        .trim_end_matches(".pdf")
        .to_string();
    let links = if config.include_links() {
        LINKS_SHOWN
    } else {
        LINKS_PLAIN
    };

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{}\n{BASE_CSS}{links}\n</style>\n</head>\n\
         <body>\n{}\n</body>\n</html>\n",
        escape_text(&title),
        config.page_css(),
        to_html(&content),
    );
    PrintDocument { title, html }
}

fn strip_chrome(node: &mut Node) {
    if let Node::Element(element) = node {
        element.children.retain(|child| match child {
            Node::Element(e) => !is_chrome(&e.tag, &e.classes),
            Node::Text { .. } => true,
        });
        for child in &mut element.children {
            strip_chrome(child);
        }
    }
}

/// Runs Strategy A end to end. The frame is only read, never mutated.
pub async fn print(
    frame: &Frame,
    config: &ExportConfig,
    facility: &dyn PrintFacility,
    policy: RetryPolicy,
    timeout: Duration,
) -> Result<PrintOutcome, ExportError> {
    let document = {
        let lease = frame.await_root(policy).await?;
        build_print_document(lease.surface(), lease.root(), config)
    };
    debug!(title = %document.title, bytes = document.html.len(), "print document built");

    let mut job = facility.open(document).await.map_err(|e| match e {
        PrintError::Blocked(reason) => ExportError::PrintSurfaceBlocked(reason),
        PrintError::Other(source) => ExportError::failed(ExportStage::Print, source),
    })?;

    let outcome = match tokio::time::timeout(timeout, job.wait()).await {
        Ok(Ok(())) => PrintOutcome::Completed,
        Ok(Err(e)) => {
            job.close().await;
            return Err(ExportError::failed(ExportStage::Print, e));
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "print job did not finish; closing it");
            PrintOutcome::TimedOut
        }
    };
    job.close().await;
    info!(?outcome, "print finished");
    Ok(outcome)
}

// ────────────────────────────────────────────────────────────────────────────
// Facilities
// ────────────────────────────────────────────────────────────────────────────

/// Keeps the document so the caller can hand it to a browser, which then
/// owns the print dialog.
#[derive(Debug, Default)]
pub struct SpoolPrintFacility {
    spooled: Mutex<Option<PrintDocument>>,
}

impl SpoolPrintFacility {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn take(&self) -> Option<PrintDocument> {
        self.spooled.lock().await.take()
    }
}

struct SpooledJob;

#[async_trait]
impl PrintJob for SpooledJob {
    async fn wait(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn close(&mut self) {}
}

#[async_trait]
impl PrintFacility for SpoolPrintFacility {
    async fn open(&self, document: PrintDocument) -> Result<Box<dyn PrintJob>, PrintError> {
        *self.spooled.lock().await = Some(document);
        Ok(Box::new(SpooledJob))
    }
}

/// Pipes the document to a print command such as `lp`.
#[derive(Debug, Clone)]
pub struct CommandPrintFacility {
    program: String,
    args: Vec<String>,
}

impl CommandPrintFacility {
    /// Splits a command line like `lp -d office` on whitespace.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(CommandPrintFacility {
            program,
            args: parts.collect(),
        })
    }
}

struct CommandJob {
    child: Child,
}

#[async_trait]
impl PrintJob for CommandJob {
    async fn wait(&mut self) -> anyhow::Result<()> {
        let status = self.child.wait().await?;
        if !status.success() {
            anyhow::bail!("print command exited with {status}");
        }
        Ok(())
    }

    async fn close(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.start_kill() {
                warn!(error = %e, "could not stop print command");
            }
        }
    }
}

#[async_trait]
impl PrintFacility for CommandPrintFacility {
    async fn open(&self, document: PrintDocument) -> Result<Box<dyn PrintJob>, PrintError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrintError::Blocked(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(document.html.as_bytes())
                .await
                .map_err(anyhow::Error::from)?;
        }
        debug!(program = %self.program, "document sent to print command");
        Ok(Box::new(CommandJob { child }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::document::demo::demo_document;
    use crate::export::config::{ExportDefaults, ExportRequest};
    use crate::frame::FrameMode;
    use crate::render::{render, TemplateId};

    fn config(include_links: bool) -> ExportConfig {
        let doc = demo_document();
        ExportConfig::new(
            ExportRequest {
                include_links: Some(include_links),
                ..Default::default()
            },
            &doc.personal,
            &ExportDefaults::default(),
        )
        .unwrap()
    }

    async fn mounted_frame() -> Frame {
        let frame = Frame::default();
        let handle = frame
            .mount(
                render(&demo_document(), TemplateId::Classic),
                TemplateId::Classic,
                FrameMode::Preview,
            )
            .await;
        assert!(handle.await.unwrap());
        frame
    }

    struct HangingFacility {
        closed: Arc<AtomicBool>,
    }

    struct HangingJob {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl PrintJob for HangingJob {
        async fn wait(&mut self) -> anyhow::Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PrintFacility for HangingFacility {
        async fn open(&self, _document: PrintDocument) -> Result<Box<dyn PrintJob>, PrintError> {
            Ok(Box::new(HangingJob {
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    struct BlockedFacility;

    #[async_trait]
    impl PrintFacility for BlockedFacility {
        async fn open(&self, _document: PrintDocument) -> Result<Box<dyn PrintJob>, PrintError> {
            Err(PrintError::Blocked("pop-up blocked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_print_strips_chrome_and_sets_page() {
        let frame = mounted_frame().await;
        let facility = SpoolPrintFacility::new();
        let outcome = print(
            &frame,
            &config(true),
            &facility,
            RetryPolicy::default(),
            DEFAULT_PRINT_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(outcome, PrintOutcome::Completed);

        let document = facility.take().await.unwrap();
        assert_eq!(document.title, "jordan-rivera-resume");
        assert!(!document.html.contains("<button"));
        assert!(!document.html.contains("preview-toolbar"));
        assert!(document.html.contains("@page { size: 210mm 297mm; margin: 19.05mm 15.24mm 19.05mm 15.24mm; }"));
        assert!(document.html.contains("print-color-adjust: exact"));
        assert!(document.html.contains(LINKS_SHOWN));
        assert!(document.html.contains("Jordan Rivera"));
    }

    #[tokio::test]
    async fn test_print_without_links_uses_plain_links() {
        let frame = mounted_frame().await;
        let facility = SpoolPrintFacility::new();
        print(
            &frame,
            &config(false),
            &facility,
            RetryPolicy::default(),
            DEFAULT_PRINT_TIMEOUT,
        )
        .await
        .unwrap();
        let html = facility.take().await.unwrap().html;
        assert!(html.contains(LINKS_PLAIN));
        assert!(!html.contains(LINKS_SHOWN));
    }

    #[tokio::test]
    async fn test_print_leaves_live_frame_untouched() {
        let frame = mounted_frame().await;
        let before = {
            let lease = frame.await_root(RetryPolicy::default()).await.unwrap();
            lease.surface().clone_subtree(lease.root())
        };
        print(
            &frame,
            &config(true),
            &SpoolPrintFacility::new(),
            RetryPolicy::default(),
            DEFAULT_PRINT_TIMEOUT,
        )
        .await
        .unwrap();
        let lease = frame.await_root(RetryPolicy::default()).await.unwrap();
        assert_eq!(lease.surface().clone_subtree(lease.root()), before);
    }

    #[tokio::test]
    async fn test_print_timeout_closes_job_and_completes() {
        let frame = mounted_frame().await;
        tokio::time::pause();
        let closed = Arc::new(AtomicBool::new(false));
        let facility = HangingFacility {
            closed: Arc::clone(&closed),
        };
        let outcome = print(
            &frame,
            &config(true),
            &facility,
            RetryPolicy::default(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(outcome, PrintOutcome::TimedOut);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_blocked_print_surface_is_distinguished() {
        let frame = mounted_frame().await;
        let err = print(
            &frame,
            &config(true),
            &BlockedFacility,
            RetryPolicy::default(),
            DEFAULT_PRINT_TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::PrintSurfaceBlocked(_)));
        assert_eq!(err.code(), "PRINT_SURFACE_BLOCKED");
    }

    #[tokio::test]
    async fn test_missing_print_command_is_blocked() {
        let facility =
            CommandPrintFacility::from_command_line("definitely-not-a-print-command-7f3a").unwrap();
        let document = PrintDocument {
            title: "resume".to_string(),
            html: "<html></html>".to_string(),
        };
        assert!(matches!(
            facility.open(document).await,
            Err(PrintError::Blocked(_))
        ));
        assert!(CommandPrintFacility::from_command_line("   ").is_none());
    }
}
