//! Frame: the mounted, live container a rendered document is shown in.
//!
//! Mounting is asynchronous. `mount` hands the tree to a background task that
//! builds the `Surface` off the async runtime and attaches it only if no newer
//! mount (or unmount) happened meanwhile. Exports find the container with
//! `await_root`, which polls with a bounded retry budget and hands back an
//! exclusive lease on the mounted surface.

pub mod css;
pub mod layout;
pub mod metrics;
pub mod surface;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::export::error::ExportError;
use crate::render::node::{el, Node};
use crate::render::{TemplateId, SECTION_CLASS};
use surface::{NodeId, Surface, PRINTABLE_ROOT_ATTR};

/// A4 width at 96 dpi, the width the preview is laid out at.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 794.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            interval: Duration::from_millis(100),
            max_attempts: 20,
        }
    }
}

/// Whether the hosted document carries editing chrome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Export button and per-section AI-assist buttons, as in the editor.
    #[default]
    Preview,
    /// Content only.
    Export,
}

#[derive(Debug)]
pub struct MountedFrame {
    generation: u64,
    template: TemplateId,
    mode: FrameMode,
    surface: Surface,
    root: NodeId,
}

impl MountedFrame {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// The printable root container.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}

#[derive(Debug, Default)]
pub struct FrameSlot {
    generation: u64,
    mounted: Option<MountedFrame>,
}

/// Exclusive access to a mounted frame. Held for the duration of an export
/// so edits cannot swap the surface out from under it.
pub type FrameLease = OwnedMappedMutexGuard<FrameSlot, MountedFrame>;

#[derive(Debug, Clone)]
pub struct Frame {
    slot: Arc<Mutex<FrameSlot>>,
    viewport_width: f32,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new(DEFAULT_VIEWPORT_WIDTH)
    }
}

impl Frame {
    pub fn new(viewport_width: f32) -> Self {
        Frame {
            slot: Arc::new(Mutex::new(FrameSlot::default())),
            viewport_width,
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Replaces whatever is mounted with `content`. The returned handle
    /// resolves to `true` once this mount is attached, or `false` if a newer
    /// mount superseded it first.
    pub async fn mount(
        &self,
        content: Node,
        template: TemplateId,
        mode: FrameMode,
    ) -> JoinHandle<bool> {
        let generation = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            slot.mounted = None;
            slot.generation
        };

        let hosted = host_content(content, mode);
        let slot = Arc::clone(&self.slot);
        let width = self.viewport_width;

        tokio::spawn(async move {
            let attached = tokio::task::spawn_blocking(move || {
                let surface = Surface::attach(&hosted, width);
                let root = surface.find_printable_root();
                (surface, root)
            })
            .await;

            let (surface, root) = match attached {
                Ok((surface, Some(root))) => (surface, root),
                Ok((_, None)) => {
                    warn!(generation, "hosted content has no printable root");
                    return false;
                }
                Err(e) => {
                    warn!(generation, error = %e, "frame attach task failed");
                    return false;
                }
            };

            let mut slot = slot.lock().await;
            if slot.generation != generation {
                debug!(
                    generation,
                    current = slot.generation,
                    "discarding superseded frame mount"
                );
                return false;
            }
            debug!(generation, %template, nodes = surface.len(), "frame attached");
            slot.mounted = Some(MountedFrame {
                generation,
                template,
                mode,
                surface,
                root,
            });
            true
        })
    }

    /// Detaches the mounted surface and invalidates any pending mount.
    pub async fn unmount(&self) {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.mounted = None;
        debug!(generation = slot.generation, "frame unmounted");
    }

    /// Polls for the mounted container, sleeping `policy.interval` between
    /// attempts, and gives up after `policy.max_attempts`.
    pub async fn await_root(&self, policy: RetryPolicy) -> Result<FrameLease, ExportError> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            let guard = Arc::clone(&self.slot).lock_owned().await;
            if let Ok(lease) = OwnedMutexGuard::try_map(guard, |slot| slot.mounted.as_mut()) {
                debug!(attempt, generation = lease.generation, "frame root ready");
                return Ok(lease);
            }
            if attempt < attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }
        warn!(attempts, "frame root never became available");
        Err(ExportError::FrameUnavailable { attempts })
    }
}

/// Wraps template output in the printable container. Preview mode adds the
/// editor's interactive chrome, which exports must strip.
pub fn host_content(content: Node, mode: FrameMode) -> Node {
    let mut container = el("div")
        .class("resume-container")
        .attr(PRINTABLE_ROOT_ATTR, "true")
        .css("background-color", "#ffffff");

    match mode {
        FrameMode::Export => container.child(content).into(),
        FrameMode::Preview => {
            container = container.child(
                el("div")
                    .class("no-print")
                    .class("preview-toolbar")
                    .css("display", "flex")
                    .css("justify-content", "flex-end")
                    .css("padding", "8px")
                    .child(el("button").class("export-button").text("Export PDF")),
            );
            let mut content = content;
            add_assist_buttons(&mut content);
            container.child(content).into()
        }
    }
}

fn add_assist_buttons(node: &mut Node) {
    if let Node::Element(element) = node {
        for child in &mut element.children {
            add_assist_buttons(child);
        }
        if element.has_class(SECTION_CLASS) {
            element.children.push(
                el("button")
                    .class("ai-assist-button")
                    .attr("type", "button")
                    .text("AI Assist")
                    .into(),
            );
        }
    }
}
