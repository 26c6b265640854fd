//! Capturing a frame for rasterization.
//!
//! The live surface is restyled for capture inside a `CaptureScope`, which
//! records every inline declaration it touches and puts them all back when
//! dropped, whether the capture succeeded or not.

use crate::frame::surface::{LiveNode, NodeId, Surface};
use crate::render::SECTION_CLASS;

/// Declarations forced on the printable root while it is captured.
const ROOT_OVERRIDES: &[(&str, &str)] = &[
    ("display", "block"),
    ("visibility", "visible"),
    ("position", "relative"),
    ("overflow", "visible"),
    ("transform", "none"),
];

const LINK_COLOR: &str = "#0000EE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    /// Device pixels per CSS pixel.
    pub scale: f32,
}

impl Default for RasterRequest {
    fn default() -> Self {
        RasterRequest { scale: 2.0 }
    }
}

/// An opaque RGBA8 image of the captured content.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
    pub rgba: Vec<u8>,
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        surface: &Surface,
        root: NodeId,
        request: &RasterRequest,
    ) -> anyhow::Result<Raster>;
}

// ────────────────────────────────────────────────────────────────────────────
// Capture scope
// ────────────────────────────────────────────────────────────────────────────

pub struct CaptureScope<'a> {
    surface: &'a mut Surface,
    saved: Vec<(NodeId, &'static str, Option<String>)>,
}

impl<'a> CaptureScope<'a> {
    /// Makes the subtree at `root` capturable: the root is forced visible
    /// and in flow, chrome is hidden, and links are styled per
    /// `include_links`.
    pub fn acquire(surface: &'a mut Surface, root: NodeId, include_links: bool) -> Self {
        let mut scope = CaptureScope {
            surface,
            saved: Vec::new(),
        };

        for &(property, value) in ROOT_OVERRIDES {
            scope.set(root, property, value);
        }
        for id in scope.surface.query(root, LiveNode::is_non_printable) {
            scope.set(id, "display", "none");
        }
        for id in scope.surface.query(root, |n| n.tag() == Some("a")) {
            if include_links {
                scope.set(id, "color", LINK_COLOR);
                scope.set(id, "text-decoration", "underline");
            } else {
                scope.set(id, "color", "inherit");
                scope.set(id, "text-decoration", "none");
            }
        }
        scope
    }

    fn set(&mut self, id: NodeId, property: &'static str, value: &str) {
        let previous = self.surface.set_style(id, property, Some(value));
        self.saved.push((id, property, previous));
    }

    pub fn surface(&self) -> &Surface {
        self.surface
    }

    /// Number of declarations that will be restored.
    pub fn touched(&self) -> usize {
        self.saved.len()
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        while let Some((id, property, previous)) = self.saved.pop() {
            self.surface.set_style(id, property, previous.as_deref());
        }
    }
}

/// Row ranges `(top, bottom)` of every section under `root`, in device
/// pixels at `scale`.
pub fn section_spans(surface: &Surface, root: NodeId, scale: f32) -> Vec<(u32, u32)> {
    let Some(layout) = surface.layout(root) else {
        return Vec::new();
    };
    layout
        .find(|b| surface.node(b.node).has_class(SECTION_CLASS))
        .into_iter()
        .filter(|b| b.rect.height > 0.0)
        .map(|b| {
            let top = (b.rect.y - layout.rect.y).max(0.0) * scale;
            let bottom = (b.rect.bottom() - layout.rect.y).max(0.0) * scale;
            (top.floor() as u32, bottom.ceil() as u32)
        })
        .collect()
}
