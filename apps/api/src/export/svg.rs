//! Built-in rasterizer: paints the surface's layout as SVG and renders it
//! with resvg.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use resvg::tiny_skia;
use resvg::usvg;
use tracing::debug;

use crate::export::host::FontLibrary;
use crate::export::raster::{Raster, RasterRequest, Rasterizer};
use crate::frame::css::{self, BorderSide};
use crate::frame::layout::{Fragment, LayoutBox};
use crate::frame::metrics::FontFamily;
use crate::frame::surface::{NodeId, Surface};

/// Largest raster edge, in device pixels.
const MAX_EDGE: f32 = 16_384.0;
/// Smallest scale still legible once placed on a page.
const MIN_SCALE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct SvgRasterizer {
    fonts: Arc<FontLibrary>,
}

impl SvgRasterizer {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        SvgRasterizer { fonts }
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(
        &self,
        surface: &Surface,
        root: NodeId,
        request: &RasterRequest,
    ) -> anyhow::Result<Raster> {
        let fontdb = self
            .fonts
            .loaded()
            .context("font database has not been loaded")?;
        let layout = surface
            .layout(root)
            .context("printable root is not displayed")?;

        let (right, bottom) = layout.extent();
        let width = (right - layout.rect.x).ceil().max(1.0);
        let height = (bottom - layout.rect.y).ceil().max(1.0);
        let max_scale = MAX_EDGE / width.max(height);
        if max_scale < MIN_SCALE {
            anyhow::bail!("content too large to rasterize ({width}x{height} px)");
        }
        let svg = paint(&layout, width, height);

        let options = usvg::Options {
            fontdb,
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)?;

        let scale = request.scale.clamp(MIN_SCALE, max_scale);
        let px_width = (width * scale).ceil() as u32;
        let px_height = (height * scale).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(px_width, px_height)
            .with_context(|| format!("cannot allocate a {px_width}x{px_height} raster"))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        debug!(px_width, px_height, scale, "surface rasterized");

        Ok(Raster {
            width: px_width,
            height: px_height,
            scale,
            rgba: pixmap.take(),
        })
    }
}

/// SVG markup for a laid-out tree, translated so `root` sits at the origin.
pub fn paint(root: &LayoutBox, width: f32, height: f32) -> String {
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\n<g transform=\"translate({} {})\">\n",
        -root.rect.x, -root.rect.y
    );
    paint_box(root, &mut out);
    out.push_str("</g>\n</svg>\n");
    out
}

fn paint_box(b: &LayoutBox, out: &mut String) {
    if b.visible {
        if let Some(background) = b.background.as_deref().filter(|c| css::paints(c)) {
            let _ = writeln!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                b.rect.x,
                b.rect.y,
                b.rect.width,
                b.rect.height,
                escape(background)
            );
        }
        paint_borders(b, out);
        for line in &b.lines {
            for fragment in &line.fragments {
                paint_text(fragment, line.baseline, out);
            }
        }
    }
    for child in &b.children {
        paint_box(child, out);
    }
}

fn paint_borders(b: &LayoutBox, out: &mut String) {
    let r = b.rect;
    let sides: [(&Option<BorderSide>, (f32, f32, f32, f32)); 4] = [
        (&b.borders.top, (r.x, r.y, r.width, 0.0)),
        (&b.borders.bottom, (r.x, r.bottom(), r.width, 0.0)),
        (&b.borders.left, (r.x, r.y, 0.0, r.height)),
        (&b.borders.right, (r.right(), r.y, 0.0, r.height)),
    ];
    for (side, (x, y, w, h)) in sides {
        let Some(side) = side.as_ref().filter(|s| s.width > 0.0 && css::paints(&s.color)) else {
            continue;
        };
        // Borders sit inside the border box.
        let (x, y, w, h) = if h == 0.0 {
            let y = if y == r.y { y } else { y - side.width };
            (x, y, w, side.width)
        } else {
            let x = if x == r.x { x } else { x - side.width };
            (x, y, side.width, h)
        };
        let _ = writeln!(
            out,
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>",
            escape(&side.color)
        );
    }
}

fn paint_text(fragment: &Fragment, baseline: f32, out: &mut String) {
    let style = &fragment.style;
    if !style.visible || fragment.text.is_empty() || !css::paints(&style.color) {
        return;
    }
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{baseline}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" \
         xml:space=\"preserve\"",
        fragment.x,
        family_list(style.family),
        style.font_size,
        escape(&style.color),
    );
    if style.bold {
        out.push_str(" font-weight=\"bold\"");
    }
    if style.italic {
        out.push_str(" font-style=\"italic\"");
    }
    if style.underline {
        out.push_str(" text-decoration=\"underline\"");
    }
    let _ = writeln!(out, ">{}</text>", escape(&fragment.text));
}

/// Font stack per family, ending in the generic name fontdb resolves.
fn family_list(family: FontFamily) -> String {
    let named = match family {
        FontFamily::Sans => "Inter, Roboto, Arial, 'Liberation Sans', 'DejaVu Sans'",
        FontFamily::Serif => "Garamond, 'Times New Roman', 'Liberation Serif', 'DejaVu Serif'",
        FontFamily::Mono => "'Courier New', 'Liberation Mono', 'DejaVu Sans Mono'",
    };
    format!("{named}, {}", family.generic_name())
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::demo::demo_document;
    use crate::frame::{host_content, FrameMode};
    use crate::render::node::el;
    use crate::render::{render, TemplateId};

    #[test]
    fn test_paint_emits_backgrounds_borders_and_text() {
        let node = el("div")
            .css("background-color", "#eff6ff")
            .css("border-bottom", "1px solid #000000")
            .child(el("span").css("font-weight", "700").text("Tom & Jerry"))
            .into();
        let surface = Surface::attach(&node, 300.0);
        let layout = surface.layout(surface.root()).unwrap();
        let svg = paint(&layout, 300.0, 40.0);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"#eff6ff\""));
        assert!(svg.contains("fill=\"#000000\"/>"));
        assert!(svg.contains(">Tom &amp; Jerry</text>"));
        assert!(svg.contains("font-weight=\"bold\""));
    }

    #[test]
    fn test_hidden_text_is_not_painted() {
        let node = el("div")
            .child(el("p").css("visibility", "hidden").text("secret"))
            .child(el("p").css("display", "none").text("gone"))
            .child(el("p").text("shown"))
            .into();
        let surface = Surface::attach(&node, 300.0);
        let svg = paint(&surface.layout(surface.root()).unwrap(), 300.0, 100.0);
        assert!(!svg.contains("secret"));
        assert!(!svg.contains("gone"));
        assert!(svg.contains("shown"));
    }

    #[test]
    fn test_rasterize_requires_loaded_fonts() {
        let surface = Surface::attach(&el("div").text("x").into(), 100.0);
        let rasterizer = SvgRasterizer::new(Arc::new(FontLibrary::new()));
        let err = rasterizer
            .rasterize(&surface, surface.root(), &RasterRequest::default())
            .unwrap_err();
        assert!(err.to_string().contains("font database"));
    }

    #[tokio::test]
    async fn test_oversized_content_is_an_error() {
        let fonts = Arc::new(FontLibrary::new());
        fonts.database().await.unwrap();
        let node = el("div").css("height", "70000px").text("long").into();
        let surface = Surface::attach(&node, 100.0);
        assert!(surface.measure(surface.root()).height >= 70_000.0);

        let err = SvgRasterizer::new(fonts)
            .rasterize(&surface, surface.root(), &RasterRequest { scale: 2.0 })
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_tall_content_is_scaled_down() {
        let fonts = Arc::new(FontLibrary::new());
        fonts.database().await.unwrap();
        let node = el("div").css("height", "20000px").text("tall").into();
        let surface = Surface::attach(&node, 100.0);

        let raster = SvgRasterizer::new(fonts)
            .rasterize(&surface, surface.root(), &RasterRequest { scale: 2.0 })
            .unwrap();
        assert!(raster.scale < 1.0);
        assert!(raster.height as f32 <= MAX_EDGE + 1.0);
    }

    #[tokio::test]
    async fn test_rasterize_demo_at_scale() {
        let fonts = Arc::new(FontLibrary::new());
        fonts.database().await.unwrap();
        let hosted = host_content(
            render(&demo_document(), TemplateId::Modern),
            FrameMode::Export,
        );
        let surface = Surface::attach(&hosted, 794.0);
        let root = surface.find_printable_root().unwrap();
        let size = surface.measure(root);

        let raster = SvgRasterizer::new(fonts)
            .rasterize(&surface, root, &RasterRequest { scale: 2.0 })
            .unwrap();
        assert_eq!(raster.width, (size.width.ceil() * 2.0).ceil() as u32);
        assert_eq!(raster.rgba.len(), (raster.width * raster.height * 4) as usize);
        // The header band is painted in the accent colour, not left white.
        assert!(raster.rgba.chunks(4).any(|p| p != [255, 255, 255, 255]));
    }
}
