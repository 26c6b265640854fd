//! Strategy B: rasterize the frame and assemble the raster into a PDF.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use printpdf::image::RawImage;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, XObjectId};
use resvg::tiny_skia;
use tracing::{debug, info, warn};

use crate::export::config::ExportConfig;
use crate::export::error::{ExportError, ExportStage};
use crate::export::host::ExportHost;
use crate::export::paginate::{paginate, PageSlice};
use crate::export::raster::{section_spans, CaptureScope, Raster, RasterRequest, Rasterizer};
use crate::export::sink::{FileSink, SavedFile};
use crate::export::PipelineSettings;
use crate::frame::Frame;

const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone)]
pub struct PdfExport {
    pub filename: String,
    pub pages: usize,
    pub bytes: Vec<u8>,
    pub saved: SavedFile,
}

/// Runs Strategy B end to end. Every declaration changed on the live frame
/// for the capture is restored before this returns, on every path.
pub async fn export_pdf(
    frame: &Frame,
    config: &ExportConfig,
    host: &dyn ExportHost,
    rasterizer: Arc<dyn Rasterizer>,
    sink: &dyn FileSink,
    settings: &PipelineSettings,
) -> Result<PdfExport, ExportError> {
    host.fonts_ready()
        .await
        .map_err(|e| ExportError::failed(ExportStage::Fonts, e))?;
    host.next_frame().await;

    let (captured, root) = {
        let mut lease = frame.await_root(settings.retry).await?;
        let root = lease.root();
        let size = lease.surface().measure(root);
        if size.is_empty() {
            warn!(width = size.width, height = size.height, "printable root has no size");
            return Err(ExportError::EmptyContent {
                width: size.width,
                height: size.height,
            });
        }
        debug!(width = size.width, height = size.height, "printable root measured");

        let scope = CaptureScope::acquire(lease.surface_mut(), root, config.include_links());
        debug!(overrides = scope.touched(), "capture styles applied");
        (scope.surface().clone(), root)
    };

    let request = RasterRequest {
        scale: settings.raster_scale,
    };
    let (raster, spans) = tokio::task::spawn_blocking(move || {
        let raster = rasterizer.rasterize(&captured, root, &request)?;
        let spans = section_spans(&captured, root, raster.scale);
        anyhow::Ok((raster, spans))
    })
    .await
    .map_err(|e| ExportError::failed(ExportStage::Capture, e))?
    .map_err(|e| ExportError::failed(ExportStage::Rasterize, e))?;
    debug!(width = raster.width, height = raster.height, sections = spans.len(), "raster ready");

    let slices = paginate(raster.height, page_rows(&raster, config), &spans);
    let pages = slices.len();
    let layout = config.clone();
    let bytes = tokio::task::spawn_blocking(move || assemble(&raster, &slices, &layout))
        .await
        .map_err(|e| ExportError::failed(ExportStage::Assemble, e))?
        .map_err(|e| ExportError::failed(ExportStage::Assemble, e))?;

    let saved = sink
        .save(config.filename(), &bytes)
        .await
        .map_err(|e| ExportError::failed(ExportStage::Save, e))?;
    info!(filename = %config.filename(), pages, bytes = bytes.len(), "PDF exported");

    Ok(PdfExport {
        filename: config.filename().to_string(),
        pages,
        bytes,
        saved,
    })
}

/// Raster rows that fill one page when the raster is scaled to the
/// printable width.
fn page_rows(raster: &Raster, config: &ExportConfig) -> u32 {
    let (area_width, area_height) = config.printable_area_mm();
    ((area_height / area_width) * raster.width as f32)
        .floor()
        .max(1.0) as u32
}

/// One page per slice, each image scaled to fit the printable area,
/// centred horizontally and aligned to the top margin.
pub fn assemble(raster: &Raster, slices: &[PageSlice], config: &ExportConfig) -> anyhow::Result<Vec<u8>> {
    let (page_width, page_height) = config.paper().dimensions_mm();
    let (area_width, area_height) = config.printable_area_mm();
    let margins = config.margins();

    let mut doc = PdfDocument::new(config.filename().trim_end_matches(".pdf"));
    let mut warnings = Vec::new();

    for (index, slice) in slices.iter().enumerate() {
        let png = encode_slice(raster, slice)?;
        let image = RawImage::decode_from_bytes(&png, &mut warnings)
            .map_err(|e| anyhow!("page {} image: {e}", index + 1))?;

        let (px_width, px_height) = (raster.width as f32, slice.height() as f32);
        let mm_per_px = (area_width / px_width).min(area_height / px_height);
        let (draw_width, draw_height) = (px_width * mm_per_px, px_height * mm_per_px);
        let x = margins.left + (area_width - draw_width) / 2.0;
        let y = page_height - margins.top - draw_height;

        let id = XObjectId::new();
        doc.resources
            .xobjects
            .map
            .insert(id.clone(), XObject::Image(image));

        // At 72 dpi one image pixel is one point before scaling.
        let scale = mm_per_px * PT_PER_MM;
        let transform = XObjectTransform {
            translate_x: Some(Pt(x * PT_PER_MM)),
            translate_y: Some(Pt(y * PT_PER_MM)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            rotate: None,
            dpi: Some(72.0),
        };
        doc.pages.push(PdfPage::new(
            Mm(page_width),
            Mm(page_height),
            vec![Op::UseXobject { id, transform }],
        ));
    }

    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "PDF assembled with warnings");
    }
    Ok(bytes)
}

fn encode_slice(raster: &Raster, slice: &PageSlice) -> anyhow::Result<Vec<u8>> {
    let stride = raster.width as usize * 4;
    let start = slice.top as usize * stride;
    let end = slice.bottom as usize * stride;
    let rows = raster
        .rgba
        .get(start..end)
        .with_context(|| format!("slice {}..{} outside raster", slice.top, slice.bottom))?;
    let size = tiny_skia::IntSize::from_wh(raster.width, slice.height())
        .context("empty page slice")?;
    let pixmap = tiny_skia::Pixmap::from_vec(rows.to_vec(), size).context("malformed raster")?;
    Ok(pixmap.encode_png()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::document::demo::demo_document;
    use crate::export::config::{ExportDefaults, ExportRequest, PaperSize};
    use crate::export::sink::MemorySink;
    use crate::frame::surface::{LiveNode, NodeId, Surface};
    use crate::frame::{FrameMode, RetryPolicy};
    use crate::render::node::el;
    use crate::render::{render, TemplateId};

    struct ReadyHost;

    #[async_trait]
    impl ExportHost for ReadyHost {
        async fn fonts_ready(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn next_frame(&self) {}
    }

    struct BrokenFonts;

    #[async_trait]
    impl ExportHost for BrokenFonts {
        async fn fonts_ready(&self) -> anyhow::Result<()> {
            Err(anyhow!("font server unreachable"))
        }

        async fn next_frame(&self) {}
    }

    /// Paints everything white at the measured size and records what it saw.
    #[derive(Default)]
    struct WhiteRasterizer {
        calls: AtomicUsize,
        saw_chrome: AtomicBool,
    }

    impl Rasterizer for WhiteRasterizer {
        fn rasterize(
            &self,
            surface: &Surface,
            root: NodeId,
            request: &RasterRequest,
        ) -> anyhow::Result<Raster> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let visible_chrome = surface
                .query(root, LiveNode::is_non_printable)
                .into_iter()
                .any(|id| surface.style_value(id, "display") != Some("none"));
            self.saw_chrome.store(visible_chrome, Ordering::SeqCst);

            let size = surface.measure(root);
            let width = (size.width * request.scale).ceil() as u32;
            let height = (size.height * request.scale).ceil() as u32;
            Ok(Raster {
                width,
                height,
                scale: request.scale,
                rgba: vec![255; (width * height * 4) as usize],
            })
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _: &Surface, _: NodeId, _: &RasterRequest) -> anyhow::Result<Raster> {
            Err(anyhow!("canvas exploded"))
        }
    }

    fn config() -> ExportConfig {
        ExportConfig::new(
            ExportRequest::default(),
            &demo_document().personal,
            &ExportDefaults::default(),
        )
        .unwrap()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy {
                interval: Duration::from_millis(10),
                max_attempts: 5,
            },
            ..Default::default()
        }
    }

    async fn mounted(content: crate::render::node::Node, mode: FrameMode) -> Frame {
        let frame = Frame::default();
        assert!(frame
            .mount(content, TemplateId::Classic, mode)
            .await
            .await
            .unwrap());
        frame
    }

    async fn live_subtree(frame: &Frame) -> crate::render::node::Node {
        let lease = frame.await_root(RetryPolicy::default()).await.unwrap();
        lease.surface().clone_subtree(lease.root())
    }

    #[tokio::test]
    async fn test_export_writes_named_pdf() {
        let frame = mounted(render(&demo_document(), TemplateId::Classic), FrameMode::Preview).await;
        let before = live_subtree(&frame).await;
        let rasterizer = Arc::new(WhiteRasterizer::default());
        let sink = MemorySink::new();

        let export = export_pdf(&frame, &config(), &ReadyHost, rasterizer.clone(), &sink, &settings())
            .await
            .unwrap();

        assert_eq!(export.filename, "jordan-rivera-resume.pdf");
        assert!(export.pages >= 1);
        assert!(export.bytes.starts_with(b"%PDF"));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
        assert!(!rasterizer.saw_chrome.load(Ordering::SeqCst));
        let files = sink.take().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "jordan-rivera-resume.pdf");
        assert_eq!(live_subtree(&frame).await, before);
    }

    #[tokio::test]
    async fn test_zero_size_content_is_rejected_without_writing() {
        let frame = mounted(el("div").into(), FrameMode::Export).await;
        let rasterizer = Arc::new(WhiteRasterizer::default());
        let sink = MemorySink::new();

        let err = export_pdf(&frame, &config(), &ReadyHost, rasterizer.clone(), &sink, &settings())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::EmptyContent { .. }));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sink.count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_rasterization_restores_live_frame() {
        let frame = mounted(render(&demo_document(), TemplateId::Classic), FrameMode::Preview).await;
        let before = live_subtree(&frame).await;
        let sink = MemorySink::new();

        let err = export_pdf(&frame, &config(), &ReadyHost, Arc::new(FailingRasterizer), &sink, &settings())
            .await
            .unwrap_err();

        match err {
            ExportError::Failed { stage, source } => {
                assert_eq!(stage, ExportStage::Rasterize);
                assert!(source.to_string().contains("canvas exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(live_subtree(&frame).await, before);
        assert_eq!(sink.count().await, 0);
    }

    #[tokio::test]
    async fn test_font_failure_is_wrapped() {
        let frame = mounted(render(&demo_document(), TemplateId::Classic), FrameMode::Export).await;
        let err = export_pdf(
            &frame,
            &config(),
            &BrokenFonts,
            Arc::new(WhiteRasterizer::default()),
            &MemorySink::new(),
            &settings(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Failed {
                stage: ExportStage::Fonts,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unmounted_frame_is_unavailable() {
        let err = export_pdf(
            &Frame::default(),
            &config(),
            &ReadyHost,
            Arc::new(WhiteRasterizer::default()),
            &MemorySink::new(),
            &settings(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::FrameUnavailable { attempts: 5 }));
    }

    #[test]
    fn test_assemble_one_page_per_slice() {
        let raster = Raster {
            width: 40,
            height: 120,
            scale: 1.0,
            rgba: vec![255; 40 * 120 * 4],
        };
        let rows = page_rows(&raster, &config());
        let slices = paginate(120, rows, &[]);
        assert_eq!(slices.len(), 120usize.div_ceil(rows as usize));
        assert!(slices.len() > 1);
        let bytes = assemble(&raster, &slices, &config()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_page_rows_follow_printable_aspect() {
        let raster = Raster {
            width: 1000,
            height: 10,
            scale: 2.0,
            rgba: vec![255; 1000 * 10 * 4],
        };
        let a4 = config();
        let (w, h) = a4.printable_area_mm();
        assert_eq!(page_rows(&raster, &a4), ((h / w) * 1000.0).floor() as u32);

        let letter = ExportConfig::new(
            ExportRequest {
                paper_size: Some(PaperSize::Letter),
                ..Default::default()
            },
            &demo_document().personal,
            &ExportDefaults::default(),
        )
        .unwrap();
        assert!(page_rows(&raster, &letter) < page_rows(&raster, &a4));
    }
}
