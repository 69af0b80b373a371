//! Record → raster surface, with a text-only fallback.
//!
//! The full render embeds every inlined image. If it fails (typically
//! because an attachment could only be referenced, not embedded, and so
//! would taint the surface) the record is rebuilt without images and
//! rendered again at a lower scale.

use crate::context::ExportContext;
use crate::error::ExportError;
use crate::render_tree::RenderTree;
use async_trait::async_trait;
use dossier_layout::{LayoutBuilder, LayoutRenderer, LayoutTree, RasterError};
use dossier_traits::{Strategy, StrategyChain};
use dossier_types::{AssetRef, RasterSurface, Record};
use std::fmt;
use std::sync::Arc;

/// The input of one rasterization: the record and its per-entry assets.
#[derive(Debug, Clone)]
pub struct RasterRequest {
    pub record: Record,
    pub assets: Vec<Vec<AssetRef>>,
    /// Timestamp for the `Generated:` footer; no footer when `None`.
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMode {
    Full,
    TextOnly,
}

impl fmt::Display for RasterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterMode::Full => write!(f, "full"),
            RasterMode::TextOnly => write!(f, "text-only"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rasterized {
    pub surface: RasterSurface,
    pub mode: RasterMode,
    pub scale: f32,
}

struct RenderPass {
    builder: LayoutBuilder,
    renderer: Arc<dyn LayoutRenderer>,
    render_tree: RenderTree,
    scale: f32,
}

impl RenderPass {
    fn builder_for(&self, request: &RasterRequest) -> LayoutBuilder {
        match &request.generated_at {
            Some(ts) => self.builder.clone().with_generated_at(ts.as_str()),
            None => self.builder.clone(),
        }
    }

    fn render(&self, tree: LayoutTree, mode: RasterMode) -> Result<Rasterized, RasterError> {
        let node = self.render_tree.mount(tree);
        let surface = self.renderer.render(node.tree(), self.scale)?;
        log::debug!(
            "{} render via {} produced {}x{} px",
            mode,
            self.renderer.name(),
            surface.width_px,
            surface.height_px
        );
        Ok(Rasterized {
            surface,
            mode,
            scale: self.scale,
        })
    }
}

/// Renders the record with its inlined images.
struct FullRender(RenderPass);

#[async_trait]
impl Strategy<RasterRequest, Rasterized, RasterError> for FullRender {
    fn name(&self) -> &'static str {
        "full"
    }

    async fn attempt(&self, request: &RasterRequest) -> Result<Rasterized, RasterError> {
        let tree = self.0.builder_for(request).build(&request.record, &request.assets);
        self.0.render(tree, RasterMode::Full)
    }
}

/// Renders the record with attachments as text references only.
struct TextOnlyRender(RenderPass);

#[async_trait]
impl Strategy<RasterRequest, Rasterized, RasterError> for TextOnlyRender {
    fn name(&self) -> &'static str {
        "text-only"
    }

    async fn attempt(&self, request: &RasterRequest) -> Result<Rasterized, RasterError> {
        let tree = self.0.builder_for(request).build_text_only(&request.record);
        self.0.render(tree, RasterMode::TextOnly)
    }
}

pub struct Rasterizer {
    chain: StrategyChain<RasterRequest, Rasterized, RasterError>,
}

impl Rasterizer {
    pub fn new(
        context: &ExportContext,
        builder: LayoutBuilder,
        renderer: Arc<dyn LayoutRenderer>,
        render_tree: RenderTree,
    ) -> Self {
        let builder = builder.with_viewport_width(context.viewport_width);
        let pass = |scale| RenderPass {
            builder: builder.clone(),
            renderer: renderer.clone(),
            render_tree: render_tree.clone(),
            scale,
        };
        let chain = StrategyChain::new("raster")
            .with(FullRender(pass(context.primary_scale)))
            .with(TextOnlyRender(pass(context.fallback_scale)));
        Self { chain }
    }

    pub async fn rasterize(&self, request: &RasterRequest) -> Result<Rasterized, ExportError> {
        let resolved = self.chain.run(request).await.map_err(ExportError::Raster)?;
        if let Some(failure) = resolved.failures.first() {
            log::warn!(
                "full render failed ({}); exported with the {} fallback",
                failure.error,
                resolved.strategy
            );
        }
        Ok(resolved.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_layout::ImageSource;
    use dossier_types::asset::encode_data_uri;
    use dossier_types::{Attachment, InlinedAsset, SubRecord};
    use std::sync::Mutex;

    /// Refuses trees with remote images, otherwise returns a blank surface
    /// while recording the render tree size it observed.
    struct RecordingRenderer {
        render_tree: RenderTree,
        mounted_during_render: Mutex<Vec<usize>>,
        fail_always: bool,
    }

    impl LayoutRenderer for RecordingRenderer {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn render(&self, tree: &LayoutTree, scale: f32) -> Result<RasterSurface, RasterError> {
            self.mounted_during_render
                .lock()
                .unwrap()
                .push(self.render_tree.len());
            if self.fail_always {
                return Err(RasterError::Other("broken".into()));
            }
            if let Some(url) = tree.walk().find_map(|n| match n {
                dossier_layout::LayoutNode::Image {
                    source: ImageSource::Remote(url),
                    ..
                } => Some(url.clone()),
                _ => None,
            }) {
                return Err(RasterError::Tainted(url));
            }
            Ok(RasterSurface::blank(
                (tree.width * scale) as u32,
                (100.0 * scale) as u32,
            ))
        }
    }

    fn request() -> RasterRequest {
        let mut record = Record::new("training", "1");
        let mut entry = SubRecord::new("TRAINING DETAILS");
        entry.attachments = vec![Attachment::new(Some(1), "https://cdn.test/a.png")];
        record.entries = vec![entry];
        RasterRequest {
            record,
            assets: vec![vec![AssetRef::Raw("https://cdn.test/a.png".into())]],
            generated_at: Some("01/01/2025, 09:00:00".into()),
        }
    }

    fn setup(fail_always: bool) -> (Rasterizer, Arc<RecordingRenderer>, RenderTree) {
        let render_tree = RenderTree::new();
        let renderer = Arc::new(RecordingRenderer {
            render_tree: render_tree.clone(),
            mounted_during_render: Mutex::new(Vec::new()),
            fail_always,
        });
        let rasterizer = Rasterizer::new(
            &ExportContext::default(),
            LayoutBuilder::new(),
            renderer.clone(),
            render_tree.clone(),
        );
        (rasterizer, renderer, render_tree)
    }

    #[tokio::test]
    async fn tainted_full_render_falls_back_to_text_only() {
        let (rasterizer, renderer, render_tree) = setup(false);
        let result = rasterizer.rasterize(&request()).await.unwrap();

        assert_eq!(result.mode, RasterMode::TextOnly);
        assert_eq!(result.scale, 2.0);
        assert_eq!(result.surface.width_px, 2000);
        assert_eq!(*renderer.mounted_during_render.lock().unwrap(), vec![1, 1]);
        assert!(render_tree.is_empty());
    }

    #[tokio::test]
    async fn embedded_assets_render_in_full() {
        let (rasterizer, _, _) = setup(false);
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let mut req = request();
        req.assets = vec![vec![AssetRef::Embedded(InlinedAsset::from_data_uri(
            encode_data_uri(&png, "image/png"),
        ))]];
        let result = rasterizer.rasterize(&req).await.unwrap();
        assert_eq!(result.mode, RasterMode::Full);
        assert_eq!(result.surface.width_px, 3000);
    }

    #[tokio::test]
    async fn text_references_render_in_full() {
        let (rasterizer, _, _) = setup(false);
        let mut req = request();
        req.assets = vec![vec![AssetRef::TextReference("https://cdn.test/a.pdf".into())]];
        let result = rasterizer.rasterize(&req).await.unwrap();
        assert_eq!(result.mode, RasterMode::Full);
    }

    #[tokio::test]
    async fn both_failures_are_reported() {
        let (rasterizer, _, render_tree) = setup(true);
        let err = rasterizer.rasterize(&request()).await.unwrap_err();
        let ExportError::Raster(exhausted) = err else {
            panic!("expected a raster error");
        };
        assert_eq!(exhausted.failures.len(), 2);
        assert!(render_tree.is_empty());
    }
}
