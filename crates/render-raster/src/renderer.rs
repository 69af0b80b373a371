use crate::fonts::FontSet;
use crate::glyphs::draw_text_line;
use crate::images::decode_to_pixmap;
use dossier_layout::{
    ElementKind, ImageSource, LayoutFrame, LayoutRenderer, LayoutTree, RasterError, layout_tree,
};
use dossier_types::{Color, RasterSurface, Rect};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

/// Upper bound on surface area; roughly a gigabyte of RGBA.
const MAX_SURFACE_PIXELS: u64 = 1 << 28;

const PLACEHOLDER_FILL: Color = Color::rgb(0xe5, 0xe7, 0xeb);

/// Software renderer for layout trees.
///
/// Embedded images are drawn from their inlined bytes. A tree that still
/// holds remote image references is refused with [`RasterError::Tainted`],
/// since its pixels could never be read back safely.
#[derive(Debug, Clone)]
pub struct SkiaRenderer {
    fonts: Arc<FontSet>,
}

impl SkiaRenderer {
    pub fn new(fonts: Arc<FontSet>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    fn paint_frame(
        &self,
        frame: &LayoutFrame,
        pixmap: &mut Pixmap,
        transform: Transform,
    ) -> Result<(), RasterError> {
        let mut decoded: HashMap<&str, Option<Pixmap>> = HashMap::new();

        for element in &frame.elements {
            match &element.kind {
                ElementKind::Fill(color) => fill_rect(pixmap, &element.rect, *color, transform),
                ElementKind::Stroke { color, width } => {
                    stroke_rect(pixmap, &element.rect, *color, *width, transform)
                }
                ElementKind::Text { text, style } => {
                    draw_text_line(pixmap, &self.fonts, text, style, &element.rect, transform)
                }
                ElementKind::Image(ImageSource::Remote(url)) => {
                    return Err(RasterError::Tainted(url.clone()));
                }
                ElementKind::Image(ImageSource::Embedded(asset)) => {
                    let image = decoded
                        .entry(asset.data_uri.as_str())
                        .or_insert_with(|| decode_to_pixmap(asset));
                    match image {
                        Some(image) => draw_image(pixmap, image, &element.rect, transform),
                        None => {
                            log::warn!("embedded {} asset could not be decoded", asset.mime);
                            fill_rect(pixmap, &element.rect, PLACEHOLDER_FILL, transform);
                            stroke_rect(pixmap, &element.rect, PLACEHOLDER_FILL, 1.0, transform);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl LayoutRenderer for SkiaRenderer {
    fn name(&self) -> &'static str {
        "tiny-skia"
    }

    fn render(&self, tree: &LayoutTree, scale: f32) -> Result<RasterSurface, RasterError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RasterError::InvalidScale(scale));
        }
        if let Some(url) = first_remote_image(tree) {
            return Err(RasterError::Tainted(url.to_string()));
        }

        let frame = layout_tree(tree, self.fonts.as_ref())?;
        let width = (frame.size.width * scale).ceil() as u32;
        let height = (frame.size.height * scale).ceil() as u32;
        if width as u64 * height as u64 > MAX_SURFACE_PIXELS {
            return Err(RasterError::SurfaceTooLarge { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RasterError::SurfaceTooLarge { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        self.paint_frame(&frame, &mut pixmap, Transform::from_scale(scale, scale))?;

        log::debug!(
            "rendered {} elements into {}x{} px at scale {}",
            frame.elements.len(),
            width,
            height,
            scale
        );
        into_surface(pixmap)
    }
}

fn first_remote_image(tree: &LayoutTree) -> Option<&str> {
    tree.walk().find_map(|node| match node {
        dossier_layout::LayoutNode::Image {
            source: ImageSource::Remote(url),
            ..
        } => Some(url.as_str()),
        _ => None,
    })
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.alpha_u8());
    paint.anti_alias = true;
    paint
}

fn sk_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn fill_rect(pixmap: &mut Pixmap, rect: &Rect, color: Color, transform: Transform) {
    if let Some(r) = sk_rect(rect) {
        pixmap.fill_rect(r, &paint_for(color), transform, None);
    }
}

fn stroke_rect(pixmap: &mut Pixmap, rect: &Rect, color: Color, width: f32, transform: Transform) {
    // Inset by half the stroke so the outline stays inside the box.
    let half = width / 2.0;
    let Some(r) = tiny_skia::Rect::from_xywh(
        rect.x + half,
        rect.y + half,
        rect.width - width,
        rect.height - width,
    ) else {
        return;
    };
    let path = PathBuilder::from_rect(r);
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint_for(color), &stroke, transform, None);
}

fn draw_image(pixmap: &mut Pixmap, image: &Pixmap, rect: &Rect, transform: Transform) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let placement = Transform::from_row(
        rect.width / image.width() as f32,
        0.0,
        0.0,
        rect.height / image.height() as f32,
        rect.x,
        rect.y,
    )
    .post_concat(transform);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, placement, None);
}

/// Demultiplies tiny-skia's premultiplied pixels into straight RGBA.
fn into_surface(pixmap: Pixmap) -> Result<RasterSurface, RasterError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut pixels = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RasterSurface::new(width, height, pixels)
        .ok_or_else(|| RasterError::Other("pixel buffer size mismatch".to_string()))
}
