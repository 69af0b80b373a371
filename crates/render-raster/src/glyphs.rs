use crate::fonts::{FontSet, glyph_advance};
use dossier_layout::TextStyle;
use dossier_types::Rect;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};
use ttf_parser::OutlineBuilder;

/// Converts font-unit outlines into a tiny-skia path in layout space.
///
/// Font outlines grow upwards, layout space grows downwards, so y is
/// flipped around the baseline.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    baseline_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, baseline_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            baseline_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.origin_x + x * self.scale,
            self.baseline_y - y * self.scale,
        )
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Draws one laid-out line of text inside its line box.
pub(crate) fn draw_text_line(
    pixmap: &mut Pixmap,
    fonts: &FontSet,
    text: &str,
    style: &TextStyle,
    line: &Rect,
    transform: Transform,
) {
    let mut paint = Paint::default();
    let c = style.color;
    paint.set_color_rgba8(c.r, c.g, c.b, c.alpha_u8());
    paint.anti_alias = true;

    let half_leading = (line.height - style.size) / 2.0;
    let Some(face) = fonts.select(style.is_bold()).and_then(|f| f.face()) else {
        draw_block_glyphs(pixmap, fonts, text, style, line, half_leading, &paint, transform);
        return;
    };

    let units = face.units_per_em().max(1) as f32;
    let scale = style.size / units;
    let baseline_y = line.y + half_leading + face.ascender() as f32 * scale;

    let mut pen_x = line.x;
    for ch in text.chars() {
        let Some(gid) = face.glyph_index(ch) else {
            pen_x += style.size * 0.5;
            continue;
        };
        let mut builder = GlyphPathBuilder::new(pen_x, baseline_y, scale);
        if face.outline_glyph(gid, &mut builder).is_some()
            && let Some(path) = builder.finish()
        {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        pen_x += glyph_advance(&face, gid, style.size);
    }
}

/// Without any font, each visible character becomes a solid box so the
/// text still occupies its measured space.
#[allow(clippy::too_many_arguments)]
fn draw_block_glyphs(
    pixmap: &mut Pixmap,
    fonts: &FontSet,
    text: &str,
    style: &TextStyle,
    line: &Rect,
    half_leading: f32,
    paint: &Paint<'_>,
    transform: Transform,
) {
    use dossier_layout::TextMeasure;

    let mut pen_x = line.x;
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let advance = fonts.advance(ch.encode_utf8(&mut buf), style.size, style.is_bold());
        if !ch.is_whitespace()
            && let Some(rect) = tiny_skia::Rect::from_xywh(
                pen_x + advance * 0.1,
                line.y + half_leading + style.size * 0.25,
                advance * 0.8,
                style.size * 0.65,
            )
        {
            pixmap.fill_rect(rect, paint, transform, None);
        }
        pen_x += advance;
    }
}
