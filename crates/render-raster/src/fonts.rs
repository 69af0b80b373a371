use dossier_layout::{ApproxMetrics, TextMeasure};
use std::path::Path;
use std::sync::Arc;
use ttf_parser::{Face, GlyphId};

/// Raw bytes of one parsed face inside a font file or collection.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    /// Returns `None` unless the bytes parse as a font.
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Option<Self> {
        Face::parse(&data, index).ok()?;
        Some(Self {
            data: Arc::new(data),
            index,
        })
    }

    pub(crate) fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }
}

/// The regular and bold faces used for every text run.
///
/// Either face may be missing; bold falls back to regular, and with no face
/// at all text is drawn as solid glyph boxes.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    regular: Option<FontFace>,
    bold: Option<FontFace>,
    fallback_metrics: ApproxMetrics,
}

impl FontSet {
    /// No fonts. Rendering is deterministic, which suits tests.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_faces(regular: Option<FontFace>, bold: Option<FontFace>) -> Self {
        Self {
            regular,
            bold,
            fallback_metrics: ApproxMetrics::default(),
        }
    }

    /// Discovers a sans-serif family among system fonts and, if given, the
    /// fonts in `extra_dir`.
    #[cfg(feature = "system-fonts")]
    pub fn discover(extra_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            db.load_fonts_dir(dir);
        }
        log::debug!("font database holds {} faces", db.len());

        let regular = query_face(&db, fontdb::Weight::NORMAL);
        let bold = query_face(&db, fontdb::Weight::BOLD);
        if regular.is_none() {
            log::warn!("no usable sans-serif font found; text will render as boxes");
        }
        Self::from_faces(regular, bold)
    }

    #[cfg(not(feature = "system-fonts"))]
    pub fn discover(_extra_dir: Option<&Path>) -> Self {
        Self::empty()
    }

    pub fn has_fonts(&self) -> bool {
        self.regular.is_some()
    }

    pub(crate) fn select(&self, bold: bool) -> Option<&FontFace> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref()
        }
    }
}

#[cfg(feature = "system-fonts")]
fn query_face(db: &fontdb::Database, weight: fontdb::Weight) -> Option<FontFace> {
    let families = [
        fontdb::Family::SansSerif,
        fontdb::Family::Name("DejaVu Sans"),
        fontdb::Family::Name("Liberation Sans"),
        fontdb::Family::Name("Noto Sans"),
        fontdb::Family::Name("Helvetica"),
    ];
    let id = db
        .query(&fontdb::Query {
            families: &families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
        .or_else(|| db.faces().next().map(|info| info.id))?;

    db.with_face_data(id, |data, index| FontFace::from_bytes(data.to_vec(), index))
        .flatten()
}

impl TextMeasure for FontSet {
    fn advance(&self, text: &str, size: f32, bold: bool) -> f32 {
        let Some(face) = self.select(bold).and_then(FontFace::face) else {
            return self.fallback_metrics.advance(text, size, bold);
        };
        let scale = size / face.units_per_em().max(1) as f32;
        text.chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .filter(|adv| *adv > 0)
                    .map(|adv| adv as f32 * scale)
                    .unwrap_or(size * 0.5)
            })
            .sum()
    }
}

pub(crate) fn glyph_advance(face: &Face<'_>, gid: GlyphId, size: f32) -> f32 {
    let scale = size / face.units_per_em().max(1) as f32;
    match face.glyph_hor_advance(gid) {
        Some(adv) if adv > 0 => adv as f32 * scale,
        _ => size * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_measures_with_fallback_metrics() {
        let fonts = FontSet::empty();
        assert!(!fonts.has_fonts());
        let expected = ApproxMetrics::default().advance("Hello", 12.0, true);
        assert_eq!(fonts.advance("Hello", 12.0, true), expected);
    }

    #[test]
    fn garbage_bytes_are_not_a_face() {
        assert!(FontFace::from_bytes(vec![0, 1, 2, 3], 0).is_none());
    }
}
