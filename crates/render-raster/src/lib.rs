//! Paints [`dossier_layout::LayoutTree`]s into RGBA surfaces with tiny-skia.

mod fonts;
mod glyphs;
mod images;
mod renderer;

pub use fonts::{FontFace, FontSet};
pub use renderer::SkiaRenderer;
