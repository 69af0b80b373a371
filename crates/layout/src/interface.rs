use crate::LayoutError;
use crate::tree::LayoutTree;
use dossier_types::RasterSurface;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    /// An image was never proven safe to read back; drawing it would taint
    /// the surface.
    #[error("Image '{0}' is not embedded; refusing to rasterize a tainted surface.")]
    Tainted(String),
    #[error("Scale factor {0} is not a positive finite number.")]
    InvalidScale(f32),
    #[error("Cannot allocate a {width}x{height} px surface.")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("Rendering failed: {0}")]
    Other(String),
}

/// Paints a layout tree into a pixel surface.
///
/// `scale` multiplies the tree's nominal CSS-pixel size; the surface is
/// `ceil(width * scale) x ceil(height * scale)` pixels.
pub trait LayoutRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, tree: &LayoutTree, scale: f32) -> Result<RasterSurface, RasterError>;
}
