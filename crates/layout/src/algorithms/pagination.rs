//! Splits a tall raster into page-sized horizontal slices.
//!
//! The raster is scaled uniformly so its width fills the usable page width.
//! Each slice is the largest whole number of source rows whose scaled height
//! fits the usable page height; the last slice takes whatever is left.
//! Breaks land on pixel rows, never on content boundaries.

use dossier_types::{PageGeometry, Slice};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginationError {
    #[error("Cannot paginate an empty raster ({width}x{height} px).")]
    EmptyRaster { width: u32, height: u32 },
    #[error("Usable page area {width:.2}x{height:.2} pt is empty.")]
    NoUsableArea { width: f32, height: f32 },
    #[error("Usable page height holds less than one source row (scale ratio {0}).")]
    RowTooTall(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// Points per source pixel.
    pub scale_ratio: f64,
    pub usable_width: f32,
    pub usable_height: f32,
    /// Full-page slice height in source pixels.
    pub page_step_px: u32,
    pub slices: Vec<Slice>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }

    /// Drawn height of `slice` on the page, in points.
    pub fn slice_height_pt(&self, slice: &Slice) -> f32 {
        (slice.source_height_px as f64 * self.scale_ratio) as f32
    }
}

pub fn paginate(
    width_px: u32,
    height_px: u32,
    geometry: &PageGeometry,
) -> Result<Pagination, PaginationError> {
    if width_px == 0 || height_px == 0 {
        return Err(PaginationError::EmptyRaster {
            width: width_px,
            height: height_px,
        });
    }
    let usable_width = geometry.usable_width();
    let usable_height = geometry.usable_height();
    if usable_width <= 0.0 || usable_height <= 0.0 {
        return Err(PaginationError::NoUsableArea {
            width: usable_width,
            height: usable_height,
        });
    }

    let ratio = usable_width as f64 / width_px as f64;
    let page_step_px = (usable_height as f64 / ratio).floor() as u32;
    if page_step_px == 0 {
        return Err(PaginationError::RowTooTall(ratio));
    }

    let mut slices = Vec::with_capacity((height_px / page_step_px + 1) as usize);
    let mut offset = 0u32;
    while offset < height_px {
        let source_height_px = page_step_px.min(height_px - offset);
        slices.push(Slice {
            source_offset_px: offset,
            source_height_px,
            page_index: slices.len(),
        });
        offset += source_height_px;
    }

    log::debug!(
        "paginated {}x{} px into {} page(s), ratio {:.5} pt/px, step {} px",
        width_px,
        height_px,
        slices.len(),
        ratio,
        page_step_px
    );
    Ok(Pagination {
        scale_ratio: ratio,
        usable_width,
        usable_height,
        page_step_px,
        slices,
    })
}
