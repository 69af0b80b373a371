/// A single rendered image of the whole document, arbitrary height.
///
/// Pixels are RGBA8 with straight (non-premultiplied) alpha, row-major,
/// top row first.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSurface {
    pub width_px: u32,
    pub height_px: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl RasterSurface {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wraps a pixel buffer. Returns `None` if the length does not match the dimensions.
    pub fn new(width_px: u32, height_px: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width_px as usize)
            .checked_mul(height_px as usize)?
            .checked_mul(Self::BYTES_PER_PIXEL)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width_px,
            height_px,
            pixels,
        })
    }

    /// An opaque white surface.
    pub fn blank(width_px: u32, height_px: u32) -> Self {
        let len = width_px as usize * height_px as usize * Self::BYTES_PER_PIXEL;
        Self {
            width_px,
            height_px,
            pixels: vec![255; len],
        }
    }

    pub fn row_stride(&self) -> usize {
        self.width_px as usize * Self::BYTES_PER_PIXEL
    }

    /// The bytes of rows `[offset, offset + height)`, clamped to the surface.
    pub fn rows(&self, offset_px: u32, height_px: u32) -> &[u8] {
        let start = (offset_px.min(self.height_px) as usize) * self.row_stride();
        let end_row = offset_px.saturating_add(height_px).min(self.height_px);
        let end = end_row as usize * self.row_stride();
        &self.pixels[start..end.max(start)]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let i = y as usize * self.row_stride() + x as usize * Self::BYTES_PER_PIXEL;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// A horizontal band of a [`RasterSurface`] destined for one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub source_offset_px: u32,
    pub source_height_px: u32,
    pub page_index: usize,
}

impl Slice {
    pub fn end_px(&self) -> u32 {
        self.source_offset_px + self.source_height_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_buffers() {
        assert!(RasterSurface::new(2, 2, vec![0; 16]).is_some());
        assert!(RasterSurface::new(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn rows_are_clamped_to_surface() {
        let surface = RasterSurface::blank(3, 10);
        assert_eq!(surface.rows(0, 4).len(), 4 * 12);
        assert_eq!(surface.rows(8, 4).len(), 2 * 12);
        assert!(surface.rows(12, 4).is_empty());
    }

    #[test]
    fn pixel_lookup() {
        let mut surface = RasterSurface::blank(2, 2);
        surface.pixels[12..16].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(surface.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(surface.pixel(2, 0), None);
    }
}
