#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Scales `self` down to fit inside `bounds`, keeping the aspect ratio.
    ///
    /// Never scales up: a size that already fits is returned unchanged.
    pub fn fit_within(self, bounds: Size) -> Size {
        if self.width <= 0.0 || self.height <= 0.0 {
            return bounds;
        }
        let factor = (bounds.width / self.width)
            .min(bounds.height / self.height)
            .min(1.0);
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Physical page dimensions and margins, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl PageGeometry {
    pub const A4_WIDTH: f32 = 595.28;
    pub const A4_HEIGHT: f32 = 841.89;
    pub const DEFAULT_MARGIN: f32 = 20.0;

    pub fn new(page_width: f32, page_height: f32, margin_x: f32, margin_y: f32) -> Self {
        Self {
            page_width,
            page_height,
            margin_x,
            margin_y,
        }
    }

    pub fn a4_portrait() -> Self {
        Self::new(
            Self::A4_WIDTH,
            Self::A4_HEIGHT,
            Self::DEFAULT_MARGIN,
            Self::DEFAULT_MARGIN,
        )
    }

    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_x
    }

    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin_y
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_portrait()
    }
}
