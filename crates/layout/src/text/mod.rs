//! Text measurement and line breaking.

mod wrapper;

pub use wrapper::{Line, WrapMode, wrap_text};

/// Horizontal metrics for a run of text.
///
/// The layout engine only needs advances; glyph outlines are the
/// renderer's concern.
pub trait TextMeasure: Send + Sync {
    fn advance(&self, text: &str, size: f32, bold: bool) -> f32;
}

/// Fixed per-character metrics roughly matching a proportional sans-serif.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMetrics {
    pub regular_em: f32,
    pub bold_em: f32,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            regular_em: 0.52,
            bold_em: 0.56,
        }
    }
}

impl TextMeasure for ApproxMetrics {
    fn advance(&self, text: &str, size: f32, bold: bool) -> f32 {
        let em = if bold { self.bold_em } else { self.regular_em };
        text.chars()
            .map(|c| match c {
                ' ' => size * 0.28,
                'i' | 'l' | 'j' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => size * 0.26,
                'm' | 'w' | 'M' | 'W' | '@' => size * em * 1.5,
                _ => size * em,
            })
            .sum()
    }
}
