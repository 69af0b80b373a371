use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Viewport width {0:.2} leaves no room for content.")]
    InvalidWidth(f32),
    #[error("Grid must have at least one column.")]
    EmptyGrid,
}

pub mod algorithms;
pub mod builder;
pub mod engine;
pub mod interface;
pub mod text;
pub mod theme;
pub mod tree;

pub use self::algorithms::pagination::{Pagination, PaginationError, paginate};
pub use self::builder::LayoutBuilder;
pub use self::engine::{ElementKind, LayoutFrame, PositionedElement, layout_tree};
pub use self::interface::{LayoutRenderer, RasterError};
pub use self::text::{ApproxMetrics, TextMeasure, WrapMode};
pub use self::tree::{Align, ImageSource, LayoutNode, LayoutTree, TextBlock, TextStyle, Weight};

// Re-export geometry types from the foundation crate to prevent type mismatches
pub use dossier_types::{Rect, Size};
