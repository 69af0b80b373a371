//! Foundation types for the dossier export pipeline.
//!
//! Everything here is plain data: records as fetched from the backend,
//! attachments and their inlined forms, page geometry, and the raster
//! surface produced by rendering. No I/O happens in this crate.

pub mod asset;
pub mod color;
pub mod geometry;
pub mod mime;
pub mod raster;
pub mod record;

pub use asset::{AssetRef, InlineOutcome, InlineVia, InlinedAsset};
pub use color::Color;
pub use geometry::{PageGeometry, Rect, Size};
pub use mime::AttachmentKind;
pub use raster::{RasterSurface, Slice};
pub use record::{Attachment, Field, Record, SubRecord};
