//! Record export pipeline.
//!
//! A record and its attachments flow through
//! inlining → layout → rasterization → pagination → PDF assembly → delivery,
//! with an ordered fallback chain at each recoverable step. See
//! [`RecordExporter`] for the entry point.

pub mod config;
pub mod context;
pub mod delivery;
pub mod error;
pub mod exporter;
pub mod notify;
pub mod raster;
pub mod render_tree;
pub mod source;
pub mod training;

pub use config::ExportConfig;
pub use context::ExportContext;
pub use delivery::{BlobDownload, Deliverer, DeliveryReceipt, SaveToDirectory};
pub use error::ExportError;
pub use exporter::{CancelToken, ExportReport, RecordExporter};
pub use notify::{LogNotifier, Notifier};
pub use raster::{RasterMode, RasterRequest, Rasterized, Rasterizer};
pub use render_tree::{GeneratingGuard, GeneratingState, MountedNode, RenderTree};
pub use source::{FileRecordSource, HttpTrainingSource, RecordSource};

// Re-export the data model so callers need only this crate.
pub use dossier_types::{Attachment, Field, PageGeometry, Record, SubRecord};
