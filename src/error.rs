use dossier_layout::{PaginationError, RasterError};
use dossier_pdf_composer::ComposerError;
use dossier_traits::{ChainExhausted, DeliveryError, ResourceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to fetch record: {0}")]
    RecordFetch(#[from] ResourceError),

    #[error("Record payload is malformed: {0}")]
    RecordFormat(#[from] serde_json::Error),

    #[error("No record source for kind '{0}'")]
    UnsupportedKind(String),

    #[error("Rasterization failed: {0}")]
    Raster(ChainExhausted<RasterError>),

    #[error("Pagination failed: {0}")]
    Pagination(#[from] PaginationError),

    #[error("PDF assembly failed: {0}")]
    Compose(#[from] ComposerError),

    #[error("Delivery failed: {0}")]
    Delivery(ChainExhausted<DeliveryError>),

    #[error("Export cancelled before {0}")]
    Cancelled(&'static str),

    #[error("An export is already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
