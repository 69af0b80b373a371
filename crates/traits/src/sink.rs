use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination '{0}' is not a writable directory.")]
    DirectoryUnavailable(PathBuf),

    #[error("Invalid file name '{0}'.")]
    InvalidName(String),
}

/// Where a finished document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub path: PathBuf,
    pub bytes: usize,
}

/// A final destination for generated document bytes.
pub trait DocumentSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Persists `bytes` under `filename` and reports where they went.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<Delivered, DeliveryError>;
}
