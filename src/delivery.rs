//! Getting a finished document onto disk.
//!
//! Sinks are tried in order: a named save into the output directory, then
//! a download-style copy staged through a temporary file.

use crate::error::ExportError;
use async_trait::async_trait;
use dossier_traits::{Delivered, DeliveryError, DocumentSink, Strategy, StrategyChain};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn validate_name(filename: &str) -> Result<(), DeliveryError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(DeliveryError::InvalidName(filename.to_string()));
    }
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> DeliveryError + '_ {
    move |source| DeliveryError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Saves under the given name into an existing directory.
#[derive(Debug, Clone)]
pub struct SaveToDirectory {
    dir: PathBuf,
}

impl SaveToDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSink for SaveToDirectory {
    fn name(&self) -> &'static str {
        "save"
    }

    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<Delivered, DeliveryError> {
        validate_name(filename)?;
        if !self.dir.is_dir() {
            return Err(DeliveryError::DirectoryUnavailable(self.dir.clone()));
        }
        let path = self.dir.join(filename);
        fs::write(&path, bytes).map_err(write_error(&path))?;
        Ok(Delivered {
            path,
            bytes: bytes.len(),
        })
    }
}

/// Stages the bytes in a temporary file and copies it into the download
/// directory, creating that directory if needed. The temporary file is
/// removed whether or not the copy succeeds.
#[derive(Debug, Clone)]
pub struct BlobDownload {
    download_dir: PathBuf,
}

impl BlobDownload {
    pub fn new<P: AsRef<Path>>(download_dir: P) -> Self {
        Self {
            download_dir: download_dir.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSink for BlobDownload {
    fn name(&self) -> &'static str {
        "download"
    }

    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<Delivered, DeliveryError> {
        validate_name(filename)?;
        fs::create_dir_all(&self.download_dir).map_err(write_error(&self.download_dir))?;

        let mut blob = tempfile::NamedTempFile::new().map_err(write_error(&self.download_dir))?;
        let staged = blob.path().to_path_buf();
        blob.write_all(bytes).map_err(write_error(&staged))?;
        blob.flush().map_err(write_error(&staged))?;

        let path = self.download_dir.join(filename);
        fs::copy(blob.path(), &path).map_err(write_error(&path))?;
        log::debug!("released staging file {}", blob.path().display());
        Ok(Delivered {
            path,
            bytes: bytes.len(),
        })
    }
}

struct DeliveryRequest {
    filename: String,
    bytes: Vec<u8>,
}

struct SinkStrategy(Box<dyn DocumentSink>);

#[async_trait]
impl Strategy<DeliveryRequest, Delivered, DeliveryError> for SinkStrategy {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    async fn attempt(&self, request: &DeliveryRequest) -> Result<Delivered, DeliveryError> {
        self.0.deliver(&request.filename, &request.bytes)
    }
}

/// Where a document went and which sink put it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub delivered: Delivered,
    pub sink: &'static str,
}

pub struct Deliverer {
    chain: StrategyChain<DeliveryRequest, Delivered, DeliveryError>,
}

impl Deliverer {
    pub fn new(sinks: Vec<Box<dyn DocumentSink>>) -> Self {
        let mut chain = StrategyChain::new("delivery");
        for sink in sinks {
            chain.push(Box::new(SinkStrategy(sink)));
        }
        Self { chain }
    }

    /// Named save into `output_dir`, falling back to a download copy into
    /// `download_dir`.
    pub fn standard<P: AsRef<Path>, Q: AsRef<Path>>(output_dir: P, download_dir: Q) -> Self {
        Self::new(vec![
            Box::new(SaveToDirectory::new(output_dir)),
            Box::new(BlobDownload::new(download_dir)),
        ])
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    pub async fn deliver(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<DeliveryReceipt, ExportError> {
        let request = DeliveryRequest {
            filename: filename.to_string(),
            bytes,
        };
        let resolved = self.chain.run(&request).await.map_err(ExportError::Delivery)?;
        for failure in &resolved.failures {
            log::warn!("{} sink failed: {}", failure.strategy, failure.error);
        }
        log::info!(
            "saved {} ({} bytes) via {}",
            resolved.value.path.display(),
            resolved.value.bytes,
            resolved.strategy
        );
        Ok(DeliveryReceipt {
            delivered: resolved.value,
            sink: resolved.strategy,
        })
    }
}
