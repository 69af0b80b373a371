//! Where records come from.

use crate::error::ExportError;
use crate::training;
use async_trait::async_trait;
use dossier_resource::normalize_base_url;
use dossier_traits::{AssetSource, FetchRequest, ResourceError};
use dossier_types::Record;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_record(&self, kind: &str, id: &str) -> Result<Record, ExportError>;
}

/// Fetches training records from the backend's JSON API.
///
/// Transport goes through an [`AssetSource`], so the same HTTP client (and
/// any configured timeout) serves both records and attachments.
#[derive(Debug, Clone)]
pub struct HttpTrainingSource {
    source: Arc<dyn AssetSource>,
    base_url: String,
    token: Option<String>,
}

impl HttpTrainingSource {
    pub fn new(source: Arc<dyn AssetSource>, base_url: &str, token: Option<String>) -> Self {
        Self {
            source,
            base_url: normalize_base_url(base_url),
            token,
        }
    }

    pub fn endpoint(&self, id: &str) -> String {
        format!("{}/trainings/{}/user_trainings.json", self.base_url, id)
    }
}

#[async_trait]
impl RecordSource for HttpTrainingSource {
    async fn fetch_record(&self, kind: &str, id: &str) -> Result<Record, ExportError> {
        if kind != training::KIND {
            return Err(ExportError::UnsupportedKind(kind.to_string()));
        }
        let url = self.endpoint(id);
        let request = match &self.token {
            Some(token) => FetchRequest::authenticated(&url, token),
            None => FetchRequest::anonymous(&url),
        };
        log::info!("fetching {} {} from {}", kind, id, url);
        let fetched = self.source.fetch(&request).await?;
        training::record_from_json(id, &fetched.bytes)
    }
}

/// Reads a record from a local JSON file.
///
/// Accepts either a backend training payload (`{"data": [...]}`) or a
/// serialized [`Record`].
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecordSource for FileRecordSource {
    async fn fetch_record(&self, kind: &str, id: &str) -> Result<Record, ExportError> {
        let body = std::fs::read(&self.path).map_err(|e| {
            ResourceError::NotFound(format!("{}: {}", self.path.display(), e))
        })?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        if value.get("data").is_some() {
            if kind != training::KIND {
                return Err(ExportError::UnsupportedKind(kind.to_string()));
            }
            let response: training::TrainingResponse = serde_json::from_value(value)?;
            return Ok(response.into_record(id));
        }
        let record: Record = serde_json::from_value(value)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_traits::InMemoryAssetSource;
    use std::io::Write;

    const BODY: &[u8] = br#"{"data":[{"training_subject_name":"Fire Safety","status":"completed"}]}"#;

    #[tokio::test]
    async fn fetches_with_bearer_token() {
        let memory = Arc::new(InMemoryAssetSource::new());
        memory
            .add_protected(
                "https://api.test/trainings/42/user_trainings.json",
                BODY.to_vec(),
                Some("application/json"),
                "tok",
            )
            .unwrap();

        let source = HttpTrainingSource::new(memory.clone(), "api.test/", Some("tok".into()));
        let record = source.fetch_record("training", "42").await.unwrap();
        assert_eq!(record.filename(), "training_42.pdf");
        assert_eq!(record.entries.len(), 1);
        assert_eq!(memory.requests()[0].bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let memory = Arc::new(InMemoryAssetSource::new());
        memory
            .add_status("https://api.test/trainings/9/user_trainings.json", 404)
            .unwrap();
        let source = HttpTrainingSource::new(memory, "https://api.test", None);
        let err = source.fetch_record("training", "9").await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::RecordFetch(ResourceError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_kinds_are_rejected() {
        let source = HttpTrainingSource::new(Arc::new(InMemoryAssetSource::new()), "x", None);
        let err = source.fetch_record("invoice", "1").await.unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedKind(k) if k == "invoice"));
    }

    #[tokio::test]
    async fn file_source_reads_both_formats() {
        let mut payload = tempfile::NamedTempFile::new().unwrap();
        payload.write_all(BODY).unwrap();
        let record = FileRecordSource::new(payload.path())
            .fetch_record("training", "3")
            .await
            .unwrap();
        assert_eq!(record.id, "3");

        let mut serialized = tempfile::NamedTempFile::new().unwrap();
        serialized
            .write_all(br#"{"kind":"asset","id":"a1","summary":[{"label":"Tag","value":"X"}]}"#)
            .unwrap();
        let record = FileRecordSource::new(serialized.path())
            .fetch_record("asset", "a1")
            .await
            .unwrap();
        assert_eq!(record.filename(), "asset_a1.pdf");
        assert_eq!(record.summary_title, "PERSONAL DETAILS");
    }
}
