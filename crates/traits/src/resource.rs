//! AssetSource trait for abstracting attachment retrieval.
//!
//! The export pipeline fetches attachment bytes either from an authenticated
//! per-asset endpoint or anonymously from the original reference. Both go
//! through this trait so the inliner can be exercised without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Error type for asset retrieval.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request to '{url}' failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to load resource '{url}': {message}")]
    Transport { url: String, message: String },

    #[error("Invalid resource format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// A single GET request for binary content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Bearer token sent as `Authorization: Bearer <token>`.
    pub bearer: Option<String>,
}

impl FetchRequest {
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer: None,
        }
    }

    pub fn authenticated(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer: Some(token.into()),
        }
    }
}

/// The body of a successful (2xx) response.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: SharedResourceData,
    /// The `Content-Type` reported by the server, if any.
    pub content_type: Option<String>,
}

/// A source of binary attachment content.
///
/// Implementations must map any non-2xx answer to an error so that
/// callers can move on to their next fallback.
#[async_trait]
pub trait AssetSource: Send + Sync + Debug {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedAsset, ResourceError>;

    /// Returns a human-readable name for this source (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
enum Entry {
    Body {
        data: SharedResourceData,
        content_type: Option<String>,
        required_token: Option<String>,
    },
    Status(u16),
}

/// An in-memory asset source keyed by URL.
///
/// Entries must be pre-populated. An entry can demand a specific bearer
/// token (answering 401 otherwise) or always answer with a fixed status.
/// Every request is recorded and can be inspected with [`requests`](Self::requests).
#[derive(Debug, Default)]
pub struct InMemoryAssetSource {
    entries: RwLock<HashMap<String, Entry>>,
    log: Mutex<Vec<FetchRequest>>,
}

impl InMemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` at `url` to anyone.
    pub fn add(
        &self,
        url: impl Into<String>,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ResourceError> {
        self.insert(
            url.into(),
            Entry::Body {
                data: Arc::new(data),
                content_type: content_type.map(str::to_string),
                required_token: None,
            },
        )
    }

    /// Serve `data` at `url` only to requests carrying `token`.
    pub fn add_protected(
        &self,
        url: impl Into<String>,
        data: Vec<u8>,
        content_type: Option<&str>,
        token: impl Into<String>,
    ) -> Result<(), ResourceError> {
        self.insert(
            url.into(),
            Entry::Body {
                data: Arc::new(data),
                content_type: content_type.map(str::to_string),
                required_token: Some(token.into()),
            },
        )
    }

    /// Always answer `url` with `status`.
    pub fn add_status(&self, url: impl Into<String>, status: u16) -> Result<(), ResourceError> {
        self.insert(url.into(), Entry::Status(status))
    }

    fn insert(&self, url: String, entry: Entry) -> Result<(), ResourceError> {
        let mut entries = self.entries.write().map_err(|_| ResourceError::Transport {
            url: url.clone(),
            message: "resource store lock poisoned".to_string(),
        })?;
        entries.insert(url, entry);
        Ok(())
    }

    /// Requests received so far, in arrival order.
    ///
    /// Returns an empty list if the lock is poisoned.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map(|e| e.is_empty()).unwrap_or(true)
    }
}

#[async_trait]
impl AssetSource for InMemoryAssetSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedAsset, ResourceError> {
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }

        let entry = {
            let entries = self.entries.read().map_err(|_| ResourceError::Transport {
                url: request.url.clone(),
                message: "resource store lock poisoned".to_string(),
            })?;
            entries.get(&request.url).cloned()
        };

        match entry {
            None => Err(ResourceError::NotFound(request.url.clone())),
            Some(Entry::Status(status)) => Err(ResourceError::Status {
                url: request.url.clone(),
                status,
            }),
            Some(Entry::Body {
                data,
                content_type,
                required_token,
            }) => {
                if let Some(token) = required_token
                    && request.bearer.as_deref() != Some(token.as_str())
                {
                    return Err(ResourceError::Status {
                        url: request.url.clone(),
                        status: 401,
                    });
                }
                Ok(FetchedAsset {
                    bytes: data,
                    content_type,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "InMemoryAssetSource"
    }
}
