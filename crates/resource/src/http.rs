use async_trait::async_trait;
use dossier_traits::{AssetSource, FetchRequest, FetchedAsset, ResourceError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;

/// Fetches attachment bytes over HTTP(S).
///
/// No timeout is applied unless one is configured; a hung request hangs
/// the caller.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: Client,
}

impl HttpAssetSource {
    pub fn new() -> Result<Self, ResourceError> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, ResourceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ResourceError::Transport {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedAsset, ResourceError> {
        let transport = |e: reqwest::Error| ResourceError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.get(&request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResourceError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport)?;
        log::debug!(
            "fetched {} bytes from {} ({})",
            bytes.len(),
            request.url,
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchedAsset {
            bytes: Arc::new(bytes.to_vec()),
            content_type,
        })
    }

    fn name(&self) -> &'static str {
        "HttpAssetSource"
    }
}
