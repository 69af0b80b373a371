//! Converts attachments into embeddable assets.
//!
//! Image attachments go through an ordered chain:
//! authenticated endpoint, then anonymous fetch of the original reference,
//! then the raw reference itself. Each fetched payload is base64-encoded
//! into a data URI and its MIME repaired from the source extension.
//! Non-image attachments are never fetched.

use crate::endpoints::attachment_endpoint;
use async_trait::async_trait;
use dossier_traits::{AssetSource, FetchRequest, ResourceError, Strategy, StrategyChain};
use dossier_types::{AssetRef, Attachment, InlineOutcome, InlineVia, InlinedAsset, Record};
use futures::future::join_all;
use std::sync::Arc;

type InlineChain = StrategyChain<Attachment, InlineOutcome, ResourceError>;

async fn fetch_inlined(
    source: &dyn AssetSource,
    request: FetchRequest,
    attachment: &Attachment,
) -> Result<InlinedAsset, ResourceError> {
    let fetched = source.fetch(&request).await?;
    if fetched.bytes.is_empty() {
        return Err(ResourceError::InvalidFormat(format!(
            "empty body from {}",
            request.url
        )));
    }
    Ok(InlinedAsset::from_bytes(
        &fetched.bytes,
        fetched.content_type.as_deref(),
        &attachment.source_url,
        attachment.declared_mime.as_deref(),
    ))
}

/// `GET {base}/attachfiles/{id}?show_file=true` with the bearer credential.
pub struct AuthenticatedFetch {
    source: Arc<dyn AssetSource>,
    base_url: Option<String>,
    token: Option<String>,
}

impl AuthenticatedFetch {
    pub fn new(
        source: Arc<dyn AssetSource>,
        base_url: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            source,
            base_url,
            token,
        }
    }
}

#[async_trait]
impl Strategy<Attachment, InlineOutcome, ResourceError> for AuthenticatedFetch {
    fn name(&self) -> &'static str {
        "authenticated-fetch"
    }

    fn applies(&self, attachment: &Attachment) -> bool {
        attachment.id.is_some() && self.token.is_some() && self.base_url.is_some()
    }

    async fn attempt(&self, attachment: &Attachment) -> Result<InlineOutcome, ResourceError> {
        let (Some(id), Some(base), Some(token)) = (attachment.id, &self.base_url, &self.token)
        else {
            return Err(ResourceError::NotFound(
                "attachment id or credentials missing".to_string(),
            ));
        };
        let request = FetchRequest::authenticated(attachment_endpoint(base, id), token.clone());
        let asset = fetch_inlined(self.source.as_ref(), request, attachment).await?;
        Ok(InlineOutcome::new(
            AssetRef::Embedded(asset),
            InlineVia::Authenticated,
        ))
    }
}

/// `GET {source_url}` without credentials.
pub struct AnonymousFetch {
    source: Arc<dyn AssetSource>,
}

impl AnonymousFetch {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Strategy<Attachment, InlineOutcome, ResourceError> for AnonymousFetch {
    fn name(&self) -> &'static str {
        "anonymous-fetch"
    }

    fn applies(&self, attachment: &Attachment) -> bool {
        !attachment.source_url.trim().is_empty()
    }

    async fn attempt(&self, attachment: &Attachment) -> Result<InlineOutcome, ResourceError> {
        let request = FetchRequest::anonymous(attachment.source_url.clone());
        let asset = fetch_inlined(self.source.as_ref(), request, attachment).await?;
        Ok(InlineOutcome::new(
            AssetRef::Embedded(asset),
            InlineVia::Anonymous,
        ))
    }
}

/// Keeps the original reference untouched.
pub struct RawReference;

#[async_trait]
impl Strategy<Attachment, InlineOutcome, ResourceError> for RawReference {
    fn name(&self) -> &'static str {
        "raw-reference"
    }

    fn applies(&self, attachment: &Attachment) -> bool {
        !attachment.source_url.trim().is_empty()
    }

    async fn attempt(&self, attachment: &Attachment) -> Result<InlineOutcome, ResourceError> {
        Ok(InlineOutcome::new(
            AssetRef::Raw(attachment.source_url.clone()),
            InlineVia::RawFallback,
        ))
    }
}

/// Runs the inlining chain for attachments. Never fails.
pub struct AssetInliner {
    chain: InlineChain,
}

impl AssetInliner {
    /// The standard chain: authenticated, anonymous, raw reference.
    pub fn new(
        source: Arc<dyn AssetSource>,
        base_url: Option<String>,
        token: Option<String>,
    ) -> Self {
        let chain = StrategyChain::new("inline")
            .with(AuthenticatedFetch::new(source.clone(), base_url, token))
            .with(AnonymousFetch::new(source))
            .with(RawReference);
        Self { chain }
    }

    /// An inliner over a caller-assembled chain.
    pub fn with_chain(chain: InlineChain) -> Self {
        Self { chain }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    pub async fn inline(&self, attachment: &Attachment) -> InlineOutcome {
        if !attachment.kind().is_image() {
            return InlineOutcome::new(
                AssetRef::TextReference(attachment.source_url.clone()),
                InlineVia::NotAnImage,
            );
        }

        match self.chain.run(attachment).await {
            Ok(resolved) => {
                log::debug!(
                    "attachment {:?} inlined via {}",
                    attachment.id,
                    resolved.strategy
                );
                resolved.value
            }
            Err(exhausted) => {
                log::warn!(
                    "attachment {:?} could not be inlined ({}); using a text reference",
                    attachment.id,
                    exhausted
                );
                InlineOutcome::new(
                    AssetRef::TextReference(attachment.source_url.clone()),
                    InlineVia::RawFallback,
                )
            }
        }
    }

    /// Inlines every attachment concurrently; results keep input order.
    pub async fn inline_all(&self, attachments: &[Attachment]) -> Vec<InlineOutcome> {
        join_all(attachments.iter().map(|a| self.inline(a))).await
    }

    /// Inlines the attachments of every entry of `record`, one list per entry.
    pub async fn inline_record(&self, record: &Record) -> Vec<Vec<InlineOutcome>> {
        join_all(
            record
                .entries
                .iter()
                .map(|entry| self.inline_all(&entry.attachments)),
        )
        .await
    }
}
