//! Attachment retrieval for the dossier export pipeline.
//!
//! ## Available Sources
//!
//! - [`HttpAssetSource`]: Fetches over HTTP(S) with reqwest
//! - [`InMemoryAssetSource`]: Pre-populated in-memory storage (re-exported from dossier-traits)
//!
//! The [`AssetInliner`] turns attachments into embeddable assets by running
//! an ordered fallback chain over one of these sources.

mod endpoints;
mod http;
mod inliner;

pub use endpoints::{attachment_endpoint, normalize_base_url};
pub use http::HttpAssetSource;
pub use inliner::{AnonymousFetch, AssetInliner, AuthenticatedFetch, RawReference};

pub use dossier_traits::InMemoryAssetSource;
