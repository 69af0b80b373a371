//! Inlined attachment assets and the data-URI encoding they travel in.

use crate::mime;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const OCTET_STREAM: &str = "application/octet-stream";

/// An attachment converted into a self-contained `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedAsset {
    pub data_uri: String,
    pub mime: String,
}

impl InlinedAsset {
    /// Encodes fetched bytes and repairs the MIME against the source reference.
    ///
    /// `content_type` is the MIME reported by the server, if any.
    pub fn from_bytes(
        bytes: &[u8],
        content_type: Option<&str>,
        source_url: &str,
        declared_mime: Option<&str>,
    ) -> Self {
        let reported = content_type
            .map(mime::essence)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        let raw = encode_data_uri(bytes, &reported);
        Self::from_data_uri(repair_data_uri_mime(&raw, source_url, declared_mime))
    }

    pub fn from_data_uri(data_uri: String) -> Self {
        let mime = data_uri_mime(&data_uri).unwrap_or(OCTET_STREAM).to_string();
        Self { data_uri, mime }
    }

    /// Re-applies MIME repair. Applying it any number of times gives the same asset.
    pub fn repaired(&self, source_url: &str, declared_mime: Option<&str>) -> Self {
        Self::from_data_uri(repair_data_uri_mime(
            &self.data_uri,
            source_url,
            declared_mime,
        ))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        decode_data_uri(&self.data_uri).map(|(_, bytes)| bytes)
    }
}

pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// The MIME declared in a data URI header, if the header names one.
pub fn data_uri_mime(uri: &str) -> Option<&str> {
    let header = uri.strip_prefix("data:")?;
    let end = header.find([';', ',']).unwrap_or(header.len());
    let declared = &header[..end];
    if declared.is_empty() { None } else { Some(declared) }
}

pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or(OCTET_STREAM)
        .to_string();
    let data = if header.contains(";base64") {
        STANDARD.decode(payload).ok()?
    } else {
        payload.as_bytes().to_vec()
    };
    Some((mime, data))
}

/// Rewrites a missing or non-image MIME in `uri` to the one implied by the source.
///
/// The replacement comes from the extension of `source_url`, or failing that
/// from an `image/*` `declared_mime`. URIs that already declare an image MIME,
/// or sources with no image hint at all, are returned unchanged.
pub fn repair_data_uri_mime(uri: &str, source_url: &str, declared_mime: Option<&str>) -> String {
    let Some(header) = uri.strip_prefix("data:") else {
        return uri.to_string();
    };
    if header.starts_with("image") {
        return uri.to_string();
    }

    let declared_image = declared_mime
        .map(mime::essence)
        .filter(|m| m.starts_with("image/"));
    let target = match mime::image_mime_from_url(source_url) {
        Some(m) => m.to_string(),
        None => match declared_image {
            Some(m) => m,
            None => return uri.to_string(),
        },
    };

    let end = header.find([';', ',']).unwrap_or(header.len());
    format!("data:{}{}", target, &header[end..])
}

/// How an attachment ended up being represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineVia {
    /// Fetched from the per-asset endpoint with the bearer credential.
    Authenticated,
    /// Fetched anonymously from the original reference.
    Anonymous,
    /// Both fetches failed; the raw reference is kept as-is.
    RawFallback,
    /// Not an image, so never fetched.
    NotAnImage,
}

/// What the layout builder consumes for one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    Embedded(InlinedAsset),
    /// An image reference that could not be inlined.
    Raw(String),
    /// Rendered as a text line instead of a preview.
    TextReference(String),
}

impl AssetRef {
    /// The human-readable reference shown when the asset is drawn as text.
    pub fn reference_text<'a>(&'a self, source_url: &'a str) -> &'a str {
        match self {
            AssetRef::Raw(url) | AssetRef::TextReference(url) => url,
            AssetRef::Embedded(_) => source_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOutcome {
    pub asset: AssetRef,
    pub via: InlineVia,
}

impl InlineOutcome {
    pub fn new(asset: AssetRef, via: InlineVia) -> Self {
        Self { asset, via }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.asset, AssetRef::Embedded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_octet_stream_from_extension() {
        let raw = encode_data_uri(b"\x89PNG", "application/octet-stream");
        let fixed = repair_data_uri_mime(&raw, "https://cdn/a/photo.png", None);
        assert!(fixed.starts_with("data:image/png;base64,"));
        assert_eq!(fixed.split_once(',').unwrap().1, raw.split_once(',').unwrap().1);
    }

    #[test]
    fn repairs_missing_mime() {
        let fixed = repair_data_uri_mime("data:;base64,AAAA", "x.jpeg", None);
        assert_eq!(fixed, "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn leaves_image_mime_untouched() {
        let uri = "data:image/gif;base64,R0lG";
        assert_eq!(repair_data_uri_mime(uri, "x.png", None), uri);
    }

    #[test]
    fn uses_declared_image_mime_without_extension() {
        let fixed = repair_data_uri_mime(
            "data:application/octet-stream;base64,AAAA",
            "https://cdn/blob/17",
            Some("image/webp"),
        );
        assert_eq!(fixed, "data:image/webp;base64,AAAA");
    }

    #[test]
    fn unknown_source_is_left_alone() {
        let uri = "data:application/octet-stream;base64,AAAA";
        assert_eq!(repair_data_uri_mime(uri, "https://cdn/blob/17", None), uri);
        assert_eq!(repair_data_uri_mime("not-a-uri", "x.png", None), "not-a-uri");
    }

    #[test]
    fn repair_is_idempotent() {
        let asset = InlinedAsset::from_bytes(b"abc", Some("text/plain"), "scan.svg", None);
        assert_eq!(asset.mime, "image/svg+xml");
        let once = asset.repaired("scan.svg", None);
        let twice = once.repaired("scan.svg", None);
        assert_eq!(once, asset);
        assert_eq!(twice, once);
    }

    #[test]
    fn from_bytes_strips_content_type_parameters() {
        let asset = InlinedAsset::from_bytes(b"abc", Some("image/png; q=1"), "x", None);
        assert_eq!(asset.mime, "image/png");
        assert_eq!(asset.decode().unwrap(), b"abc");
    }

    #[test]
    fn decodes_plain_and_base64_payloads() {
        let (mime, bytes) = decode_data_uri("data:text/plain,hello").unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"hello");
        assert!(decode_data_uri("https://not/a/data/uri").is_none());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_none());
    }
}
