//! MIME inference for attachment references.
//!
//! Attachment URLs coming from the backend are the only reliable hint about
//! what a file is: the binary endpoint frequently answers with
//! `application/octet-stream`, so the extension of the original reference
//! is used to classify attachments and to repair data URIs.

/// Broad classes of attachment, decided from the reference and its declared MIME.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
    Spreadsheet,
    Word,
    Other,
}

impl AttachmentKind {
    pub fn classify(url: &str, declared_mime: Option<&str>) -> Self {
        let ext = extension(url);
        let declared = declared_mime.unwrap_or("").trim().to_ascii_lowercase();

        if image_mime_for_extension(ext.as_deref()).is_some() || declared.starts_with("image/") {
            return AttachmentKind::Image;
        }
        match ext.as_deref() {
            Some("pdf") => return AttachmentKind::Pdf,
            Some("xls" | "xlsx" | "csv") => return AttachmentKind::Spreadsheet,
            Some("doc" | "docx") => return AttachmentKind::Word,
            _ => {}
        }
        if declared == "application/pdf" {
            AttachmentKind::Pdf
        } else if declared.contains("spreadsheetml")
            || declared.contains("excel")
            || declared.contains("csv")
        {
            AttachmentKind::Spreadsheet
        } else if declared.contains("word") {
            AttachmentKind::Word
        } else {
            AttachmentKind::Other
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, AttachmentKind::Image)
    }
}

/// Lower-cased extension of the path component of `url`, ignoring query and fragment.
pub fn extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let file = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

fn image_mime_for_extension(ext: Option<&str>) -> Option<&'static str> {
    match ext? {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// The image MIME implied by the extension of `url`, if it has a known image extension.
pub fn image_mime_from_url(url: &str) -> Option<&'static str> {
    image_mime_for_extension(extension(url).as_deref())
}

/// Like [`image_mime_from_url`] but falls back to `image/jpeg`.
pub fn infer_image_mime(url: &str) -> &'static str {
    image_mime_from_url(url).unwrap_or("image/jpeg")
}

/// Strips parameters (`; charset=...`) and normalises case.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
