use crate::mime::AttachmentKind;
use serde::{Deserialize, Serialize};

/// Placeholder shown for empty values.
pub const EMPTY_VALUE: &str = "—";

/// The primary entity being exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Entity name used in the output filename (e.g. `training`).
    pub kind: String,
    pub id: String,
    #[serde(default = "default_summary_title")]
    pub summary_title: String,
    #[serde(default)]
    pub summary: Vec<Field>,
    #[serde(default)]
    pub entries: Vec<SubRecord>,
}

fn default_summary_title() -> String {
    "PERSONAL DETAILS".to_string()
}

impl Record {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            summary_title: default_summary_title(),
            summary: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// `<kind>_<id>.pdf`, with path separators neutralised.
    pub fn filename(&self) -> String {
        let clean = |s: &str| s.replace(['/', '\\'], "_");
        format!("{}_{}.pdf", clean(&self.kind), clean(&self.id))
    }

    pub fn attachment_count(&self) -> usize {
        self.entries.iter().map(|e| e.attachments.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRecord {
    #[serde(default = "default_entry_title")]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn default_entry_title() -> String {
    "TRAINING DETAILS".to_string()
}

impl SubRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn display_value(&self) -> &str {
        if self.value.trim().is_empty() {
            EMPTY_VALUE
        } else {
            &self.value
        }
    }
}

/// A reference to a binary file attached to a sub-record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, alias = "url")]
    pub source_url: String,
    #[serde(default, alias = "doctype")]
    pub declared_mime: Option<String>,
}

impl Attachment {
    pub fn new(id: Option<u64>, source_url: impl Into<String>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
            declared_mime: None,
        }
    }

    pub fn with_declared_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::classify(&self.source_url, self.declared_mime.as_deref())
    }
}
