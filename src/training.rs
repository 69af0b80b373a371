//! Maps the backend's training payload onto a [`Record`].

use crate::error::ExportError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use dossier_types::record::EMPTY_VALUE;
use dossier_types::{Attachment, Field, Record, SubRecord};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const KIND: &str = "training";

/// Body of `GET {base}/trainings/{id}/user_trainings.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<UserTraining>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserTraining {
    pub training_subject_name: Option<String>,
    pub training_type: Option<String>,
    pub training_date: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_by: Option<Person>,
    pub training_attachments: Option<Vec<TrainingAttachment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub mobile: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub employee_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainingAttachment {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    pub url: Option<String>,
    pub doctype: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<UserTraining>, D::Error> {
    Ok(Option::<Vec<UserTraining>>::deserialize(d)?.unwrap_or_default())
}

/// Accepts strings and numbers; anything else reads as absent.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `completed` → Pass, `pending` → Fail, anything else → Not Yet.
pub fn status_label(status: Option<&str>) -> &'static str {
    match status.unwrap_or("").trim().to_lowercase().as_str() {
        "completed" => "Pass",
        "pending" => "Fail",
        _ => "Not Yet",
    }
}

/// `dd/mm/yyyy` in local time, or the empty-value placeholder.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return EMPTY_VALUE.to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%d/%m/%Y").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%d/%m/%Y").to_string();
        }
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => EMPTY_VALUE.to_string(),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn entry(training: &UserTraining) -> SubRecord {
    let mut sub = SubRecord::new("TRAINING DETAILS");
    sub.fields = vec![
        Field::new("Training Name", text(&training.training_subject_name)),
        Field::new("Training Type", text(&training.training_type)),
        Field::new("Training Date", format_date(training.training_date.as_deref())),
        Field::new("Created On", format_date(training.created_at.as_deref())),
        Field::new("Updated On", format_date(training.updated_at.as_deref())),
        Field::new("Status", status_label(training.status.as_deref())),
    ];
    sub.attachments = training
        .training_attachments
        .iter()
        .flatten()
        .map(|a| {
            let attachment = Attachment::new(a.id, a.url.clone().unwrap_or_default());
            match a.doctype.as_deref().filter(|d| !d.is_empty()) {
                Some(doctype) => attachment.with_declared_mime(doctype),
                None => attachment,
            }
        })
        .collect();
    sub
}

impl TrainingResponse {
    /// The first entry supplies the personal details; every entry becomes a
    /// training section.
    pub fn into_record(self, id: &str) -> Record {
        let mut record = Record::new(KIND, id);
        let primary = self.data.first().cloned().unwrap_or_default();
        let person = primary.created_by.clone().unwrap_or_default();
        record.summary = vec![
            Field::new("Name", text(&person.name)),
            Field::new("Email Id", text(&person.email)),
            Field::new("Mobile Number", text(&person.mobile)),
            Field::new("User Type", text(&person.employee_type)),
            Field::new("Status", status_label(primary.status.as_deref())),
            Field::new("Training Date", format_date(primary.training_date.as_deref())),
        ];
        record.entries = self.data.iter().map(entry).collect();
        record
    }
}

pub fn record_from_json(id: &str, body: &[u8]) -> Result<Record, ExportError> {
    let response: TrainingResponse = serde_json::from_slice(body)?;
    log::debug!("training {} has {} entries", id, response.data.len());
    Ok(response.into_record(id))
}
