//! Shared record capability used by the listing pipeline.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{Award, Certificate};
use crate::query::SortOption;

/// Maximum accepted upload size (5 MB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Per-field validation messages keyed by the camelCase field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Closed category enumeration of a record type.
pub trait RecordCategory: Copy + Eq + Debug + Serialize + Send + Sync + 'static {
    /// Every member, in display order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Labels and routes that differ between record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKind {
    /// Lowercase singular noun, e.g. `certificate`.
    pub singular: &'static str,
    /// Capitalised singular noun, e.g. `Certificate`.
    pub title: &'static str,
    /// Route of the listing page that detail pages redirect back to.
    pub list_route: &'static str,
}

impl RecordKind {
    /// `certificate` or `certificates` depending on `count`.
    pub fn noun(&self, count: usize) -> String {
        if count == 1 {
            self.singular.to_string()
        } else {
            format!("{}s", self.singular)
        }
    }
}

/// The fields the query pipeline reads from a record.
pub trait ListRecord: Clone + Send + Sync + 'static {
    type Category: RecordCategory;

    const KIND: RecordKind;

    /// Sort options offered on this record type's listing page.
    const SORTS: &'static [SortOption];

    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn issuer(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[String];
    fn category(&self) -> Self::Category;

    /// Raw ISO date the record was issued or received.
    fn primary_date(&self) -> &str;

    fn expiration_date(&self) -> Option<&str> {
        None
    }

    /// `None` for record types that never expire.
    fn expiring_soon(&self, _now: DateTime<Utc>, _window: chrono::Duration) -> Option<bool> {
        None
    }
}

/// Create form of a record type.
pub trait RecordForm: DeserializeOwned + Send + 'static {
    type Record: ListRecord;

    /// Validate the form and build the record it describes under `id`.
    fn into_record(self, id: i64) -> Result<Self::Record, FieldErrors>;
}

/// Either record type, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Record {
    Certificate(Certificate),
    Award(Award),
}

impl Record {
    pub fn name(&self) -> &str {
        match self {
            Record::Certificate(c) => c.name(),
            Record::Award(a) => a.name(),
        }
    }

    pub fn primary_date(&self) -> Option<NaiveDate> {
        match self {
            Record::Certificate(c) => parse_date(c.primary_date()),
            Record::Award(a) => parse_date(a.primary_date()),
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date, also accepting a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Trim, lowercase and deduplicate tags, keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Metadata of the file attached to a create form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        matches!(
            self.content_type.as_str(),
            "image/jpeg" | "image/png" | "image/gif"
        )
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("2023-05-15"),
            NaiveDate::from_ymd_opt(2023, 5, 15)
        );
        assert_eq!(
            parse_date("2023-05-15T10:00:00Z"),
            NaiveDate::from_ymd_opt(2023, 5, 15)
        );
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " React ".to_string(),
            "react".to_string(),
            "".to_string(),
            "Machine Learning".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["react", "machine learning"]);
    }

    #[test]
    fn test_kind_noun() {
        let kind = Certificate::KIND;
        assert_eq!(kind.noun(1), "certificate");
        assert_eq!(kind.noun(0), "certificates");
        assert_eq!(kind.noun(3), "certificates");
    }
}
