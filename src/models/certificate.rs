//! Certificate model and its create form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{
    normalize_tags, parse_date, FieldErrors, ListRecord, RecordCategory, RecordForm, RecordKind,
    UploadedFile, MAX_UPLOAD_BYTES,
};
use crate::query::SortOption;

/// Certificate categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CertificateCategory {
    Development,
    Design,
    Business,
    Data,
    Other,
}

impl RecordCategory for CertificateCategory {
    const ALL: &'static [Self] = &[
        CertificateCategory::Development,
        CertificateCategory::Design,
        CertificateCategory::Business,
        CertificateCategory::Data,
        CertificateCategory::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CertificateCategory::Development => "development",
            CertificateCategory::Design => "design",
            CertificateCategory::Business => "business",
            CertificateCategory::Data => "data",
            CertificateCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Active,
    Expired,
}

/// A certificate owned by the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: i64,
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub category: CertificateCategory,
    pub tags: Vec<String>,
    pub status: CertificateStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

/// What a share link shows to anyone holding it.
///
/// Serial number and PDF link stay private.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicCertificate {
    pub id: i64,
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    pub category: CertificateCategory,
    pub status: CertificateStatus,
    pub description: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub share_url: String,
}

impl Certificate {
    /// Link under which the certificate can be viewed without signing in.
    pub fn share_url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.id)
    }

    pub fn to_public(&self, recipient_name: Option<String>, share_base: &str) -> PublicCertificate {
        PublicCertificate {
            id: self.id,
            name: self.name.clone(),
            issuer: self.issuer.clone(),
            issue_date: self.issue_date.clone(),
            expiration_date: self.expiration_date.clone(),
            recipient_name,
            category: self.category,
            status: self.status,
            description: self.description.clone(),
            skills: self.tags.clone(),
            image: self.thumbnail.clone(),
            share_url: self.share_url(share_base),
        }
    }

    /// Not expired, and the expiration date falls strictly inside `(now, now + window)`.
    /// A window reaching past the representable range has no upper bound.
    pub fn is_expiring_soon(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.status == CertificateStatus::Expired {
            return false;
        }
        let Some(expires) = self
            .expiration_date
            .as_deref()
            .and_then(parse_date)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
        else {
            return false;
        };
        expires > now
            && now
                .checked_add_signed(window)
                .map_or(true, |end| expires < end)
    }
}

impl ListRecord for Certificate {
    type Category = CertificateCategory;

    const KIND: RecordKind = RecordKind {
        singular: "certificate",
        title: "Certificate",
        list_route: "/dashboard/certificates",
    };

    const SORTS: &'static [SortOption] = &[
        SortOption::Newest,
        SortOption::Oldest,
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::ExpiringSoon,
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> CertificateCategory {
        self.category
    }

    fn primary_date(&self) -> &str {
        &self.issue_date
    }

    fn expiration_date(&self) -> Option<&str> {
        self.expiration_date.as_deref()
    }

    fn expiring_soon(&self, now: DateTime<Utc>, window: Duration) -> Option<bool> {
        Some(self.is_expiring_soon(now, window))
    }
}

/// Request body for adding a certificate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCertificateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub issue_date: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

impl CreateCertificateRequest {
    /// Validate the form and build the certificate it describes under `id`.
    pub fn into_certificate(self, id: i64) -> Result<Certificate, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Certificate name is required".into());
        }
        if self.issuer.trim().is_empty() {
            errors.insert("issuer".into(), "Issuer is required".into());
        }

        let issue_date = parse_date(&self.issue_date);
        if self.issue_date.trim().is_empty() {
            errors.insert("issueDate".into(), "Issue date is required".into());
        } else if issue_date.is_none() {
            errors.insert("issueDate".into(), "Issue date is not a valid date".into());
        }

        let category = CertificateCategory::parse(self.category.trim());
        if category.is_none() {
            errors.insert("category".into(), "Category is required".into());
        }

        let expiration = self
            .expiration_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(raw) = expiration {
            match (parse_date(raw), issue_date) {
                (None, _) => {
                    errors.insert(
                        "expirationDate".into(),
                        "Expiration date is not a valid date".into(),
                    );
                }
                (Some(expires), Some(issued)) if expires <= issued => {
                    errors.insert(
                        "expirationDate".into(),
                        "Expiration date must be after issue date".into(),
                    );
                }
                _ => {}
            }
        }

        match &self.file {
            None => {
                errors.insert("file".into(), "Certificate file is required".into());
            }
            Some(file) if !file.is_image() && !file.is_pdf() => {
                errors.insert(
                    "file".into(),
                    "Invalid file type. Please upload an image or PDF.".into(),
                );
            }
            Some(file) if file.size > MAX_UPLOAD_BYTES => {
                errors.insert(
                    "file".into(),
                    "File is too large. Maximum size is 5MB.".into(),
                );
            }
            Some(_) => {}
        }

        let Some(category) = category.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        Ok(Certificate {
            id,
            name: self.name.trim().to_string(),
            issuer: self.issuer.trim().to_string(),
            issue_date: self.issue_date.trim().to_string(),
            expiration_date: expiration.map(str::to_string),
            serial_number: self
                .serial_number
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            category,
            tags: normalize_tags(&self.tags),
            status: CertificateStatus::Active,
            description: self.description.trim().to_string(),
            thumbnail: None,
            pdf_url: None,
        })
    }
}

impl RecordForm for CreateCertificateRequest {
    type Record = Certificate;

    fn into_record(self, id: i64) -> Result<Certificate, FieldErrors> {
        self.into_certificate(id)
    }
}
