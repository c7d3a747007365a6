//! Award model and its create form.

use serde::{Deserialize, Serialize};

use super::{
    normalize_tags, parse_date, FieldErrors, ListRecord, RecordCategory, RecordForm, RecordKind,
    UploadedFile, MAX_UPLOAD_BYTES,
};
use crate::query::SortOption;

/// Award categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AwardCategory {
    Professional,
    Academic,
    Speaking,
    Innovation,
    Community,
    Other,
}

impl RecordCategory for AwardCategory {
    const ALL: &'static [Self] = &[
        AwardCategory::Professional,
        AwardCategory::Academic,
        AwardCategory::Speaking,
        AwardCategory::Innovation,
        AwardCategory::Community,
        AwardCategory::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            AwardCategory::Professional => "professional",
            AwardCategory::Academic => "academic",
            AwardCategory::Speaking => "speaking",
            AwardCategory::Innovation => "innovation",
            AwardCategory::Community => "community",
            AwardCategory::Other => "other",
        }
    }
}

/// An award received by the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: i64,
    pub name: String,
    pub issuer: String,
    pub date_received: String,
    pub category: AwardCategory,
    pub tags: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ListRecord for Award {
    type Category = AwardCategory;

    const KIND: RecordKind = RecordKind {
        singular: "award",
        title: "Award",
        list_route: "/dashboard/awards",
    };

    const SORTS: &'static [SortOption] = &[
        SortOption::Newest,
        SortOption::Oldest,
        SortOption::NameAsc,
        SortOption::NameDesc,
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

    fn category(&self) -> AwardCategory {
        self.category
    }

    fn primary_date(&self) -> &str {
        &self.date_received
    }
}

/// Request body for adding an award.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAwardRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date_received: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

impl CreateAwardRequest {
    /// Validate the form and build the award it describes under `id`.
    pub fn into_award(self, id: i64) -> Result<Award, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name".into(), "Award name is required".into());
        }
        if self.issuer.trim().is_empty() {
            errors.insert("issuer".into(), "Issuing organization is required".into());
        }
        if self.date_received.trim().is_empty() {
            errors.insert("dateReceived".into(), "Date received is required".into());
        } else if parse_date(&self.date_received).is_none() {
            errors.insert(
                "dateReceived".into(),
                "Date received is not a valid date".into(),
            );
        }

        let category = AwardCategory::parse(self.category.trim());
        if category.is_none() {
            errors.insert("category".into(), "Category is required".into());
        }

        // Awards only take images.
        match &self.file {
            None => {
                errors.insert("file".into(), "Award image is required".into());
            }
            Some(file) if !file.is_image() => {
                errors.insert(
                    "file".into(),
                    "Invalid file type. Please upload an image (JPG, PNG, or GIF).".into(),
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

        Ok(Award {
            id,
            name: self.name.trim().to_string(),
            issuer: self.issuer.trim().to_string(),
            date_received: self.date_received.trim().to_string(),
            category,
            tags: normalize_tags(&self.tags),
            description: self.description.trim().to_string(),
            thumbnail: None,
        })
    }
}

impl RecordForm for CreateAwardRequest {
    type Record = Award;

    fn into_record(self, id: i64) -> Result<Award, FieldErrors> {
        self.into_award(id)
    }
}
