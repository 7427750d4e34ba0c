use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One row of the `DefaultAttachments` table.
///
/// Every column except `id` is nullable in the store, so every field except
/// `id` is optional here too. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultAttachment {
    pub id: i64,
    pub active: Option<bool>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_by: Option<String>,
    pub name: Option<String>,
    pub applicant_type: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_required: Option<bool>,
}

/// Insert input. There is no `id` or `created_at`: both are store-generated.
///
/// `active`, `is_required` and `applicant_type` left as `None` are omitted
/// from the INSERT so the column default applies. `Some(false)` / `Some(0)`
/// are written as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDefaultAttachment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub applicant_type: Option<i32>,
}

impl DefaultAttachment {
    /// The caller-writable part of the record, as an insert input.
    pub fn to_create(&self) -> CreateDefaultAttachment {
        CreateDefaultAttachment {
            name: self.name.clone(),
            created_by: self.created_by.clone(),
            kind: self.kind.clone(),
            active: self.active,
            is_required: self.is_required,
            applicant_type: self.applicant_type,
        }
    }
}
