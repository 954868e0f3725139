use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::resumes::repo_types::Resume;
use crate::sections::{SectionRow, SectionRowInput};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

/// Body of both create and update.
#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub title: String,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub sections: Vec<SectionRowInput>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListItem {
    pub id: Uuid,
    pub title: String,
    pub template_id: Option<Uuid>,
    pub has_photo: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Resume> for ResumeListItem {
    fn from(r: Resume) -> Self {
        Self {
            id: r.id,
            title: r.title,
            template_id: r.template_id,
            has_photo: r.photo_key.is_some(),
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeDetails {
    pub id: Uuid,
    pub title: String,
    pub template_id: Option<Uuid>,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Edit form: the resume (absent for a new one) and its section rows.
#[derive(Debug, Serialize)]
pub struct ResumeForm {
    pub resume: Option<ResumeDetails>,
    pub rows: Vec<SectionRow>,
}
