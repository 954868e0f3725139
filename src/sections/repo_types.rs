use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kinds::SectionType;

/// Section row as persisted.
///
/// `section_type` stays a raw string: rows written before the fixed set was
/// enforced may carry values outside it until reconciliation removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ResumeSection {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub section_type: String,
    pub content: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
}

impl ResumeSection {
    pub fn kind(&self) -> Option<SectionType> {
        SectionType::parse(&self.section_type)
    }

    /// Heading for previews/exports; unknown types fall back to the raw name.
    pub fn label(&self) -> &str {
        match self.kind() {
            Some(kind) => kind.label(),
            None => &self.section_type,
        }
    }
}

/// Section to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    pub section_type: SectionType,
    pub content: String,
    pub order: i32,
}

/// One validated row of a submitted batch. `id == None` inserts a new section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEdit {
    pub id: Option<Uuid>,
    pub section_type: SectionType,
    pub content: String,
    pub order: i32,
}
