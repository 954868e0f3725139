use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Seeded, read-only resume layout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub html_template: String,
    pub preview_image_key: Option<String>,
    pub created_at: OffsetDateTime,
}
