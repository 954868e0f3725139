use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::templates::repo_types::ResumeTemplate;

const TEMPLATE_COLUMNS: &str =
    "id, name, description, html_template, preview_image_key, created_at";

impl ResumeTemplate {
    /// Newest first.
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<ResumeTemplate>> {
        let rows = sqlx::query_as::<_, ResumeTemplate>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
              FROM resume_templates
             ORDER BY created_at DESC, name ASC
             LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list templates")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ResumeTemplate>> {
        let row = sqlx::query_as::<_, ResumeTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM resume_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find template")?;
        Ok(row)
    }
}
