use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::kinds::SectionType;
use super::repo_types::{NewSection, ResumeSection, SectionEdit};

/// Which sections of a resume a delete applies to.
#[derive(Debug, Clone, Copy)]
pub enum SectionFilter<'a> {
    /// Everything whose type is not one of these.
    NotOfTypes(&'a [SectionType]),
    /// Exactly these rows.
    Ids(&'a [Uuid]),
}

/// Persistence boundary of the reconciliation engine.
#[async_trait]
pub trait SectionStore: Send + Sync {
    /// Sections of a resume ordered by `order`, optionally restricted to `types`.
    async fn fetch(
        &self,
        resume_id: Uuid,
        types: Option<&[SectionType]>,
    ) -> anyhow::Result<Vec<ResumeSection>>;

    async fn create(&self, resume_id: Uuid, section: NewSection) -> anyhow::Result<ResumeSection>;

    /// Returns the number of deleted rows.
    async fn delete_matching(&self, resume_id: Uuid, filter: SectionFilter<'_>)
        -> anyhow::Result<u64>;

    /// Applies every edit or none of them.
    async fn save_batch(
        &self,
        resume_id: Uuid,
        edits: Vec<SectionEdit>,
    ) -> anyhow::Result<Vec<ResumeSection>>;
}

#[derive(Clone)]
pub struct PgSectionStore {
    db: PgPool,
}

impl PgSectionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn type_names(types: &[SectionType]) -> Vec<String> {
    types.iter().map(|k| k.as_str().to_string()).collect()
}

#[async_trait]
impl SectionStore for PgSectionStore {
    async fn fetch(
        &self,
        resume_id: Uuid,
        types: Option<&[SectionType]>,
    ) -> anyhow::Result<Vec<ResumeSection>> {
        let rows = match types {
            Some(types) => sqlx::query_as::<_, ResumeSection>(
                r#"
                SELECT id, resume_id, section_type, content, sort_order
                  FROM resume_sections
                 WHERE resume_id = $1 AND section_type = ANY($2)
                 ORDER BY sort_order ASC, created_at ASC
                "#,
            )
            .bind(resume_id)
            .bind(type_names(types))
            .fetch_all(&self.db)
            .await,
            None => sqlx::query_as::<_, ResumeSection>(
                r#"
                SELECT id, resume_id, section_type, content, sort_order
                  FROM resume_sections
                 WHERE resume_id = $1
                 ORDER BY sort_order ASC, created_at ASC
                "#,
            )
            .bind(resume_id)
            .fetch_all(&self.db)
            .await,
        };
        rows.context("fetch resume sections")
    }

    async fn create(&self, resume_id: Uuid, section: NewSection) -> anyhow::Result<ResumeSection> {
        let row = sqlx::query_as::<_, ResumeSection>(
            r#"
            INSERT INTO resume_sections (resume_id, section_type, content, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, resume_id, section_type, content, sort_order
            "#,
        )
        .bind(resume_id)
        .bind(section.section_type.as_str())
        .bind(&section.content)
        .bind(section.order)
        .fetch_one(&self.db)
        .await
        .context("insert resume section")?;
        Ok(row)
    }

    async fn delete_matching(
        &self,
        resume_id: Uuid,
        filter: SectionFilter<'_>,
    ) -> anyhow::Result<u64> {
        let result = match filter {
            SectionFilter::NotOfTypes(types) => sqlx::query(
                r#"
                DELETE FROM resume_sections
                 WHERE resume_id = $1 AND NOT (section_type = ANY($2))
                "#,
            )
            .bind(resume_id)
            .bind(type_names(types))
            .execute(&self.db)
            .await,
            SectionFilter::Ids(ids) => sqlx::query(
                r#"
                DELETE FROM resume_sections
                 WHERE resume_id = $1 AND id = ANY($2)
                "#,
            )
            .bind(resume_id)
            .bind(ids.to_vec())
            .execute(&self.db)
            .await,
        };
        Ok(result.context("delete resume sections")?.rows_affected())
    }

    async fn save_batch(
        &self,
        resume_id: Uuid,
        edits: Vec<SectionEdit>,
    ) -> anyhow::Result<Vec<ResumeSection>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let mut saved = Vec::with_capacity(edits.len());
        for edit in &edits {
            saved.push(save_one_tx(&mut tx, resume_id, edit).await?);
        }
        // sort_order uniqueness is a deferred constraint, checked here.
        tx.commit().await.context("commit section batch")?;
        saved.sort_by_key(|s| s.order);
        Ok(saved)
    }
}

async fn save_one_tx(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: Uuid,
    edit: &SectionEdit,
) -> anyhow::Result<ResumeSection> {
    match edit.id {
        Some(id) => {
            let row = sqlx::query_as::<_, ResumeSection>(
                r#"
                UPDATE resume_sections
                   SET section_type = $3, content = $4, sort_order = $5
                 WHERE id = $1 AND resume_id = $2
                RETURNING id, resume_id, section_type, content, sort_order
                "#,
            )
            .bind(id)
            .bind(resume_id)
            .bind(edit.section_type.as_str())
            .bind(&edit.content)
            .bind(edit.order)
            .fetch_optional(&mut **tx)
            .await
            .context("update resume section")?;
            row.ok_or_else(|| anyhow::anyhow!("section {} does not belong to resume {}", id, resume_id))
        }
        None => sqlx::query_as::<_, ResumeSection>(
            r#"
            INSERT INTO resume_sections (resume_id, section_type, content, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, resume_id, section_type, content, sort_order
            "#,
        )
        .bind(resume_id)
        .bind(edit.section_type.as_str())
        .bind(&edit.content)
        .bind(edit.order)
        .fetch_one(&mut **tx)
        .await
        .context("insert resume section"),
    }
}
