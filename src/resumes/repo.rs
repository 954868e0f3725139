use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::resumes::repo_types::Resume;

const RESUME_COLUMNS: &str = "id, user_id, title, template_id, photo_key, created_at, updated_at";

impl Resume {
    /// Most recently updated first.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Resume>> {
        let rows = sqlx::query_as::<_, Resume>(&format!(
            r#"
            SELECT {RESUME_COLUMNS}
              FROM resumes
             WHERE user_id = $1
             ORDER BY updated_at DESC
             LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list resumes")?;
        Ok(rows)
    }

    /// Looks a resume up by id regardless of owner.
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Resume>> {
        let row = sqlx::query_as::<_, Resume>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find resume")?;
        Ok(row)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        template_id: Option<Uuid>,
        photo_key: Option<&str>,
    ) -> anyhow::Result<Resume> {
        let row = sqlx::query_as::<_, Resume>(&format!(
            r#"
            INSERT INTO resumes (user_id, title, template_id, photo_key)
            VALUES ($1, $2, $3, $4)
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(title)
        .bind(template_id)
        .bind(photo_key)
        .fetch_one(db)
        .await
        .context("insert resume")?;
        Ok(row)
    }

    pub async fn update_meta(
        db: &PgPool,
        id: Uuid,
        title: &str,
        template_id: Option<Uuid>,
    ) -> anyhow::Result<Resume> {
        let row = sqlx::query_as::<_, Resume>(&format!(
            r#"
            UPDATE resumes
               SET title = $2, template_id = $3, updated_at = now()
             WHERE id = $1
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(template_id)
        .fetch_one(db)
        .await
        .context("update resume")?;
        Ok(row)
    }

    pub async fn set_photo(db: &PgPool, id: Uuid, photo_key: Option<&str>) -> anyhow::Result<Resume> {
        let row = sqlx::query_as::<_, Resume>(&format!(
            r#"
            UPDATE resumes
               SET photo_key = $2, updated_at = now()
             WHERE id = $1
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(photo_key)
        .fetch_one(db)
        .await
        .context("set resume photo")?;
        Ok(row)
    }

    /// Sections cascade with the resume.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete resume")?;
        Ok(())
    }

    /// Clones share photo objects, so a key is only freed once nothing
    /// references it.
    pub async fn photo_in_use(db: &PgPool, photo_key: &str) -> anyhow::Result<bool> {
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM resumes WHERE photo_key = $1)")
                .bind(photo_key)
                .fetch_one(db)
                .await
                .context("check photo key usage")?;
        Ok(in_use)
    }

    pub async fn list_ids(db: &PgPool) -> anyhow::Result<Vec<Uuid>> {
        let ids = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM resumes ORDER BY created_at ASC")
            .fetch_all(db)
            .await
            .context("list resume ids")?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
