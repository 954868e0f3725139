use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::announcements::{dto::AnnouncementRequest, repo_types::Announcement};

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, is_active, created_by, created_at";

impl Announcement {
    /// Active announcements, newest first.
    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            SELECT {ANNOUNCEMENT_COLUMNS}
              FROM announcements
             WHERE is_active
             ORDER BY created_at DESC
            "#
        ))
        .fetch_all(db)
        .await
        .context("list announcements")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find announcement")?;
        Ok(row)
    }

    pub async fn create(
        db: &PgPool,
        created_by: Uuid,
        req: &AnnouncementRequest,
    ) -> anyhow::Result<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            INSERT INTO announcements (title, content, is_active, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.is_active)
        .bind(created_by)
        .fetch_one(db)
        .await
        .context("insert announcement")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        req: &AnnouncementRequest,
    ) -> anyhow::Result<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            UPDATE announcements
               SET title = $2, content = $3, is_active = $4
             WHERE id = $1
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.is_active)
        .fetch_one(db)
        .await
        .context("update announcement")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete announcement")?;
        Ok(())
    }
}
