use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::profiles::repo_types::Profile;

impl Profile {
    /// Returns the user's profile, creating an empty one when missing.
    pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, bio, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("get or create profile")?;
        Ok(profile)
    }

    pub async fn update_bio(
        db: &PgPool,
        user_id: Uuid,
        bio: Option<&str>,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, bio)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET bio = EXCLUDED.bio, updated_at = now()
            RETURNING user_id, bio, updated_at
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .fetch_one(db)
        .await
        .context("update profile")?;
        Ok(profile)
    }
}
