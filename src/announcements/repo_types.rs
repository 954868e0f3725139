use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_by: Option<Uuid>, // NULL once the author is deleted
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Announcement {
    /// Only staff may edit, and only what they wrote.
    pub fn editable_by(&self, user_id: Uuid, is_staff: bool) -> bool {
        is_staff && self.created_by == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_staff_author_can_edit() {
        let author = Uuid::new_v4();
        let a = Announcement {
            id: Uuid::new_v4(),
            title: "Maintenance".into(),
            content: "Sunday 02:00 UTC".into(),
            is_active: true,
            created_by: Some(author),
            created_at: OffsetDateTime::now_utc(),
        };
        assert!(a.editable_by(author, true));
        assert!(!a.editable_by(author, false));
        assert!(!a.editable_by(Uuid::new_v4(), true));
    }
}
