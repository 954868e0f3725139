use serde::Deserialize;

use crate::errors::AppError;

pub const MAX_ANNOUNCEMENT_TITLE_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub struct AnnouncementRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}
fn active_by_default() -> bool { true }

impl AnnouncementRequest {
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        if self.title.chars().count() > MAX_ANNOUNCEMENT_TITLE_LEN {
            return Err(AppError::Validation(format!(
                "Title must be at most {MAX_ANNOUNCEMENT_TITLE_LEN} characters"
            )));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::Validation("Content is required".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_active_and_validates() {
        let req: AnnouncementRequest =
            serde_json::from_str(r#"{"title":"  New templates  ","content":"Two more."}"#).unwrap();
        assert!(req.is_active);
        assert_eq!(req.validate().unwrap().title, "New templates");

        let long: AnnouncementRequest = serde_json::from_value(serde_json::json!({
            "title": "x".repeat(201),
            "content": "body",
        }))
        .unwrap();
        assert!(matches!(long.validate(), Err(AppError::Validation(_))));
    }
}
