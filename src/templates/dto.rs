use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const TEMPLATES_PER_PAGE: i64 = 6;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}
fn first_page() -> i64 { 1 }

impl PageQuery {
    /// Pages start at 1; anything lower is treated as the first page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(TEMPLATES_PER_PAGE)
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplatePage {
    pub templates: Vec<TemplateSummary>,
    pub page: i64,
    pub has_next: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateDetails {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub html_template: String,
    pub preview_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Splits a one-row over-fetch into the visible page and a `has_next` flag.
pub fn split_page<T>(mut rows: Vec<T>) -> (Vec<T>, bool) {
    let has_next = rows.len() as i64 > TEMPLATES_PER_PAGE;
    rows.truncate(TEMPLATES_PER_PAGE as usize);
    (rows, has_next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_clamps_to_first_page() {
        assert_eq!(PageQuery { page: 0 }.offset(), 0);
        assert_eq!(PageQuery { page: 1 }.offset(), 0);
        assert_eq!(PageQuery { page: 3 }.offset(), 12);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        assert_eq!(PageQuery { page: i64::MAX }.offset(), i64::MAX);
        assert!(PageQuery { page: i64::MIN }.offset() == 0);
    }

    #[test]
    fn split_page_detects_next_page() {
        let (rows, has_next) = split_page((0..7).collect::<Vec<_>>());
        assert_eq!(rows.len(), 6);
        assert!(has_next);

        let (rows, has_next) = split_page((0..6).collect::<Vec<_>>());
        assert_eq!(rows.len(), 6);
        assert!(!has_next);
    }
}
