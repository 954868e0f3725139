use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::kinds::{SectionType, FIXED_SECTIONS, MAX_SECTION_ORDER};
use super::reconcile::ensure_sections;
use super::repo_types::{ResumeSection, SectionEdit};
use super::store::SectionStore;
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One editable section row as shown to the client, with its errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub id: Option<Uuid>,
    pub section_type: Option<String>,
    pub label: Option<&'static str>,
    pub content: String,
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// One posted section row. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SectionRowInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub section_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// Rejected submission: the posted rows echoed back with field errors, plus
/// errors that concern the batch as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub rows: Vec<SectionRow>,
    pub form_errors: Vec<String>,
}

impl FormErrors {
    pub fn error_count(&self) -> usize {
        self.form_errors.len() + self.rows.iter().map(|r| r.errors.len()).sum::<usize>()
    }
}

/// Five empty rows, one per fixed type in canonical order, for a resume that
/// does not exist yet.
pub fn blank_rows() -> Vec<SectionRow> {
    FIXED_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, kind)| SectionRow {
            id: None,
            section_type: Some(kind.as_str().to_string()),
            label: Some(kind.label()),
            content: String::new(),
            order: Some(i as i32),
            errors: Vec::new(),
        })
        .collect()
}

/// Rows for persisted sections, sorted by `order`.
pub fn edit_rows(sections: &[ResumeSection]) -> Vec<SectionRow> {
    let mut sorted: Vec<&ResumeSection> = sections.iter().collect();
    sorted.sort_by_key(|s| s.order);
    sorted
        .into_iter()
        .map(|s| SectionRow {
            id: Some(s.id),
            section_type: Some(s.section_type.clone()),
            label: s.kind().map(SectionType::label),
            content: s.content.clone(),
            order: Some(s.order),
            errors: Vec::new(),
        })
        .collect()
}

/// Validates a posted batch against the resume's persisted sections.
///
/// Persisted sections missing from the batch keep their order and type, so
/// the batch may not reuse either.
pub fn validate_submission(
    persisted: &[ResumeSection],
    submitted: &[SectionRowInput],
) -> Result<Vec<SectionEdit>, FormErrors> {
    let by_id: HashMap<Uuid, &ResumeSection> = persisted.iter().map(|s| (s.id, s)).collect();
    let mut rows = Vec::with_capacity(submitted.len());
    let mut edits = Vec::with_capacity(submitted.len());
    let mut form_errors = Vec::new();

    for input in submitted {
        let mut errors = Vec::new();
        let existing = input.id.and_then(|id| by_id.get(&id).copied());
        if input.id.is_some() && existing.is_none() {
            errors.push(FieldError::new("id", "Unknown section for this resume."));
        }

        let raw_type = input
            .section_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| existing.map(|s| s.section_type.as_str()));
        let kind = match raw_type {
            None => {
                errors.push(FieldError::new("section_type", "Section type is required."));
                None
            }
            Some(raw) => {
                let parsed = SectionType::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "section_type",
                        format!("Unknown section type '{}'.", raw),
                    ));
                }
                parsed
            }
        };

        let content = input.content.clone().unwrap_or_default();
        if content.trim().is_empty() && existing.is_some() {
            errors.push(FieldError::new(
                "content",
                "This field is required for existing sections.",
            ));
        }
        match input.order {
            None => errors.push(FieldError::new("order", "This field is required.")),
            Some(order) if !(0..=MAX_SECTION_ORDER).contains(&order) => {
                errors.push(FieldError::new(
                    "order",
                    format!("Order must be between 0 and {}.", MAX_SECTION_ORDER),
                ));
            }
            Some(_) => {}
        }

        if let (Some(kind), Some(order)) = (kind, input.order) {
            edits.push(SectionEdit {
                id: existing.map(|s| s.id),
                section_type: kind,
                content: content.clone(),
                order,
            });
        }
        rows.push(SectionRow {
            id: input.id,
            section_type: raw_type.map(str::to_string),
            label: kind.map(SectionType::label),
            content,
            order: input.order,
            errors,
        });
    }

    let mut seen_ids = HashSet::new();
    for id in submitted.iter().filter_map(|r| r.id) {
        if !seen_ids.insert(id) {
            form_errors.push("Each section may be submitted only once.".to_string());
            break;
        }
    }

    // persisted rows that the batch leaves untouched still hold their slots
    let untouched: Vec<&ResumeSection> = persisted
        .iter()
        .filter(|s| !seen_ids.contains(&s.id))
        .collect();

    let mut order_owners: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(order) = row.order {
            order_owners.entry(order).or_default().push(i);
        }
    }
    let mut order_clash = false;
    for (order, owners) in &order_owners {
        let held_elsewhere = untouched.iter().find(|s| s.order == *order);
        if owners.len() < 2 && held_elsewhere.is_none() {
            continue;
        }
        order_clash = true;
        for &i in owners {
            rows[i].errors.push(FieldError::new(
                "order",
                format!("Order {} is already used by another section.", order),
            ));
        }
    }
    if order_clash {
        form_errors.push("Section order values must be unique within a resume.".to_string());
    }

    let mut type_counts: HashMap<SectionType, usize> = HashMap::new();
    for edit in &edits {
        *type_counts.entry(edit.section_type).or_default() += 1;
    }
    for s in &untouched {
        if let Some(kind) = s.kind() {
            *type_counts.entry(kind).or_default() += 1;
        }
    }
    let mut repeated: Vec<SectionType> = type_counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(kind, _)| kind)
        .collect();
    repeated.sort();
    for kind in repeated {
        form_errors.push(format!("A resume can have only one {} section.", kind.label()));
    }

    let errors = FormErrors { rows, form_errors };
    if errors.error_count() > 0 {
        debug!(errors = errors.error_count(), "section submission rejected");
        return Err(errors);
    }
    Ok(edits)
}

/// Validates and atomically saves a batch for a persisted resume, then
/// recreates any fixed section the batch did not cover.
pub async fn apply_submission(
    store: &dyn SectionStore,
    resume_id: uuid::Uuid,
    submitted: &[SectionRowInput],
) -> Result<Vec<ResumeSection>, AppError> {
    let persisted = store.fetch(resume_id, None).await?;
    let edits = validate_submission(&persisted, submitted).map_err(|errors| {
        warn!(%resume_id, errors = errors.error_count(), "invalid section submission");
        AppError::Form(errors)
    })?;
    store.save_batch(resume_id, edits).await?;
    let (sections, _) = ensure_sections(store, resume_id).await?;
    Ok(sections)
}
