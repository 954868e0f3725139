//! Fixed-section reconciliation: every resume carries exactly one section of
//! each [`kinds::FIXED_SECTIONS`] type, with distinct `order` values.

pub mod form;
pub mod kinds;
#[cfg(test)]
pub mod memory;
pub mod reconcile;
pub mod repo_types;
pub mod store;

pub use form::{
    apply_submission, blank_rows, edit_rows, validate_submission, FormErrors, SectionRow,
    SectionRowInput,
};
pub use kinds::{SectionType, FIXED_SECTIONS};
pub use reconcile::{copy_sections, ensure_sections};
pub use repo_types::ResumeSection;
pub use store::{PgSectionStore, SectionStore};
