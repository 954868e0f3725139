use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};
use uuid::Uuid;

use super::kinds::{SectionType, FIXED_SECTIONS};
use super::repo_types::{NewSection, ResumeSection, SectionEdit};
use super::store::{SectionFilter, SectionStore};

/// Writes needed to bring fixed-type sections of one resume into shape.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Later rows of a type that already has a section.
    pub duplicates: Vec<Uuid>,
    pub create: Vec<NewSection>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.create.is_empty()
    }
}

/// What `ensure_sections` changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed_foreign: u64,
    pub removed_duplicates: u64,
    pub created: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.removed_foreign > 0 || self.removed_duplicates > 0 || self.created > 0
    }
}

/// Plans the repair of `existing`, which must hold only fixed-type rows sorted
/// by `order`.
///
/// The first row of each type wins; every missing type gets an order one past
/// the highest order in use, or its canonical index once that runs past the
/// fixed set. A candidate that is already taken moves above the maximum.
pub fn plan_reconciliation(existing: &[ResumeSection]) -> ReconcilePlan {
    let mut present: HashSet<SectionType> = HashSet::new();
    let mut used: BTreeSet<i32> = BTreeSet::new();
    let mut duplicates = Vec::new();

    for section in existing {
        let Some(kind) = section.kind() else { continue };
        if present.insert(kind) {
            used.insert(section.order);
        } else {
            duplicates.push(section.id);
        }
    }

    let limit = FIXED_SECTIONS.len() as i32;
    let mut next = above_max(&used);
    let mut create = Vec::new();
    for kind in FIXED_SECTIONS {
        if present.contains(&kind) {
            continue;
        }
        let preferred = if next < limit {
            next
        } else {
            kind.canonical_index() as i32
        };
        let order = if used.contains(&preferred) {
            above_max(&used)
        } else {
            preferred
        };
        used.insert(order);
        next = next.saturating_add(1);
        create.push(NewSection {
            section_type: kind,
            content: String::new(),
            order,
        });
    }

    ReconcilePlan { duplicates, create }
}

/// One past the highest order in use, or the lowest free non-negative order
/// when the maximum is already `i32::MAX`.
fn above_max(used: &BTreeSet<i32>) -> i32 {
    match used.last() {
        None => 0,
        Some(max) => max
            .checked_add(1)
            .unwrap_or_else(|| (0..i32::MAX).find(|o| !used.contains(o)).unwrap_or(0)),
    }
}

/// Makes sure a persisted resume has exactly one section per fixed type and
/// returns its sections sorted by `order`.
///
/// Idempotent: a second call on an unchanged resume performs no writes.
pub async fn ensure_sections(
    store: &dyn SectionStore,
    resume_id: Uuid,
) -> anyhow::Result<(Vec<ResumeSection>, ReconcileReport)> {
    let mut report = ReconcileReport {
        removed_foreign: store
            .delete_matching(resume_id, SectionFilter::NotOfTypes(&FIXED_SECTIONS))
            .await?,
        ..ReconcileReport::default()
    };

    let existing = store.fetch(resume_id, Some(&FIXED_SECTIONS)).await?;
    let plan = plan_reconciliation(&existing);
    if plan.is_empty() && report.removed_foreign == 0 {
        debug!(%resume_id, "sections already reconciled");
        return Ok((existing, report));
    }

    if !plan.duplicates.is_empty() {
        report.removed_duplicates = store
            .delete_matching(resume_id, SectionFilter::Ids(&plan.duplicates))
            .await?;
    }
    report.created = plan.create.len();
    for section in plan.create {
        store.create(resume_id, section).await?;
    }

    info!(
        %resume_id,
        removed_foreign = report.removed_foreign,
        removed_duplicates = report.removed_duplicates,
        created = report.created,
        "resume sections reconciled"
    );
    let sections = store.fetch(resume_id, Some(&FIXED_SECTIONS)).await?;
    Ok((sections, report))
}

/// Copies the fixed-type sections of `from` (type, content, order) onto `to`.
pub async fn copy_sections(
    store: &dyn SectionStore,
    from: Uuid,
    to: Uuid,
) -> anyhow::Result<Vec<ResumeSection>> {
    let source = store.fetch(from, Some(&FIXED_SECTIONS)).await?;
    let edits = source
        .into_iter()
        .filter_map(|s| {
            let kind = s.kind()?;
            Some(SectionEdit {
                id: None,
                section_type: kind,
                content: s.content,
                order: s.order,
            })
        })
        .collect();
    store.save_batch(to, edits).await
}
