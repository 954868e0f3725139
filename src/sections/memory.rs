use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::kinds::SectionType;
use super::repo_types::{NewSection, ResumeSection, SectionEdit};
use super::store::{SectionFilter, SectionStore};

/// In-memory [`SectionStore`] with the same ordering and atomicity rules as
/// the Postgres one.
#[derive(Default)]
pub struct MemorySectionStore {
    rows: Mutex<Vec<ResumeSection>>,
    writes: Mutex<usize>,
}

impl MemorySectionStore {
    /// Seeds a row as-is, bypassing every check.
    pub fn insert_raw(&self, section: ResumeSection) {
        self.rows.lock().unwrap().push(section);
    }

    /// Number of rows written so far.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn bump(&self, n: usize) {
        *self.writes.lock().unwrap() += n;
    }
}

#[async_trait]
impl SectionStore for MemorySectionStore {
    async fn fetch(
        &self,
        resume_id: Uuid,
        types: Option<&[SectionType]>,
    ) -> anyhow::Result<Vec<ResumeSection>> {
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<ResumeSection> = rows
            .iter()
            .filter(|s| s.resume_id == resume_id)
            .filter(|s| match types {
                Some(types) => s.kind().map_or(false, |k| types.contains(&k)),
                None => true,
            })
            .cloned()
            .collect();
        // stable: insertion order breaks ties like created_at does
        out.sort_by_key(|s| s.order);
        Ok(out)
    }

    async fn create(&self, resume_id: Uuid, section: NewSection) -> anyhow::Result<ResumeSection> {
        let row = ResumeSection {
            id: Uuid::new_v4(),
            resume_id,
            section_type: section.section_type.as_str().to_string(),
            content: section.content,
            order: section.order,
        };
        self.rows.lock().unwrap().push(row.clone());
        self.bump(1);
        Ok(row)
    }

    async fn delete_matching(
        &self,
        resume_id: Uuid,
        filter: SectionFilter<'_>,
    ) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| {
            if s.resume_id != resume_id {
                return true;
            }
            match filter {
                SectionFilter::NotOfTypes(types) => s.kind().map_or(false, |k| types.contains(&k)),
                SectionFilter::Ids(ids) => !ids.contains(&s.id),
            }
        });
        let removed = before - rows.len();
        drop(rows);
        self.bump(removed);
        Ok(removed as u64)
    }

    async fn save_batch(
        &self,
        resume_id: Uuid,
        edits: Vec<SectionEdit>,
    ) -> anyhow::Result<Vec<ResumeSection>> {
        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();
        let mut touched = HashSet::new();

        for edit in &edits {
            match edit.id {
                Some(id) => {
                    let row = staged
                        .iter_mut()
                        .find(|s| s.id == id && s.resume_id == resume_id)
                        .ok_or_else(|| {
                            anyhow::anyhow!("section {} does not belong to resume {}", id, resume_id)
                        })?;
                    row.section_type = edit.section_type.as_str().to_string();
                    row.content = edit.content.clone();
                    row.order = edit.order;
                    touched.insert(id);
                }
                None => {
                    let id = Uuid::new_v4();
                    staged.push(ResumeSection {
                        id,
                        resume_id,
                        section_type: edit.section_type.as_str().to_string(),
                        content: edit.content.clone(),
                        order: edit.order,
                    });
                    touched.insert(id);
                }
            }
        }

        // mirrors the deferred unique (resume_id, sort_order) constraint
        let mut orders = BTreeSet::new();
        for s in staged.iter().filter(|s| s.resume_id == resume_id) {
            anyhow::ensure!(
                orders.insert(s.order),
                "duplicate sort_order {} for resume {}",
                s.order,
                resume_id
            );
        }

        *rows = staged;
        let mut saved: Vec<ResumeSection> = rows
            .iter()
            .filter(|s| touched.contains(&s.id))
            .cloned()
            .collect();
        drop(rows);
        self.bump(saved.len());
        saved.sort_by_key(|s| s.order);
        Ok(saved)
    }
}
