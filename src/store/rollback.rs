//! Optimistic mutation with explicit compensation.
//!
//! Each optimistic apply returns the [`Compensation`] that undoes it
//! exactly. The store holds the compensation across the confirming network
//! call and applies it on failure — one code path for every rollback, no
//! ad hoc snapshot variables.

use crate::types::DomainRecord;

/// The captured undo for one optimistic mutation.
#[derive(Debug, Clone)]
pub enum Compensation<R> {
    /// Undo an optimistic create: remove the provisional record.
    RemoveInserted { id: String },
    /// Undo an optimistic update: restore the captured pre-mutation record.
    Restore { before: R },
    /// Undo an optimistic delete: re-insert the captured record where it was.
    Reinsert { record: R, index: usize },
}

impl<R: DomainRecord> Compensation<R> {
    /// Apply the compensation to `records`, restoring the pre-mutation list.
    pub fn apply(self, records: &mut Vec<R>) {
        match self {
            Self::RemoveInserted { id } => {
                records.retain(|r| r.id() != id);
            }
            Self::Restore { before } => {
                if let Some(slot) = records.iter_mut().find(|r| r.id() == before.id()) {
                    *slot = before;
                }
            }
            Self::Reinsert { record, index } => {
                let index = index.min(records.len());
                records.insert(index, record);
            }
        }
    }

    /// The record id the compensation targets.
    pub fn record_id(&self) -> &str {
        match self {
            Self::RemoveInserted { id } => id,
            Self::Restore { before } => before.id(),
            Self::Reinsert { record, .. } => record.id(),
        }
    }
}

/// Optimistic create: insert `provisional` and capture its removal.
pub fn insert_provisional<R: DomainRecord>(records: &mut Vec<R>, provisional: R) -> Compensation<R> {
    let id = provisional.id().to_string();
    records.push(provisional);
    Compensation::RemoveInserted { id }
}

/// Optimistic update: capture the record, apply `mutate` in place.
///
/// Returns `None` (and leaves `records` untouched) when `id` is unknown.
pub fn patch_record<R: DomainRecord>(
    records: &mut [R],
    id: &str,
    mutate: impl FnOnce(&mut R),
) -> Option<Compensation<R>> {
    let slot = records.iter_mut().find(|r| r.id() == id)?;
    let before = slot.clone();
    mutate(slot);
    Some(Compensation::Restore { before })
}

/// Optimistic delete: remove the record and capture its re-insertion.
///
/// Returns `None` (and leaves `records` untouched) when `id` is unknown.
pub fn remove_record<R: DomainRecord>(records: &mut Vec<R>, id: &str) -> Option<Compensation<R>> {
    let index = records.iter().position(|r| r.id() == id)?;
    let record = records.remove(index);
    Some(Compensation::Reinsert { record, index })
}
