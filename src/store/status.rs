//! Component A — Status Store.
//!
//! Collection shape for a document-store-backed implementation:
//! `{index: i64, status: u8, decoy: bool, section: i64}` with a unique
//! compound index on `(index, section)`. The in-memory implementation
//! below enforces the same uniqueness invariant and approximates the
//! native `$sample` aggregation stage with reservoir sampling, per the
//! persistence note in the design notes.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rand::Rng;

use crate::error::{RegistryError, Result};
use crate::model::{StatusEntry, MAX_RANDOM_STATUS};

/// Filter accepted by [`StatusStore::count_where`]. `None` fields are
/// unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFilter {
    pub section: Option<i64>,
    pub decoy: Option<bool>,
}

/// Outcome of [`StatusStore::update_status`]: the spec requires this to
/// "succeed and report no match" rather than error when the row is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NoMatch,
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn count_where(&self, filter: StatusFilter) -> Result<i64>;

    /// Insert `size` decoy rows with indices `0..size`, each with a
    /// uniformly random initial status in `[0, MAX_RANDOM_STATUS)`. Fails
    /// if any row for this section already exists.
    async fn create_section(&self, section: i64, size: i64) -> Result<()>;

    async fn find_one(&self, section: i64, index: i64) -> Result<Option<StatusEntry>>;

    /// Draw up to `n` rows where `decoy == true`, without replacement
    /// within this one draw, via reservoir sampling.
    async fn sample_decoys(&self, section: i64, n: usize) -> Result<Vec<StatusEntry>>;

    /// Promote exactly one decoy to a real status entry. Used by the
    /// mutation protocol's victim step; distinct from [`update_status`]
    /// because it also flips `decoy` to `false`.
    ///
    /// [`update_status`]: StatusStore::update_status
    async fn promote_to_real(&self, section: i64, index: i64, status: u8) -> Result<()>;

    /// Overwrite `status` in place; `decoy` is left untouched. Used both
    /// by decoy-noise perturbation and by admin overrides. Succeeds with
    /// [`UpdateOutcome::NoMatch`] rather than erroring when the row is
    /// absent.
    async fn update_status(&self, section: i64, index: i64, status: u8) -> Result<UpdateOutcome>;

    /// The full status vector for `section`, ordered by index ascending.
    async fn get_all_for_section(&self, section: i64) -> Result<Vec<u8>>;
}

/// In-memory reference `StatusStore`. Rows are keyed `(section, index)` in
/// a `BTreeMap` so range reads come back index-ordered for free; a single
/// `RwLock` guards the whole map, mirroring the teacher's
/// `Arc<RwLock<ClusterState>>` (`metadata.rs`) — single-row mutations hold
/// the write lock only for the duration of that one mutation.
#[derive(Default)]
pub struct InMemoryStatusStore {
    rows: RwLock<BTreeMap<(i64, i64), StatusEntry>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn random_status() -> u8 {
        rand::thread_rng().gen_range(0..MAX_RANDOM_STATUS)
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn count_where(&self, filter: StatusFilter) -> Result<i64> {
        let rows = self.rows.read().map_err(poisoned)?;
        let count = rows
            .values()
            .filter(|e| filter.section.map_or(true, |s| e.section == s))
            .filter(|e| filter.decoy.map_or(true, |d| e.decoy == d))
            .count();
        Ok(count as i64)
    }

    async fn create_section(&self, section: i64, size: i64) -> Result<()> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.keys().any(|(s, _)| *s == section) {
            return Err(RegistryError::StoreFailure(format!(
                "section {section} already has rows"
            )));
        }
        for index in 0..size {
            rows.insert(
                (section, index),
                StatusEntry {
                    section,
                    index,
                    status: Self::random_status(),
                    decoy: true,
                },
            );
        }
        Ok(())
    }

    async fn find_one(&self, section: i64, index: i64) -> Result<Option<StatusEntry>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&(section, index)).copied())
    }

    async fn sample_decoys(&self, section: i64, n: usize) -> Result<Vec<StatusEntry>> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut rng = rand::thread_rng();
        let mut reservoir: Vec<StatusEntry> = Vec::with_capacity(n);
        let mut seen = 0usize;
        for ((s, _), entry) in rows.range((section, 0)..(section + 1, 0)) {
            debug_assert_eq!(*s, section);
            if !entry.decoy {
                continue;
            }
            seen += 1;
            if reservoir.len() < n {
                reservoir.push(*entry);
            } else {
                let j = rng.gen_range(0..seen);
                if j < n {
                    reservoir[j] = *entry;
                }
            }
        }
        Ok(reservoir)
    }

    async fn promote_to_real(&self, section: i64, index: i64, status: u8) -> Result<()> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        match rows.get_mut(&(section, index)) {
            Some(entry) => {
                entry.status = status;
                entry.decoy = false;
                Ok(())
            }
            None => Err(RegistryError::StoreFailure(format!(
                "no row at section={section} index={index}"
            ))),
        }
    }

    async fn update_status(&self, section: i64, index: i64, status: u8) -> Result<UpdateOutcome> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        match rows.get_mut(&(section, index)) {
            Some(entry) => {
                entry.status = status;
                Ok(UpdateOutcome::Updated)
            }
            None => Ok(UpdateOutcome::NoMatch),
        }
    }

    async fn get_all_for_section(&self, section: i64) -> Result<Vec<u8>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .range((section, 0)..(section + 1, 0))
            .map(|(_, entry)| entry.status)
            .collect())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RegistryError {
    RegistryError::StoreFailure("status store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_section_seeds_decoys_with_contiguous_indices() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 5).await.unwrap();
        let all = store.get_all_for_section(0).await.unwrap();
        assert_eq!(all.len(), 5);
        let decoys = store
            .count_where(StatusFilter {
                section: Some(0),
                decoy: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(decoys, 5);
    }

    #[tokio::test]
    async fn create_section_rejects_duplicate() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 2).await.unwrap();
        assert!(store.create_section(0, 2).await.is_err());
    }

    #[tokio::test]
    async fn sample_decoys_caps_at_available_count() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 3).await.unwrap();
        let sampled = store.sample_decoys(0, 10).await.unwrap();
        assert_eq!(sampled.len(), 3);
    }

    #[tokio::test]
    async fn promote_to_real_flips_decoy_flag() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 2).await.unwrap();
        store.promote_to_real(0, 1, 2).await.unwrap();
        let entry = store.find_one(0, 1).await.unwrap().unwrap();
        assert_eq!(entry.status, 2);
        assert!(!entry.decoy);
        let decoys = store
            .count_where(StatusFilter {
                section: Some(0),
                decoy: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(decoys, 1);
    }

    #[tokio::test]
    async fn update_status_on_missing_row_is_not_an_error() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 1).await.unwrap();
        let outcome = store.update_status(0, 99, 1).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::NoMatch);
    }

    #[tokio::test]
    async fn update_status_is_idempotent() {
        let store = InMemoryStatusStore::new();
        store.create_section(0, 1).await.unwrap();
        store.update_status(0, 0, 1).await.unwrap();
        let first = store.find_one(0, 0).await.unwrap().unwrap();
        store.update_status(0, 0, 1).await.unwrap();
        let second = store.find_one(0, 0).await.unwrap().unwrap();
        assert_eq!(first, second);
    }
}
