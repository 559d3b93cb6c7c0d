//! Component E — Status Mutation Protocol.
//!
//! Converts one decoy slot into a real status, then perturbs the other
//! decoys drawn in the same sample with fresh random noise, so a snapshot
//! diff cannot tell which slot was just written from which slots merely
//! got a new random decoy value.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::model::MAX_RANDOM_STATUS;
use crate::store::{StatusStore, UpdateOutcome};

/// Number of decoys drawn per mutation; one becomes the real write, the
/// rest (zero to nine of them) get perturbed as noise.
pub const DECOY_SAMPLE_SIZE: usize = 10;

pub struct StatusMutationProtocol {
    status_store: Arc<dyn StatusStore>,
}

impl StatusMutationProtocol {
    pub fn new(status_store: Arc<dyn StatusStore>) -> Self {
        Self { status_store }
    }

    /// Write `status` into a random decoy slot of `section`, perturbing
    /// the other drawn decoys as noise. Returns the index that now holds
    /// the real status.
    pub async fn add(&self, section: i64, status: u8) -> Result<i64> {
        let decoys = self.status_store.sample_decoys(section, DECOY_SAMPLE_SIZE).await?;
        if decoys.is_empty() {
            return Err(RegistryError::SectionExhausted(section));
        }

        let victim_idx = rand::thread_rng().gen_range(0..decoys.len());
        let victim = decoys[victim_idx];
        self.status_store
            .promote_to_real(section, victim.index, status)
            .await?;

        for (i, decoy) in decoys.iter().enumerate() {
            if i == victim_idx {
                continue;
            }
            let noise = rand::thread_rng().gen_range(0..MAX_RANDOM_STATUS);
            self.status_store
                .update_status(section, decoy.index, noise)
                .await?;
        }

        debug!(section, index = victim.index, perturbed = decoys.len() - 1, "status mutation applied");
        Ok(victim.index)
    }

    /// Direct admin override, bypassing noise perturbation. The caller is
    /// responsible for invalidating the section's cached tokens afterward
    /// (see `RefreshScheduler::invalidate_section`).
    pub async fn update_status(&self, section: i64, index: i64, status: u8) -> Result<UpdateOutcome> {
        self.status_store.update_status(section, index, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStatusStore, StatusFilter};

    #[tokio::test]
    async fn add_creates_exactly_one_new_real_entry() {
        let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        store.create_section(0, 20).await.unwrap();
        let protocol = StatusMutationProtocol::new(store.clone());

        let before = store
            .count_where(StatusFilter {
                section: Some(0),
                decoy: Some(false),
            })
            .await
            .unwrap();
        let index = protocol.add(0, 1).await.unwrap();
        let after = store
            .count_where(StatusFilter {
                section: Some(0),
                decoy: Some(false),
            })
            .await
            .unwrap();

        assert_eq!(after - before, 1);
        let entry = store.find_one(0, index).await.unwrap().unwrap();
        assert_eq!(entry.status, 1);
        assert!(!entry.decoy);
    }

    #[tokio::test]
    async fn add_fails_with_section_exhausted_when_no_decoys_remain() {
        let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        store.create_section(0, 1).await.unwrap();
        let protocol = StatusMutationProtocol::new(store.clone());
        protocol.add(0, 0).await.unwrap();
        let result = protocol.add(0, 0).await;
        assert!(matches!(result, Err(RegistryError::SectionExhausted(0))));
    }

    #[tokio::test]
    async fn add_never_panics_with_exactly_one_decoy() {
        let store: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        store.create_section(0, 1).await.unwrap();
        let protocol = StatusMutationProtocol::new(store.clone());
        let index = protocol.add(0, 2).await.unwrap();
        assert_eq!(index, 0);
    }
}
