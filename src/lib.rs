//! Token status list registry core.
//!
//! A sectioned, decoy-padded status store behind dual JWT/CWT token
//! publishing, following draft-ietf-oauth-status-list. This crate owns the
//! storage seams, the decoy-write protocol, the section lifecycle, token
//! encoding/signing, the background refresh loop, and the read/admin
//! surfaces an HTTP layer binds to. It does not itself listen on a socket
//! (§1 Non-goals) — that, along with config loading and the admin GUI's
//! HTML/session handling, is left to the binary that embeds it.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod mutation;
pub mod refresh;
pub mod serving;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use admin::AdminOperations;
pub use cache::TokenCache;
pub use config::RegistrySettings;
pub use error::{RegistryError, Result};
pub use lifecycle::SectionLifecycleManager;
pub use mutation::StatusMutationProtocol;
pub use refresh::RefreshScheduler;
pub use serving::ServingSurface;
pub use store::{SectionMetadataStore, StatusStore, SubjectIndex};
pub use token::{SigningKey, TokenBuilder};

/// Wires every component together over one set of store handles. Built once
/// at startup and shared (via `Arc`, internally) across request handlers and
/// the refresh background task.
pub struct Registry {
    pub lifecycle: SectionLifecycleManager,
    pub mutation: Arc<StatusMutationProtocol>,
    pub refresh: Arc<RefreshScheduler>,
    pub serving: ServingSurface,
    pub admin: AdminOperations,
}

impl Registry {
    /// Assembles a registry from store handles, a loaded signing key, and
    /// the effective settings. Does not start the refresh background task —
    /// call [`Registry::spawn_refresh`] once a runtime is available.
    pub fn new(
        status_store: Arc<dyn StatusStore>,
        section_metadata: Arc<dyn SectionMetadataStore>,
        subject_index: Arc<dyn SubjectIndex>,
        signing_key: SigningKey,
        settings: &RegistrySettings,
        issuer: String,
    ) -> Self {
        let cache = TokenCache::new();
        let token_builder = Arc::new(TokenBuilder::new(signing_key));

        let lifecycle = SectionLifecycleManager::new(
            status_store.clone(),
            section_metadata.clone(),
            settings.effective_section_size(),
        );
        let mutation = Arc::new(StatusMutationProtocol::new(status_store.clone()));
        let refresh = Arc::new(RefreshScheduler::new(
            status_store.clone(),
            section_metadata,
            token_builder,
            cache.clone(),
            issuer,
            settings.external_server_url.clone(),
            settings.effective_refresh_interval_seconds(),
        ));
        let serving = ServingSurface::new(cache);
        let admin = AdminOperations::new(subject_index, status_store, mutation.clone(), refresh.clone());

        Self {
            lifecycle,
            mutation,
            refresh,
            serving,
            admin,
        }
    }

    /// Write a new status for a credential via the decoy-promotion path
    /// (component E), rolling the section over first if it has run low on
    /// decoy cover (component D), then invalidating the cache so the next
    /// served token reflects the write (component G).
    pub async fn submit_status(&self, status: u8) -> Result<(i64, i64)> {
        let section = self.lifecycle.ensure_room_for_write().await?;
        let index = self.mutation.add(section, status).await?;
        self.refresh.invalidate_section(section).await?;
        Ok((section, index))
    }

    /// Spawn the refresh background task on the current runtime. The
    /// returned token cancels it; dropping the token without cancelling
    /// leaves the task running until the runtime shuts down.
    pub fn spawn_refresh(&self) -> CancellationToken {
        let cancel = CancellationToken::new();
        let scheduler = self.refresh.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            scheduler.start(task_cancel).await;
        });
        cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemorySectionMetadataStore, InMemoryStatusStore, InMemorySubjectIndex};
    use crate::test_support::test_signing_key;

    #[tokio::test]
    async fn submit_status_writes_and_publishes_a_refreshed_token() {
        let status: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        let section: Arc<dyn SectionMetadataStore> = Arc::new(InMemorySectionMetadataStore::new());
        let subjects: Arc<dyn SubjectIndex> = Arc::new(InMemorySubjectIndex::new());
        // Comfortably above DEPLETION_THRESHOLD so the write lands in
        // section 0 instead of immediately triggering a rollover.
        status.create_section(0, 1500).await.unwrap();

        let registry = Registry::new(
            status,
            section,
            subjects,
            test_signing_key(),
            &RegistrySettings::default(),
            "https://issuer.example".to_string(),
        );

        let (written_section, index) = registry.submit_status(1).await.unwrap();
        assert_eq!(written_section, 0);
        assert!(registry.serving.get_cached_jwt(written_section).is_some());

        let results = registry.admin.search_person(None, None, None).await.unwrap();
        assert!(results.is_empty());
        let _ = index;
    }
}
