//! Component G — Refresh Scheduler.
//!
//! A single background worker, owned for the service's lifetime, that
//! rebuilds and dual-signs every section's token at a fixed cadence and
//! publishes them atomically into the cache. Grounded on the teacher's
//! `run_retention_cleanup` background loop (`retention.rs`): a
//! `tokio::time::interval` tick loop, `tracing` on success/failure, and a
//! loop that never aborts on a single-item error.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{SectionMetadataStore, StatusStore};
use crate::token::{TokenBuilder, TokenBuildInput};

use crate::cache::TokenCache;

pub const DEFAULT_REFRESH_INTERVAL_SECONDS: i64 = 43_200;
/// Safety margin subtracted from the refresh interval to get token
/// validity, so a consumer never holds a token that outlives its own
/// replacement.
pub const VALIDITY_SAFETY_MARGIN_SECONDS: i64 = 300;

pub struct RefreshScheduler {
    status_store: Arc<dyn StatusStore>,
    section_metadata: Arc<dyn SectionMetadataStore>,
    token_builder: Arc<TokenBuilder>,
    cache: TokenCache,
    issuer: String,
    external_server_url: String,
    refresh_interval: Duration,
    token_validity_seconds: i64,
}

impl RefreshScheduler {
    pub fn new(
        status_store: Arc<dyn StatusStore>,
        section_metadata: Arc<dyn SectionMetadataStore>,
        token_builder: Arc<TokenBuilder>,
        cache: TokenCache,
        issuer: String,
        external_server_url: String,
        configured_refresh_interval_seconds: i64,
    ) -> Self {
        let refresh_interval_seconds = if configured_refresh_interval_seconds <= 0 {
            DEFAULT_REFRESH_INTERVAL_SECONDS
        } else {
            configured_refresh_interval_seconds
        };
        // Minimum enforced so token validity stays positive.
        let refresh_interval_seconds =
            if refresh_interval_seconds <= VALIDITY_SAFETY_MARGIN_SECONDS {
                DEFAULT_REFRESH_INTERVAL_SECONDS
            } else {
                refresh_interval_seconds
            };
        let token_validity_seconds = refresh_interval_seconds - VALIDITY_SAFETY_MARGIN_SECONDS;

        Self {
            status_store,
            section_metadata,
            token_builder,
            cache,
            issuer,
            external_server_url,
            refresh_interval: Duration::from_secs(refresh_interval_seconds as u64),
            token_validity_seconds,
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Run the background loop until `cancel` fires: an immediate pass,
    /// then one pass per tick. Yields to cancellation before each
    /// per-section snapshot, before each build, and after each publish.
    pub async fn start(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("refresh scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_pass(&cancel).await;
                }
            }
        }
    }

    /// One refresh pass: rebuild every known section and publish. Errors
    /// on a single section are logged and do not abort the pass.
    async fn run_pass(&self, cancel: &CancellationToken) {
        let sections = match self.section_metadata.get_all_sections().await {
            Ok(sections) => sections,
            Err(e) => {
                warn!(error = %e, "failed to list sections for refresh pass");
                return;
            }
        };

        for section in sections {
            if cancel.is_cancelled() {
                return;
            }
            if let Err(e) = self.rebuild_and_publish(section).await {
                warn!(section, error = %e, "refresh failed for section; previous cached token remains served");
            }
            if cancel.is_cancelled() {
                return;
            }
        }
    }

    /// Force a rebuild of one section outside the scheduled tick. Reuses
    /// the same snapshot/build/publish path as the scheduled pass, so it
    /// never contends with `run_pass` beyond what the store itself
    /// serializes.
    pub async fn invalidate_section(&self, section: i64) -> Result<()> {
        self.rebuild_and_publish(section).await
    }

    async fn rebuild_and_publish(&self, section: i64) -> Result<()> {
        let statuses = self.status_store.get_all_for_section(section).await?;
        let issued_at = chrono::Utc::now().timestamp();
        let aggregation_uri = format!("{}/statuslists/{}", self.external_server_url, section);

        let input = TokenBuildInput {
            section,
            issuer: &self.issuer,
            subject: &format!("status-list-{section}"),
            statuses: &statuses,
            ttl_seconds: self.token_validity_seconds,
            expires_in_seconds: self.token_validity_seconds,
            issued_at,
            key_id: None,
            aggregation_uri: Some(aggregation_uri),
            bits_per_status: None,
        };

        let built = self.token_builder.build(input)?;
        // JWT published before CWT so a concurrent reader never observes
        // a CWT newer than its JWT for the same build; `TokenCache::publish`
        // makes this moot by publishing both in one atomic insert, but the
        // argument order documents the intended precedence regardless.
        self.cache.publish(section, built.jwt, built.cwt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemorySectionMetadataStore, InMemoryStatusStore};
    use crate::test_support::test_signing_key;

    fn scheduler() -> (Arc<RefreshScheduler>, Arc<dyn StatusStore>) {
        let status: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        let section: Arc<dyn SectionMetadataStore> = Arc::new(InMemorySectionMetadataStore::new());
        let builder = Arc::new(TokenBuilder::new(test_signing_key()));
        let scheduler = Arc::new(RefreshScheduler::new(
            status.clone(),
            section,
            builder,
            TokenCache::new(),
            "https://issuer.example".to_string(),
            "https://example.com".to_string(),
            43_200,
        ));
        (scheduler, status)
    }

    #[tokio::test]
    async fn rebuild_and_publish_populates_cache() {
        let (scheduler, status) = scheduler();
        status.create_section(0, 10).await.unwrap();
        scheduler.rebuild_and_publish(0).await.unwrap();
        assert!(scheduler.cache().contains(0));
        assert!(scheduler.cache().get_jwt(0).is_some());
        assert!(scheduler.cache().get_cwt(0).is_some());
    }

    #[tokio::test]
    async fn invalidate_section_rebuilds_after_a_direct_store_write() {
        let (scheduler, status) = scheduler();
        status.create_section(0, 50).await.unwrap();
        scheduler.rebuild_and_publish(0).await.unwrap();

        status.update_status(0, 42, 1).await.unwrap();
        scheduler.invalidate_section(0).await.unwrap();

        let jwt = scheduler.cache().get_jwt(0).unwrap();
        let payload_b64 = jwt.split('.').nth(1).unwrap();
        let payload_bytes = crate::token::bits::base64url_decode(payload_b64).unwrap();
        let payload: crate::token::StatusListPayload = serde_json::from_slice(&payload_bytes).unwrap();
        let decoded = payload.status_list.decode(50).unwrap();
        assert_eq!(decoded[42], 1);
    }

    #[tokio::test]
    async fn refresh_interval_at_or_below_safety_margin_falls_back_to_default() {
        let status: Arc<dyn StatusStore> = Arc::new(InMemoryStatusStore::new());
        let section: Arc<dyn SectionMetadataStore> = Arc::new(InMemorySectionMetadataStore::new());
        let builder = Arc::new(TokenBuilder::new(test_signing_key()));
        let scheduler = RefreshScheduler::new(
            status,
            section,
            builder,
            TokenCache::new(),
            "https://issuer.example".to_string(),
            "https://example.com".to_string(),
            60,
        );
        assert!(scheduler.token_validity_seconds > 0);
        assert_eq!(
            scheduler.refresh_interval,
            Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECONDS as u64)
        );
    }
}
