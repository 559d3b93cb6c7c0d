//! Component D — Section Lifecycle Manager.
//!
//! Reserves a privacy budget: writes only ever land in a section whose
//! decoy pool is still crowded, so a before/after snapshot diff cannot
//! trivially identify the index that was just written.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::store::{SectionMetadataStore, StatusFilter, StatusStore};

/// Below this many remaining decoys, a section is considered depleted and
/// a successor is seeded.
pub const DEPLETION_THRESHOLD: i64 = 1000;

/// Default section capacity when the caller does not override it.
pub const DEFAULT_SECTION_SIZE: i64 = 500_000;

pub struct SectionLifecycleManager {
    status_store: Arc<dyn StatusStore>,
    section_metadata: Arc<dyn SectionMetadataStore>,
    /// Clamped to be at least `DEPLETION_THRESHOLD + 1` so a freshly
    /// created section is never immediately depleted.
    section_size: i64,
}

impl SectionLifecycleManager {
    pub fn new(
        status_store: Arc<dyn StatusStore>,
        section_metadata: Arc<dyn SectionMetadataStore>,
        configured_section_size: i64,
    ) -> Self {
        let section_size = if configured_section_size <= 0 {
            DEFAULT_SECTION_SIZE
        } else {
            configured_section_size.max(DEPLETION_THRESHOLD + 1)
        };
        Self {
            status_store,
            section_metadata,
            section_size,
        }
    }

    /// Ensure the current section still has room for a privacy-preserving
    /// write, seeding and advancing to a new section if not. Returns the
    /// section a caller should write into.
    pub async fn ensure_room_for_write(&self) -> Result<i64> {
        let current = self.section_metadata.get_current_section().await?;
        let remaining_decoys = self
            .status_store
            .count_where(StatusFilter {
                section: Some(current),
                decoy: Some(true),
            })
            .await?;

        if remaining_decoys > DEPLETION_THRESHOLD {
            return Ok(current);
        }

        let next = current + 1;
        info!(
            from = current,
            to = next,
            remaining_decoys,
            "section depleted, rolling over"
        );
        self.status_store.create_section(next, self.section_size).await?;
        self.section_metadata.set_current_section(next).await?;
        Ok(next)
    }
}
