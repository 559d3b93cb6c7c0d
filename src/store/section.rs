//! Component B — Section Metadata.
//!
//! Single-document collection `{current_section: i64, sections: [i64]}`.
//! On first open, with no document present, the implementation must
//! bootstrap `current_section = 0` / `sections = [0]` in one write.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::SectionMetadataDoc;

#[async_trait]
pub trait SectionMetadataStore: Send + Sync {
    async fn get_current_section(&self) -> Result<i64>;

    /// Make `section` the current writable section, appending it to the
    /// ordered history.
    async fn set_current_section(&self, section: i64) -> Result<()>;

    async fn get_all_sections(&self) -> Result<Vec<i64>>;
}

/// In-memory reference implementation; bootstraps itself to
/// `{current_section: 0, sections: [0]}` on construction rather than
/// lazily on first read, since both describe the same observable state.
pub struct InMemorySectionMetadataStore {
    doc: RwLock<SectionMetadataDoc>,
}

impl Default for InMemorySectionMetadataStore {
    fn default() -> Self {
        Self {
            doc: RwLock::new(SectionMetadataDoc {
                current_section: 0,
                sections: vec![0],
            }),
        }
    }
}

impl InMemorySectionMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SectionMetadataStore for InMemorySectionMetadataStore {
    async fn get_current_section(&self) -> Result<i64> {
        let doc = self.doc.read().map_err(poisoned)?;
        Ok(doc.current_section)
    }

    async fn set_current_section(&self, section: i64) -> Result<()> {
        let mut doc = self.doc.write().map_err(poisoned)?;
        doc.current_section = section;
        doc.sections.push(section);
        Ok(())
    }

    async fn get_all_sections(&self) -> Result<Vec<i64>> {
        let doc = self.doc.read().map_err(poisoned)?;
        Ok(doc.sections.clone())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RegistryError {
    RegistryError::StoreFailure("section metadata lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstraps_to_section_zero() {
        let store = InMemorySectionMetadataStore::new();
        assert_eq!(store.get_current_section().await.unwrap(), 0);
        assert_eq!(store.get_all_sections().await.unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn set_current_section_appends_history() {
        let store = InMemorySectionMetadataStore::new();
        store.set_current_section(1).await.unwrap();
        store.set_current_section(2).await.unwrap();
        assert_eq!(store.get_current_section().await.unwrap(), 2);
        assert_eq!(store.get_all_sections().await.unwrap(), vec![0, 1, 2]);
    }
}
