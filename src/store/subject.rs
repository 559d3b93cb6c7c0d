//! Component C — Credential-Subject Index (optional).
//!
//! Collection shape: `{first_name, last_name, date_of_birth, section,
//! index}` with a non-unique index on `(last_name, first_name,
//! date_of_birth)` for search, and a unique index on `(section, index)`
//! so at most one person maps to a given status slot.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::CredentialSubject;

#[async_trait]
pub trait SubjectIndex: Send + Sync {
    /// Each non-empty name field matches case-insensitively as a
    /// substring; `date_of_birth`, if given, matches exactly. Empty/`None`
    /// fields are ignored. Returns every match, unbounded.
    async fn search(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        date_of_birth: Option<&str>,
    ) -> Result<Vec<CredentialSubject>>;

    async fn add(&self, record: CredentialSubject) -> Result<()>;
}

#[derive(Default)]
pub struct InMemorySubjectIndex {
    records: RwLock<Vec<CredentialSubject>>,
}

impl InMemorySubjectIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubjectIndex for InMemorySubjectIndex {
    async fn search(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        date_of_birth: Option<&str>,
    ) -> Result<Vec<CredentialSubject>> {
        let records = self.records.read().map_err(poisoned)?;
        let matches = records
            .iter()
            .filter(|r| match first_name {
                Some(f) if !f.is_empty() => r.first_name.to_lowercase().contains(&f.to_lowercase()),
                _ => true,
            })
            .filter(|r| match last_name {
                Some(l) if !l.is_empty() => r.last_name.to_lowercase().contains(&l.to_lowercase()),
                _ => true,
            })
            .filter(|r| match date_of_birth {
                Some(d) if !d.is_empty() => r.date_of_birth == d,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn add(&self, record: CredentialSubject) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records
            .iter()
            .any(|r| r.section == record.section && r.index == record.index)
        {
            return Err(RegistryError::StoreFailure(format!(
                "subject already indexed at section={} index={}",
                record.section, record.index
            )));
        }
        records.push(record);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RegistryError {
    RegistryError::StoreFailure("subject index lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(first: &str, last: &str, dob: &str, section: i64, index: i64) -> CredentialSubject {
        CredentialSubject {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: dob.to_string(),
            section,
            index,
        }
    }

    #[tokio::test]
    async fn search_matches_case_insensitive_substring() {
        let index = InMemorySubjectIndex::new();
        index
            .add(subject("Alice", "Anderson", "1990-01-01", 0, 0))
            .await
            .unwrap();
        let results = index.search(Some("ali"), None, None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn search_with_all_empty_fields_returns_everything() {
        let index = InMemorySubjectIndex::new();
        index
            .add(subject("Alice", "Anderson", "1990-01-01", 0, 0))
            .await
            .unwrap();
        index
            .add(subject("Bob", "Baker", "1991-02-02", 0, 1))
            .await
            .unwrap();
        let results = index.search(None, None, None).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_slot() {
        let index = InMemorySubjectIndex::new();
        index
            .add(subject("Alice", "Anderson", "1990-01-01", 0, 0))
            .await
            .unwrap();
        let dup = subject("Someone", "Else", "2000-01-01", 0, 0);
        assert!(index.add(dup).await.is_err());
    }
}
