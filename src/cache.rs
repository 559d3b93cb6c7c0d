//! The in-memory token cache the refresh scheduler (component G) writes
//! to and the serving surface (component H) reads from.
//!
//! Backed by `dashmap::DashMap`, which gives many concurrent lock-free
//! readers and non-blocking per-key replacement by the writer — the
//! shape §5's "Shared-resource policy" calls for. JWT and CWT for one
//! section are stored together in a single value, so publishing both at
//! once is a single `DashMap::insert` and a reader can never observe a
//! CWT that is newer than its paired JWT.

use std::sync::Arc;

use dashmap::DashMap;

/// One section's cached token pair.
#[derive(Clone)]
pub struct CachedSection {
    pub jwt: String,
    pub cwt: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct TokenCache {
    sections: Arc<DashMap<i64, CachedSection>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish both forms for `section` atomically.
    pub fn publish(&self, section: i64, jwt: String, cwt: Vec<u8>) {
        self.sections.insert(section, CachedSection { jwt, cwt });
    }

    pub fn get_jwt(&self, section: i64) -> Option<String> {
        self.sections.get(&section).map(|entry| entry.jwt.clone())
    }

    pub fn get_cwt(&self, section: i64) -> Option<Vec<u8>> {
        self.sections.get(&section).map(|entry| entry.cwt.clone())
    }

    pub fn contains(&self, section: i64) -> bool {
        self.sections.contains_key(&section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_read_back_both_forms() {
        let cache = TokenCache::new();
        cache.publish(0, "jwt-token".to_string(), vec![1, 2, 3]);
        assert_eq!(cache.get_jwt(0), Some("jwt-token".to_string()));
        assert_eq!(cache.get_cwt(0), Some(vec![1, 2, 3]));
    }

    #[test]
    fn never_built_section_is_empty() {
        let cache = TokenCache::new();
        assert_eq!(cache.get_cwt(999), None);
        assert_eq!(cache.get_jwt(999), None);
        assert!(!cache.contains(999));
    }
}
