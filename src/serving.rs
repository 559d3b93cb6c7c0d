//! Component H — Serving Surface. Read-side operations an HTTP
//! collaborator binds to; no router lives in this crate (§1 Non-goals).

use crate::cache::TokenCache;
use crate::error::{RegistryError, Result};

/// `application/statuslist+jwt` is the default; only an exact `Accept`
/// match selects the CWT media type.
pub const MEDIA_TYPE_JWT: &str = "application/statuslist+jwt";
pub const MEDIA_TYPE_CWT: &str = "application/statuslist+cwt";

pub struct ServingSurface {
    cache: TokenCache,
}

impl ServingSurface {
    pub fn new(cache: TokenCache) -> Self {
        Self { cache }
    }

    pub fn get_cached_jwt(&self, section: i64) -> Option<String> {
        self.cache.get_jwt(section)
    }

    pub fn get_cached_cwt(&self, section: i64) -> Option<Vec<u8>> {
        self.cache.get_cwt(section)
    }

    /// Ordered so relying parties can pre-fetch every section's token.
    pub fn list_section_uris(&self, base_url: &str, sections: &[i64]) -> Vec<String> {
        sections
            .iter()
            .map(|s| format!("{base_url}/statuslists/{s}"))
            .collect()
    }

    /// `time`, if present, unconditionally rejects the request — the
    /// registry only ever serves the current token for a section, never a
    /// historical version. A `time` that does not parse as an integer is
    /// reported distinctly as [`RegistryError::InvalidTimeParameter`].
    pub fn status_lists_request(
        &self,
        section: i64,
        accept: &str,
        time: Option<&str>,
    ) -> Result<(Vec<u8>, &'static str)> {
        if let Some(raw) = time {
            if raw.trim().parse::<i128>().is_err() {
                return Err(RegistryError::InvalidTimeParameter(raw.to_string()));
            }
            return Err(RegistryError::HistoricalResolutionNotSupported);
        }

        if accept == MEDIA_TYPE_CWT {
            let cwt = self
                .cache
                .get_cwt(section)
                .filter(|bytes| !bytes.is_empty())
                .ok_or(RegistryError::SectionNotFound(section))?;
            return Ok((cwt, MEDIA_TYPE_CWT));
        }

        let jwt = self
            .cache
            .get_jwt(section)
            .filter(|s| !s.is_empty())
            .ok_or(RegistryError::SectionNotFound(section))?;
        Ok((jwt.into_bytes(), MEDIA_TYPE_JWT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_with(section: i64, jwt: &str, cwt: &[u8]) -> ServingSurface {
        let cache = TokenCache::new();
        cache.publish(section, jwt.to_string(), cwt.to_vec());
        ServingSurface::new(cache)
    }

    #[test]
    fn list_section_uris_preserves_order() {
        let surface = ServingSurface::new(TokenCache::new());
        let uris = surface.list_section_uris("https://example.com", &[0, 1, 2, 10, 100]);
        assert_eq!(
            uris,
            vec![
                "https://example.com/statuslists/0",
                "https://example.com/statuslists/1",
                "https://example.com/statuslists/2",
                "https://example.com/statuslists/10",
                "https://example.com/statuslists/100",
            ]
        );
    }

    #[test]
    fn never_built_section_is_not_found() {
        let surface = ServingSurface::new(TokenCache::new());
        let result = surface.status_lists_request(999, "", None);
        assert!(matches!(result, Err(RegistryError::SectionNotFound(999))));
    }

    #[test]
    fn time_param_is_rejected_for_any_integer_value() {
        let surface = surface_with(0, "jwt", b"cwt");
        for time in ["-1", "0", "9999999999999"] {
            let result = surface.status_lists_request(0, "", Some(time));
            assert!(matches!(
                result,
                Err(RegistryError::HistoricalResolutionNotSupported)
            ));
        }
    }

    #[test]
    fn non_integer_time_param_is_invalid() {
        let surface = surface_with(0, "jwt", b"cwt");
        let result = surface.status_lists_request(0, "", Some("yesterday"));
        assert!(matches!(result, Err(RegistryError::InvalidTimeParameter(_))));
    }

    #[test]
    fn unknown_accept_values_default_to_jwt() {
        let surface = surface_with(0, "jwt-bytes", b"cwt-bytes");
        for accept in ["", "*/*", "application/json", "text/html", "garbage"] {
            let (body, content_type) = surface.status_lists_request(0, accept, None).unwrap();
            assert_eq!(content_type, MEDIA_TYPE_JWT);
            assert_eq!(body, b"jwt-bytes");
        }
    }

    #[test]
    fn exact_cwt_accept_selects_cwt() {
        let surface = surface_with(0, "jwt-bytes", b"cwt-bytes");
        let (body, content_type) = surface
            .status_lists_request(0, MEDIA_TYPE_CWT, None)
            .unwrap();
        assert_eq!(content_type, MEDIA_TYPE_CWT);
        assert_eq!(body, b"cwt-bytes");
    }
}
