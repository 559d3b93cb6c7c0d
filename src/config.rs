//! Shape of the recognized configuration options (§6). Loading these
//! from a file or environment is the collaborator's job; this crate only
//! defines the struct and the defaulting/clamping rules spec.md states
//! for each field.

use serde::{Deserialize, Serialize};

use crate::lifecycle::DEFAULT_SECTION_SIZE;
use crate::refresh::DEFAULT_REFRESH_INTERVAL_SECONDS;

pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminGuiSettings {
    pub enabled: bool,
    pub username: String,
    pub password: String,
    pub session_secret: String,
}

impl Default for AdminGuiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            password: String::new(),
            session_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    pub signing_key_path: String,
    pub token_refresh_interval_seconds: i64,
    pub section_size: i64,
    pub external_server_url: String,
    pub admin_gui: AdminGuiSettings,
    pub rate_limit_requests_per_minute: u32,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            signing_key_path: String::new(),
            token_refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECONDS,
            section_size: DEFAULT_SECTION_SIZE,
            external_server_url: String::new(),
            admin_gui: AdminGuiSettings::default(),
            rate_limit_requests_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl RegistrySettings {
    /// `0 ⇒ default` per §6.
    pub fn effective_refresh_interval_seconds(&self) -> i64 {
        if self.token_refresh_interval_seconds == 0 {
            DEFAULT_REFRESH_INTERVAL_SECONDS
        } else {
            self.token_refresh_interval_seconds
        }
    }

    /// `≤ 0 ⇒ default` per §6.
    pub fn effective_section_size(&self) -> i64 {
        if self.section_size <= 0 {
            DEFAULT_SECTION_SIZE
        } else {
            self.section_size
        }
    }

    /// `≤ 0 ⇒ default` per §6.
    pub fn effective_rate_limit_per_minute(&self) -> u32 {
        if self.rate_limit_requests_per_minute == 0 {
            DEFAULT_RATE_LIMIT_PER_MINUTE
        } else {
            self.rate_limit_requests_per_minute
        }
    }

    pub fn aggregation_uri(&self, section: i64) -> String {
        format!("{}/statuslists/{}", self.external_server_url, section)
    }
}
