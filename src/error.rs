//! Error taxonomy for the registry core.
//!
//! One `thiserror` enum for the whole crate, following the split the
//! teacher binary uses: `thiserror` types inside the library, `anyhow`
//! only at the CLI boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("section {0} has no cached token")]
    SectionNotFound(i64),

    #[error("historical resolution of a past token version is not supported")]
    HistoricalResolutionNotSupported,

    #[error("invalid `time` query parameter: {0}")]
    InvalidTimeParameter(String),

    #[error("section {0} was exhausted before a decoy could be claimed")]
    SectionExhausted(i64),

    #[error("failed to load signing key: {0}")]
    KeyLoadFailure(String),

    #[error("store operation failed: {0}")]
    StoreFailure(String),

    #[error("token build failed: {0}")]
    BuildFailure(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
