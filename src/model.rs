//! Core data model shared by every component.

use serde::{Deserialize, Serialize};

/// Known status domain values. Anything `>= RESERVED_MIN` is a reserved /
/// unknown extension value and must round-trip unchanged, so `status` is
/// stored as a plain `u8` rather than a closed enum.
pub mod status {
    pub const VALID: u8 = 0;
    pub const INVALID: u8 = 1;
    pub const SUSPENDED: u8 = 2;
    /// First value not assigned a meaning by this registry.
    pub const RESERVED_MIN: u8 = 3;
}

/// Upper bound (exclusive) for the random status assigned to decoys, both
/// at section-seed time and on every perturbation. One named constant,
/// resolving the inconsistency between `[0, 3)` and `maxRandomLimit` noted
/// against the source this spec was distilled from.
pub const MAX_RANDOM_STATUS: u8 = 3;

/// One row of the status store: a single `(section, index)` credential
/// reference and its published status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub section: i64,
    pub index: i64,
    pub status: u8,
    pub decoy: bool,
}

/// The section-metadata singleton document: which section is writable now,
/// and the full append-only history of sections ever created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionMetadataDoc {
    pub current_section: i64,
    pub sections: Vec<i64>,
}

/// Optional side index from a person to the `(section, index)` slot that
/// carries their credential's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubject {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub section: i64,
    pub index: i64,
}

/// A joined admin search result: the person record plus the best-effort
/// status lookup (`None` when the `(section, index)` slot has no matching
/// status entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonStatus {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub section: i64,
    pub index: i64,
    pub status: Option<u8>,
}
