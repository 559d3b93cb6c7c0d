//! Persistence seams (component A, B, C). Each trait documents the
//! collection/index shape a real database-backed implementation must
//! provide; each ships one in-memory reference implementation used by the
//! rest of this crate's tests and by the demo CLI.

pub mod section;
pub mod status;
pub mod subject;

pub use section::{InMemorySectionMetadataStore, SectionMetadataStore};
pub use status::{InMemoryStatusStore, StatusFilter, StatusStore, UpdateOutcome};
pub use subject::{InMemorySubjectIndex, SubjectIndex};
