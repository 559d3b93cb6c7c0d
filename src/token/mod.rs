//! Component F — Token Builder: status-vector encoding plus dual JWT/CWT
//! signing.

pub mod bits;
pub mod builder;
pub mod claims;
pub mod cwt;
pub mod jwt;
pub mod key;

pub use builder::{BuiltTokens, TokenBuilder};
pub use claims::{StatusListClaim, StatusListPayload, TokenBuildInput};
pub use key::SigningKey;
