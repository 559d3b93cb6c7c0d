//! The claim set embedded in every status-list token, independent of its
//! JWT or CWT encoding.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::token::bits::{self, DEFAULT_BITS};

/// The `status_list` claim object: `{ "bits": N, "lst": <base64url> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusListClaim {
    pub bits: u8,
    pub lst: String,
}

impl StatusListClaim {
    pub fn encode(statuses: &[u8], bits_per_status: u8) -> Result<Self> {
        let packed = bits::pack(statuses, bits_per_status)?;
        let compressed = bits::zlib_compress(&packed)?;
        Ok(Self {
            bits: bits_per_status,
            lst: bits::base64url_encode(&compressed),
        })
    }

    pub fn decode(&self, count: usize) -> Result<Vec<u8>> {
        let compressed = bits::base64url_decode(&self.lst)?;
        let packed = bits::zlib_decompress(&compressed)?;
        bits::unpack(&packed, self.bits, count)
    }
}

/// The full payload claim set for one section's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusListPayload {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Seconds a relying party should cache this token for before
    /// refetching.
    pub ttl: i64,
    pub status_list: StatusListClaim,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_uri: Option<String>,
}

/// Inputs to one token build (JWT + CWT), independent of which wire form
/// is being produced.
pub struct TokenBuildInput<'a> {
    pub section: i64,
    pub issuer: &'a str,
    pub subject: &'a str,
    pub statuses: &'a [u8],
    pub ttl_seconds: i64,
    pub expires_in_seconds: i64,
    pub issued_at: i64,
    pub key_id: Option<&'a str>,
    pub aggregation_uri: Option<String>,
    pub bits_per_status: Option<u8>,
}

impl TokenBuildInput<'_> {
    pub fn payload(&self) -> Result<StatusListPayload> {
        let status_list =
            StatusListClaim::encode(self.statuses, self.bits_per_status.unwrap_or(DEFAULT_BITS))?;
        Ok(StatusListPayload {
            iss: self.issuer.to_string(),
            sub: self.subject.to_string(),
            iat: self.issued_at,
            exp: self.issued_at + self.expires_in_seconds,
            ttl: self.ttl_seconds,
            status_list,
            aggregation_uri: self.aggregation_uri.clone(),
        })
    }
}
