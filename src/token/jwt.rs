//! JWT encoding of the status-list payload: header
//! `{ "alg": "ES256", "typ": "statuslist+jwt", "kid": keyId? }`, signed
//! with the loaded ECDSA P-256 key.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::error::{RegistryError, Result};
use crate::token::claims::StatusListPayload;
use crate::token::key::SigningKey;

/// `key_id` is the per-build override from [`TokenBuildInput::key_id`];
/// falls back to the signing key's own id when the build didn't supply one.
pub fn build_jwt(payload: &StatusListPayload, key: &SigningKey, key_id: Option<&str>) -> Result<String> {
    let mut header = Header::new(Algorithm::ES256);
    header.typ = Some("statuslist+jwt".to_string());
    header.kid = key_id.map(str::to_string).or_else(|| key.key_id.clone());

    let encoding_key = EncodingKey::from_ec_pem(key.pkcs8_pem().as_bytes())
        .map_err(|e| RegistryError::BuildFailure(format!("load EC signing key for JWT: {e}")))?;

    encode(&header, payload, &encoding_key).map_err(|e| RegistryError::BuildFailure(format!("sign JWT: {e}")))
}
