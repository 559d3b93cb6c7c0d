//! Signing key handling. Loading the key *file* is the collaborator's job
//! (§1's "signing-key file loader"); validating that the bytes it hands
//! us decode to an ECDSA P-256 key, and rejecting anything else, is this
//! crate's job per the §7 `KeyLoadFailure` contract.

use p256::ecdsa::SigningKey as P256SigningKey;
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;

use crate::error::{RegistryError, Result};

/// A validated ECDSA P-256 signing key, shared immutably across the
/// service's lifetime once loaded (§5's "Shared-resource policy").
#[derive(Clone)]
pub struct SigningKey {
    pub(crate) p256_key: P256SigningKey,
    /// Retained so the JWT path can hand `jsonwebtoken` a PEM directly,
    /// instead of re-serializing the parsed key.
    pkcs8_pem: String,
    pub key_id: Option<String>,
}

impl SigningKey {
    /// Parse `pem` as a PKCS8 EC private key and verify it is on the
    /// P-256 curve. Any other curve, or an RSA key, fails to parse as a
    /// P-256 `SecretKey` and is reported as [`RegistryError::KeyLoadFailure`].
    pub fn from_pkcs8_pem(pem: &str, key_id: Option<String>) -> Result<Self> {
        let secret = SecretKey::from_pkcs8_pem(pem).map_err(|e| {
            RegistryError::KeyLoadFailure(format!(
                "key is not a valid PKCS8 ECDSA P-256 private key: {e}"
            ))
        })?;
        Ok(Self {
            p256_key: P256SigningKey::from(secret),
            pkcs8_pem: pem.to_string(),
            key_id,
        })
    }

    pub fn pkcs8_pem(&self) -> &str {
        &self.pkcs8_pem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TEST_P256_PKCS8_PEM;

    #[test]
    fn loads_valid_p256_key() {
        let key = SigningKey::from_pkcs8_pem(TEST_P256_PKCS8_PEM, Some("kid-1".to_string()));
        assert!(key.is_ok());
    }

    #[test]
    fn rejects_garbage_pem() {
        let key = SigningKey::from_pkcs8_pem("not a pem", None);
        assert!(matches!(key, Err(RegistryError::KeyLoadFailure(_))));
    }
}
