//! Component F — Token Builder.
//!
//! Treats one section's status vector as an immutable snapshot and
//! produces both wire forms from it: JWT is ASCII, CWT is binary. Both
//! encode the identical claim set, so they are interchangeable to a
//! relying party that prefers one media type over the other.

use crate::error::Result;
use crate::token::claims::{StatusListPayload, TokenBuildInput};
use crate::token::key::SigningKey;
use crate::token::{cwt, jwt};

/// One section's token pair, produced from the same claim snapshot.
pub struct BuiltTokens {
    pub jwt: String,
    pub cwt: Vec<u8>,
    pub payload: StatusListPayload,
}

pub struct TokenBuilder {
    key: SigningKey,
}

impl TokenBuilder {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn build(&self, input: TokenBuildInput<'_>) -> Result<BuiltTokens> {
        let key_id = input.key_id;
        let payload = input.payload()?;
        let jwt = jwt::build_jwt(&payload, &self.key, key_id)?;
        let cwt = cwt::build_cwt(&payload, &self.key, key_id)?;
        Ok(BuiltTokens { jwt, cwt, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_signing_key;

    #[test]
    fn builds_jwt_and_cwt_from_the_same_snapshot() {
        let builder = TokenBuilder::new(test_signing_key());
        let statuses = vec![0u8, 1, 2, 0, 1];
        let input = TokenBuildInput {
            section: 7,
            issuer: "https://issuer.example",
            subject: "status-list-7",
            statuses: &statuses,
            ttl_seconds: 43200,
            expires_in_seconds: 43200 - 300,
            issued_at: 1_700_000_000,
            key_id: Some("kid-1"),
            aggregation_uri: None,
            bits_per_status: None,
        };

        let built = builder.build(input).unwrap();
        assert_eq!(built.jwt.split('.').count(), 3);
        assert!(!built.cwt.is_empty());

        // JWT and CWT encode the identical status vector.
        let decoded = built.payload.status_list.decode(statuses.len()).unwrap();
        assert_eq!(decoded, statuses);
    }
}
