//! CWT encoding of the status-list payload: the claim set as a CBOR map
//! keyed by the registered CWT integer claim labels (RFC 8392, plus the
//! status-list draft's own registrations), wrapped in a `COSE_Sign1` with
//! protected header `{ alg: ES256, typ: "application/statuslist+cwt" }`.

use ciborium::value::Value;
use coset::{iana, CborSerializable, ContentType, CoseSign1Builder, HeaderBuilder};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::Signature;

use crate::error::{RegistryError, Result};
use crate::token::claims::StatusListPayload;
use crate::token::key::SigningKey;

// Registered CWT claim keys (RFC 8392).
const CLAIM_ISS: i128 = 1;
const CLAIM_SUB: i128 = 2;
const CLAIM_EXP: i128 = 4;
const CLAIM_IAT: i128 = 6;
// draft-ietf-oauth-status-list registered integer claim labels.
const CLAIM_TTL: i128 = 65534;
const CLAIM_STATUS_LIST: i128 = 65533;
const CLAIM_AGGREGATION_URI: i128 = 65532;

const CONTENT_TYPE_CWT: &str = "application/statuslist+cwt";

fn payload_to_cbor(payload: &StatusListPayload) -> Result<Vec<u8>> {
    let status_list_map = vec![
        (
            Value::Text("bits".to_string()),
            Value::Integer(payload.status_list.bits.into()),
        ),
        (
            Value::Text("lst".to_string()),
            Value::Text(payload.status_list.lst.clone()),
        ),
    ];

    let mut entries = vec![
        (Value::Integer(CLAIM_ISS.into()), Value::Text(payload.iss.clone())),
        (Value::Integer(CLAIM_SUB.into()), Value::Text(payload.sub.clone())),
        (Value::Integer(CLAIM_IAT.into()), Value::Integer(payload.iat.into())),
        (Value::Integer(CLAIM_EXP.into()), Value::Integer(payload.exp.into())),
        (Value::Integer(CLAIM_TTL.into()), Value::Integer(payload.ttl.into())),
        (
            Value::Integer(CLAIM_STATUS_LIST.into()),
            Value::Map(status_list_map),
        ),
    ];
    if let Some(uri) = &payload.aggregation_uri {
        entries.push((
            Value::Integer(CLAIM_AGGREGATION_URI.into()),
            Value::Text(uri.clone()),
        ));
    }

    let mut buf = Vec::new();
    ciborium::ser::into_writer(&Value::Map(entries), &mut buf)
        .map_err(|e| RegistryError::BuildFailure(format!("cbor-encode CWT claims: {e}")))?;
    Ok(buf)
}

/// `key_id` is the per-build override from [`TokenBuildInput::key_id`];
/// falls back to the signing key's own id when the build didn't supply one.
pub fn build_cwt(payload: &StatusListPayload, key: &SigningKey, key_id: Option<&str>) -> Result<Vec<u8>> {
    let claims_bytes = payload_to_cbor(payload)?;

    let mut header_builder = HeaderBuilder::new().algorithm(iana::Algorithm::ES256);
    if let Some(kid) = key_id.or(key.key_id.as_deref()) {
        header_builder = header_builder.key_id(kid.as_bytes().to_vec());
    }
    let mut protected = header_builder.build();
    protected.content_type = Some(ContentType::Text(CONTENT_TYPE_CWT.to_string()));

    let sign1 = CoseSign1Builder::new()
        .protected(protected)
        .payload(claims_bytes)
        .create_signature(&[], |to_be_signed| {
            let signature: Signature = key.p256_key.sign(to_be_signed);
            signature.to_bytes().to_vec()
        })
        .build();

    sign1
        .to_vec()
        .map_err(|e| RegistryError::BuildFailure(format!("serialize COSE_Sign1: {e}")))
}
