//! MD5 `sig` signing used by Renren's REST API.
//!
//! Not OAuth-compliant: the remote side rebuilds `k=v` pairs without separators or
//! encoding, appends the secret and compares hex digests, so the construction below has to
//! stay byte-for-byte as it is.

use super::{to_query, SignatureParameters, SignedParameters};

pub const SIGNATURE_FIELD: &str = "sig";

/// Sign `params` with `secret` and add the `sig` field.
pub fn sign(secret: &str, mut params: SignatureParameters) -> SignedParameters {
    let raw: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .chain(std::iter::once(secret.to_string()))
        .collect();
    let signature = format!("{:x}", ::md5::compute(raw.as_bytes()));

    let query = to_query(&params, SIGNATURE_FIELD, &signature);
    params.insert(SIGNATURE_FIELD.to_string(), signature.clone());

    SignedParameters {
        params,
        query,
        signature,
    }
}
