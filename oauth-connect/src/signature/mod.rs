//! Request signing.
//!
//! Two independent algorithms are used by the supported providers:
//! - OAuth 1.0a HMAC-SHA1 for the request-token family
//! - the Renren-style MD5 `sig` for its server-to-server API calls

pub mod hmac_sha1;
pub mod md5;

use std::collections::BTreeMap;

/// Parameters to sign. A `BTreeMap` keeps them sorted by key.
pub type SignatureParameters = BTreeMap<String, String>;

/// Output of a signing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedParameters {
    /// Every signed parameter plus the signature field itself.
    pub params: SignatureParameters,
    /// Ready-to-send query string, signature appended last.
    pub query: String,
    /// The computed signature value.
    pub signature: String,
}

/// Percent-encodes a value with `%20` for spaces.
pub(crate) fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encodes sorted pairs as `k=v&k=v`, then appends `field=signature`.
pub(crate) fn to_query(params: &SignatureParameters, field: &str, signature: &str) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect();
    pairs.push(format!("{}={}", field, percent_encode(signature)));
    pairs.join("&")
}
