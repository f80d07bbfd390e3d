//! OAuth 1.0a HMAC-SHA1 request signing.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;

use super::{percent_encode, to_query, SignatureParameters, SignedParameters};
use crate::error::{config_error, Error};

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_LEN: usize = 32;

/// Sign a request the OAuth 1.0a way.
///
/// Missing (or empty) `oauth_timestamp`, `oauth_nonce`, `oauth_signature_method` and
/// `oauth_version` are generated; `oauth_consumer_key` is always taken from `consumer_key`.
/// The signing key is `consumer_secret&token_secret`, with an empty token secret before a
/// request token exists.
///
/// # Errors
///
/// A configuration error when `oauth_signature_method` names anything but `HMAC-SHA1`.
pub fn sign(
    method: &str,
    uri: &str,
    consumer_key: &str,
    consumer_secret: &str,
    token_secret: &str,
    mut params: SignatureParameters,
) -> Result<SignedParameters, Error> {
    params.insert("oauth_consumer_key".to_string(), consumer_key.to_string());
    fill_missing(&mut params, "oauth_timestamp", || {
        chrono::Utc::now().timestamp().to_string()
    });
    fill_missing(&mut params, "oauth_nonce", generate_nonce);
    fill_missing(&mut params, "oauth_signature_method", || {
        SIGNATURE_METHOD.to_string()
    });
    fill_missing(&mut params, "oauth_version", || OAUTH_VERSION.to_string());

    let requested_method = params
        .get("oauth_signature_method")
        .map(String::as_str)
        .unwrap_or_default();
    if requested_method != SIGNATURE_METHOD {
        return Err(config_error(&format!(
            "unsupported signature method: {}",
            requested_method
        )));
    }

    let base = base_string(method, uri, &params);
    let key = format!("{}&{}", consumer_secret, token_secret);

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|_| config_error("invalid HMAC signing key"))?;
    mac.update(base.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let query = to_query(&params, "oauth_signature", &signature);
    params.insert("oauth_signature".to_string(), signature.clone());

    Ok(SignedParameters {
        params,
        query,
        signature,
    })
}

/// Build the canonical base string: `METHOD&enc(lower(uri))&enc(k=v&k=v...)`.
///
/// Pairs are ordered by raw key and each pair is encoded before the joined string is
/// encoded a second time.
pub fn base_string(method: &str, uri: &str, params: &SignatureParameters) -> String {
    let normalized = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(&uri.to_lowercase()),
        percent_encode(&normalized)
    )
}

fn fill_missing(params: &mut SignatureParameters, key: &str, generate: impl FnOnce() -> String) {
    let missing = params.get(key).map_or(true, |v| v.is_empty());
    if missing {
        params.insert(key.to_string(), generate());
    }
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
