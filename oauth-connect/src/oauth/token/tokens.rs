//! OAuth token types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{missing_field_error, Error};

/// OAuth 1.0a request token. Only valid between "begin" and "complete" of one login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub key: String,
    pub secret: String,
}

/// Delegated credential handed back to the caller for storage.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Token presented on API calls.
    pub access_token: SecretString,
    /// Refresh token (OAuth 2.0) or access token secret (OAuth 1.0a).
    pub secondary_secret: Option<SecretString>,
    /// Provider-side user id when the token response names one.
    pub uid: Option<String>,
}

/// Plain copy of an [`AccessToken`] for callers that serialize it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainAccessToken {
    pub access_token: String,
    pub secondary_secret: Option<String>,
    pub uid: Option<String>,
}

impl AccessToken {
    pub fn new(access_token: String, secondary_secret: Option<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token),
            secondary_secret: secondary_secret.map(SecretString::new),
            uid: None,
        }
    }

    pub fn with_uid(mut self, uid: Option<String>) -> Self {
        self.uid = uid;
        self
    }

    /// Build a token from a decoded OAuth 2.0 token response.
    ///
    /// Requires a non-empty `access_token`; `refresh_token` and the user id are optional.
    pub fn from_token_response(response: &Map<String, Value>) -> Result<Self, Error> {
        let access_token = string_field(response, "access_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                missing_field_error("access_token", &Value::Object(response.clone()).to_string())
            })?;
        let refresh_token = string_field(response, "refresh_token").filter(|t| !t.is_empty());

        Ok(Self::new(access_token, refresh_token).with_uid(uid_from_response(response)))
    }

    pub fn secondary_secret(&self) -> Option<&str> {
        self.secondary_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
    }

    pub fn into_plain(self) -> PlainAccessToken {
        PlainAccessToken {
            access_token: self.access_token.expose_secret().clone(),
            secondary_secret: self.secondary_secret.map(|s| s.expose_secret().clone()),
            uid: self.uid,
        }
    }
}

/// Reads a string or number field as a string.
pub(crate) fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Provider user id, looked up as `uid`, `douban_user_id` or `user.id` depending on provider.
fn uid_from_response(response: &Map<String, Value>) -> Option<String> {
    string_field(response, "uid")
        .or_else(|| string_field(response, "douban_user_id"))
        .or_else(|| {
            response
                .get("user")
                .and_then(Value::as_object)
                .and_then(|user| string_field(user, "id"))
        })
}
