//! Provider implementations.

pub mod douban;
pub mod instagram;
pub mod qq;
pub mod renren;
pub mod sina;
pub mod twitter;

use std::sync::Arc;

use serde_json::Value;

use super::descriptor::ProviderDescriptor;
use super::oauth1::OAuth1Flow;
use super::oauth2::OAuth2Flow;
use super::token::string_field;
use super::{Provider, ProviderKind};
use crate::credentials::ProviderCredentials;
use crate::error::{missing_field_error, Error};
use crate::http::Transport;
use crate::oauth::token::AccessToken;

/// Build the provider for `kind` over the given endpoints.
pub fn build(
    kind: ProviderKind,
    descriptor: ProviderDescriptor,
    credentials: ProviderCredentials,
    transport: Arc<dyn Transport>,
) -> Box<dyn Provider> {
    match kind {
        ProviderKind::Douban => Box::new(douban::Douban::new(OAuth2Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
        ProviderKind::Sina => Box::new(sina::Sina::new(OAuth2Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
        ProviderKind::Renren => Box::new(renren::Renren::new(OAuth2Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
        ProviderKind::Instagram => Box::new(instagram::Instagram::new(OAuth2Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
        ProviderKind::Qq => Box::new(qq::Qq::new(OAuth1Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
        ProviderKind::Twitter => Box::new(twitter::Twitter::new(OAuth1Flow::new(
            descriptor,
            credentials,
            transport,
        ))),
    }
}

/// String (or number) field of a JSON object value.
fn text(value: &Value, key: &str) -> Option<String> {
    value.as_object().and_then(|object| string_field(object, key))
}

/// Like [`text`] but empty strings count as absent.
fn non_empty(value: &Value, key: &str) -> Option<String> {
    text(value, key).filter(|s| !s.is_empty())
}

/// Explicit uid, else the one the token response carried.
fn resolve_uid(uid: Option<&str>, token: &AccessToken) -> Result<String, Error> {
    uid.or(token.uid.as_deref())
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing_field_error("uid", ""))
}
