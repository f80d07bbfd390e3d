//! Endpoint descriptors for the supported providers.

use crate::error::{config_error, Error};

/// Authorization family a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFamily {
    /// OAuth 1.0a request-token family.
    OAuth1,
    /// OAuth 2.0 authorization-code family.
    OAuth2,
}

/// Fixed endpoints of one provider.
///
/// The built-in values come from [`ProviderKind::descriptor`](super::ProviderKind::descriptor);
/// [`rebased`](Self::rebased) points every endpoint at another host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub family: AuthFamily,
    pub authorize_uri: String,
    pub access_token_uri: String,
    /// OAuth 1.0a only.
    pub request_token_uri: Option<String>,
    /// Base of signed API calls (OAuth 1.0a only).
    pub api_uri: Option<String>,
    /// May contain a `{uid}` placeholder.
    pub user_info_uri: Option<String>,
    pub default_scope: Option<String>,
}

impl ProviderDescriptor {
    /// Replace scheme and host of every endpoint with `base`, keeping paths.
    pub fn rebased(&self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let rebase = |uri: &str| format!("{}{}", base, path_of(uri));

        Self {
            family: self.family,
            authorize_uri: rebase(&self.authorize_uri),
            access_token_uri: rebase(&self.access_token_uri),
            request_token_uri: self.request_token_uri.as_deref().map(rebase),
            api_uri: self.api_uri.as_deref().map(rebase),
            user_info_uri: self.user_info_uri.as_deref().map(rebase),
            default_scope: self.default_scope.clone(),
        }
    }

    pub fn request_token_endpoint(&self) -> Result<&str, Error> {
        required(&self.request_token_uri, "request token")
    }

    pub fn api_endpoint(&self) -> Result<&str, Error> {
        required(&self.api_uri, "API")
    }

    pub fn user_info_endpoint(&self) -> Result<&str, Error> {
        required(&self.user_info_uri, "user info")
    }
}

fn required<'a>(uri: &'a Option<String>, name: &str) -> Result<&'a str, Error> {
    uri.as_deref()
        .ok_or_else(|| config_error(&format!("provider has no {} endpoint", name)))
}

/// Path (with query) of an absolute URI, or "" when it has none.
fn path_of(uri: &str) -> &str {
    let after_scheme = uri.find("://").map(|i| i + 3).unwrap_or(0);
    match uri[after_scheme..].find('/') {
        Some(offset) => &uri[after_scheme + offset..],
        None => "",
    }
}
