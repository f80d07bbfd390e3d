//! Application credentials registered with a provider.

use secrecy::SecretString;

/// Identifies the application (not the user) to a provider.
///
/// For OAuth 1.0a providers `api_key`/`api_secret` are the consumer key and secret and
/// `redirect_uri` is sent as `oauth_callback`.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub api_secret: SecretString,
    pub redirect_uri: String,
    /// Overrides the provider's default scope when set.
    pub scope: Option<String>,
    pub state: Option<String>,
    /// Page layout hint understood by some OAuth 2.0 providers (e.g. `mobile`).
    pub display: Option<String>,
}

impl ProviderCredentials {
    pub fn new(api_key: String, api_secret: SecretString, redirect_uri: String) -> Self {
        Self {
            api_key,
            api_secret,
            redirect_uri,
            scope: None,
            state: None,
            display: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_builder_sets_optional_fields() {
        let credentials = ProviderCredentials::new(
            "key".to_string(),
            SecretString::new("secret".to_string()),
            "http://localhost/callback".to_string(),
        )
        .with_scope("read")
        .with_state("xyz")
        .with_display("mobile");

        assert_eq!(credentials.api_secret.expose_secret(), "secret");
        assert_eq!(credentials.scope.as_deref(), Some("read"));
        assert_eq!(credentials.state.as_deref(), Some("xyz"));
        assert_eq!(credentials.display.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = ProviderCredentials::new(
            "key".to_string(),
            SecretString::new("hunter2".to_string()),
            "http://localhost/callback".to_string(),
        );
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
