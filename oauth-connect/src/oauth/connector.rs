//! Provider-agnostic entry points for callers.

use std::sync::Arc;

use log::*;

use super::descriptor::ProviderDescriptor;
use super::profile::UserProfile;
use super::provider::{Flow, Provider, ProviderKind};
use super::providers;
use super::token::AccessToken;
use crate::credentials::ProviderCredentials;
use crate::error::{missing_field_error, session_state_missing, Error};
use crate::http::Transport;
use crate::session::{load_request_token, save_request_token, SessionCarrier};

/// Query parameters of a provider's callback request.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    /// OAuth 2.0 authorization code.
    pub code: Option<String>,
    /// OAuth 1.0a request token key echoed back by the provider.
    pub oauth_token: Option<String>,
    /// OAuth 1.0a verifier.
    pub oauth_verifier: Option<String>,
}

/// Runs a login, refresh or profile fetch against one provider.
pub struct Connector {
    provider: Box<dyn Provider>,
}

impl Connector {
    /// Connector over the provider's built-in endpoints.
    pub fn new(
        kind: ProviderKind,
        credentials: ProviderCredentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_descriptor(kind, kind.descriptor(), credentials, transport)
    }

    pub fn with_descriptor(
        kind: ProviderKind,
        descriptor: ProviderDescriptor,
        credentials: ProviderCredentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            provider: providers::build(kind, descriptor, credentials, transport),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Start a login and return the URL to send the user to.
    ///
    /// OAuth 1.0a providers first obtain a request token and stash it in `carrier`.
    pub async fn begin(&self, carrier: &dyn SessionCarrier) -> Result<String, Error> {
        match self.provider.flow() {
            Flow::OAuth2(flow) => Ok(flow.authorize_url()),
            Flow::OAuth1(flow) => {
                let request_token = flow.obtain_request_token().await?;
                save_request_token(carrier, &request_token).await?;
                Ok(flow.authorize_url(&request_token))
            }
        }
    }

    /// Finish a login from the provider's callback parameters.
    ///
    /// For OAuth 1.0a the stored request token is removed from `carrier` before anything
    /// else happens, so a failed callback cannot be replayed.
    pub async fn complete(
        &self,
        carrier: &dyn SessionCarrier,
        params: &CallbackParams,
    ) -> Result<AccessToken, Error> {
        match self.provider.flow() {
            Flow::OAuth2(flow) => {
                let code = params
                    .code
                    .as_deref()
                    .filter(|code| !code.is_empty())
                    .ok_or_else(|| missing_field_error("code", ""))?;
                let response = flow.exchange_code(code).await?;
                AccessToken::from_token_response(&response)
            }
            Flow::OAuth1(flow) => {
                let request_token = load_request_token(carrier, true)
                    .await?
                    .ok_or_else(session_state_missing)?;

                if params.oauth_token.as_deref() != Some(request_token.key.as_str()) {
                    warn!(
                        "Callback token does not match the {} request token in session",
                        self.kind()
                    );
                    return Err(session_state_missing());
                }

                let verifier = params
                    .oauth_verifier
                    .as_deref()
                    .filter(|verifier| !verifier.is_empty())
                    .ok_or_else(|| missing_field_error("oauth_verifier", ""))?;

                flow.exchange_verifier(&request_token, verifier).await
            }
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        self.provider.refresh(refresh_token).await
    }

    pub async fn fetch_profile(
        &self,
        token: &AccessToken,
        uid: Option<&str>,
    ) -> Result<UserProfile, Error> {
        self.provider.fetch_profile(token, uid).await
    }
}
