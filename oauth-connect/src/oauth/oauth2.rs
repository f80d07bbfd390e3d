//! OAuth 2.0 authorization-code flow.

use std::sync::Arc;

use log::*;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use url::form_urlencoded::Serializer;

use super::descriptor::ProviderDescriptor;
use super::token::AccessToken;
use crate::credentials::ProviderCredentials;
use crate::error::{decode_error, missing_field_error, Error};
use crate::http::{HttpRequest, HttpResponse, RequestBody, Transport};

/// Where a refresh request puts its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStyle {
    /// Form-encoded POST body, including `redirect_uri`.
    FormBody,
    /// Query string of a body-less POST.
    QueryString,
}

/// Authorization-code flow for one provider.
pub struct OAuth2Flow {
    descriptor: ProviderDescriptor,
    credentials: ProviderCredentials,
    transport: Arc<dyn Transport>,
}

impl OAuth2Flow {
    pub fn new(
        descriptor: ProviderDescriptor,
        credentials: ProviderCredentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            descriptor,
            credentials,
            transport,
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    pub fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }

    /// Generate the authorization URL the user is redirected to.
    ///
    /// `scope` comes from the credentials, falling back to the provider default.
    pub fn authorize_url(&self) -> String {
        let mut query = Serializer::new(String::new());
        query
            .append_pair("client_id", &self.credentials.api_key)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.credentials.redirect_uri);

        if let Some(display) = &self.credentials.display {
            query.append_pair("display", display);
        }
        if let Some(scope) = self
            .credentials
            .scope
            .as_ref()
            .or(self.descriptor.default_scope.as_ref())
        {
            query.append_pair("scope", scope);
        }
        if let Some(state) = &self.credentials.state {
            query.append_pair("state", state);
        }

        format!("{}?{}", self.descriptor.authorize_uri, query.finish())
    }

    /// Exchange an authorization code for the provider's token response.
    ///
    /// The decoded JSON object is returned untouched; see
    /// [`AccessToken::from_token_response`] for turning it into a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Map<String, Value>, Error> {
        let body = Serializer::new(String::new())
            .append_pair("client_id", &self.credentials.api_key)
            .append_pair(
                "client_secret",
                self.credentials.api_secret.expose_secret(),
            )
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", code)
            .finish();

        debug!("Exchanging OAuth2 code at {}", self.descriptor.access_token_uri);

        let response = self
            .send(HttpRequest::post(&self.descriptor.access_token_uri).with_body(RequestBody::Form(body)))
            .await?;

        match response.json()? {
            Value::Object(object) => {
                info!("Successfully exchanged OAuth2 code for tokens");
                Ok(object)
            }
            _ => Err(decode_error(&format!(
                "token response is not a JSON object: {}",
                response.text()
            ))),
        }
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        style: RefreshStyle,
    ) -> Result<AccessToken, Error> {
        let params = {
            let mut params = Serializer::new(String::new());
            params
                .append_pair("client_id", &self.credentials.api_key)
                .append_pair(
                    "client_secret",
                    self.credentials.api_secret.expose_secret(),
                );
            if style == RefreshStyle::FormBody {
                params.append_pair("redirect_uri", &self.credentials.redirect_uri);
            }
            params
                .append_pair("grant_type", "refresh_token")
                .append_pair("refresh_token", refresh_token);
            params.finish()
        };

        let request = match style {
            RefreshStyle::FormBody => HttpRequest::post(&self.descriptor.access_token_uri)
                .with_body(RequestBody::Form(params)),
            RefreshStyle::QueryString => {
                HttpRequest::post(format!("{}?{}", self.descriptor.access_token_uri, params))
            }
        };

        debug!("Refreshing OAuth2 access token");

        let response = self.send(request).await?;
        let token = match response.json() {
            Ok(Value::Object(object)) => AccessToken::from_token_response(&object)?,
            _ => return Err(missing_field_error("access_token", &response.text())),
        };

        info!("Successfully refreshed OAuth2 access token");
        Ok(token)
    }

    /// Send a request, treating anything but HTTP 200 as a transport error.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let uri = request.uri.clone();
        self.transport
            .request(request)
            .await?
            .error_for_status()
            .inspect_err(|e| warn!("OAuth2 request to {} failed: {}", uri, e))
    }
}
