//! OAuth 1.0a request-token flow.

use std::collections::HashMap;
use std::sync::Arc;

use log::*;
use reqwest::Method;
use secrecy::ExposeSecret;

use super::descriptor::ProviderDescriptor;
use super::token::{AccessToken, RequestToken};
use crate::credentials::ProviderCredentials;
use crate::error::{missing_field_error, Error};
use crate::http::{FilePart, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::signature::{hmac_sha1, percent_encode, SignatureParameters};

/// Request-token flow for one provider.
///
/// `obtain_request_token` → user authorizes at `authorize_url` → `exchange_verifier`.
/// Nothing is kept between steps; the request token travels through the session carrier.
pub struct OAuth1Flow {
    descriptor: ProviderDescriptor,
    credentials: ProviderCredentials,
    transport: Arc<dyn Transport>,
}

impl OAuth1Flow {
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

    /// Get an unauthorized request token carrying our callback URI.
    pub async fn obtain_request_token(&self) -> Result<RequestToken, Error> {
        let uri = self.descriptor.request_token_endpoint()?;

        let mut params = SignatureParameters::new();
        params.insert(
            "oauth_callback".to_string(),
            self.credentials.redirect_uri.clone(),
        );

        debug!("Requesting OAuth1 request token from {}", uri);

        let response = self.signed_request(Method::GET, uri, "", params, None).await?;
        let fields = parse_form(&response);

        let key = required_field(&fields, "oauth_token", &response)?;
        let secret = required_field(&fields, "oauth_token_secret", &response)?;

        info!("Obtained OAuth1 request token");
        Ok(RequestToken { key, secret })
    }

    /// URL the user is sent to for authorizing `request_token`.
    pub fn authorize_url(&self, request_token: &RequestToken) -> String {
        format!(
            "{}?oauth_token={}",
            self.descriptor.authorize_uri,
            percent_encode(&request_token.key)
        )
    }

    /// Trade an authorized request token and its verifier for an access token.
    ///
    /// The returned token carries the access token secret as its secondary secret.
    pub async fn exchange_verifier(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken, Error> {
        let mut params = SignatureParameters::new();
        params.insert("oauth_token".to_string(), request_token.key.clone());
        params.insert("oauth_verifier".to_string(), verifier.to_string());

        debug!("Exchanging OAuth1 verifier for access token");

        let response = self
            .signed_request(
                Method::GET,
                &self.descriptor.access_token_uri,
                &request_token.secret,
                params,
                None,
            )
            .await?;
        let fields = parse_form(&response);

        let token = required_field(&fields, "oauth_token", &response)?;
        let secret = required_field(&fields, "oauth_token_secret", &response)?;
        let uid = fields
            .get("user_id")
            .or_else(|| fields.get("name"))
            .filter(|uid| !uid.is_empty())
            .cloned();

        info!("Exchanged OAuth1 verifier for access token");
        Ok(AccessToken::new(token, Some(secret)).with_uid(uid))
    }

    /// Signed call to `{api_uri}{path}` on behalf of the token's owner.
    ///
    /// POST with `files` is sent as multipart with the signed parameters as text fields.
    /// Other POSTs carry the signed parameters as a form body; every other method puts them
    /// in the query string.
    pub async fn call_protected_resource(
        &self,
        token: &AccessToken,
        method: Method,
        path: &str,
        params: SignatureParameters,
        files: Option<Vec<FilePart>>,
    ) -> Result<HttpResponse, Error> {
        let uri = format!("{}{}", self.descriptor.api_endpoint()?, path);
        self.call_with_token(token, method, &uri, params, files).await
    }

    pub(crate) async fn call_with_token(
        &self,
        token: &AccessToken,
        method: Method,
        uri: &str,
        mut params: SignatureParameters,
        files: Option<Vec<FilePart>>,
    ) -> Result<HttpResponse, Error> {
        params.insert(
            "oauth_token".to_string(),
            token.access_token.expose_secret().clone(),
        );
        let token_secret = token.secondary_secret().unwrap_or_default();

        self.signed_request(method, uri, token_secret, params, files)
            .await
    }

    async fn signed_request(
        &self,
        method: Method,
        uri: &str,
        token_secret: &str,
        params: SignatureParameters,
        files: Option<Vec<FilePart>>,
    ) -> Result<HttpResponse, Error> {
        let signed = hmac_sha1::sign(
            method.as_str(),
            uri,
            &self.credentials.api_key,
            self.credentials.api_secret.expose_secret(),
            token_secret,
            params,
        )?;

        let files = files.filter(|files| !files.is_empty());
        let request = if method != Method::POST {
            HttpRequest {
                method,
                uri: format!("{}?{}", uri, signed.query),
                headers: Vec::new(),
                body: None,
            }
        } else if let Some(files) = files {
            HttpRequest::post(uri).with_body(RequestBody::Multipart {
                fields: signed.params.into_iter().collect(),
                files,
            })
        } else {
            HttpRequest::post(uri).with_body(RequestBody::Form(signed.query))
        };

        self.transport
            .request(request)
            .await?
            .error_for_status()
            .inspect_err(|e| warn!("OAuth1 request to {} failed: {}", uri, e))
    }
}

fn parse_form(response: &HttpResponse) -> HashMap<String, String> {
    url::form_urlencoded::parse(&response.body)
        .into_owned()
        .collect()
}

fn required_field(
    fields: &HashMap<String, String>,
    name: &str,
    response: &HttpResponse,
) -> Result<String, Error> {
    fields
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| missing_field_error(name, &response.text()))
}
