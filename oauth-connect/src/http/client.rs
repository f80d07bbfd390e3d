//! Default reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use super::{FilePart, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("oauth-connect/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for [`ReqwestTransport`].
///
/// Redirects are always disabled: an OAuth endpoint that redirects is reported to the
/// caller with its 3xx status.
pub struct TransportBuilder {
    config: HttpClientConfig,
}

impl TransportBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured transport.
    pub fn build(self) -> Result<ReqwestTransport, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(ReqwestTransport { client })
    }
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport adapter over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        trace!("{} {}", request.method, request.uri);

        let mut builder = self.client.request(request.method, &request.uri);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            None => builder,
            Some(RequestBody::Form(body)) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body),
            Some(RequestBody::Multipart { fields, files }) => {
                builder.multipart(build_multipart_form(fields, files)?)
            }
        };

        let response = builder.send().await.map_err(|e| {
            warn!("Request to provider failed: {:?}", e);
            Error::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

fn build_multipart_form(
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
) -> Result<Form, Error> {
    let mut form = Form::new();

    for (name, value) in fields {
        form = form.text(name, value);
    }

    for file in files {
        let mime_type = mime_guess::from_path(&file.file_name)
            .first_or_octet_stream()
            .to_string();
        let part = Part::bytes(file.content)
            .file_name(file.file_name)
            .mime_str(&mime_type)?;
        form = form.part(file.field, part);
    }

    Ok(form)
}
