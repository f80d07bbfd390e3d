//! Transport adapter contract.

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{transport_error, Error};

/// A file attached to a multipart POST.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name sent to the provider; also drives MIME type guessing.
    pub file_name: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// Request body variants the providers need.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` payload, already encoded.
    Form(String),
    /// `multipart/form-data` with text fields followed by files.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status line and raw body of a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    pub fn json(&self) -> Result<serde_json::Value, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn anything but HTTP 200 into a transport error carrying the raw body.
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.status == 200 {
            Ok(self)
        } else {
            Err(transport_error(self.status, &self.reason, &self.text()))
        }
    }
}

/// Performs a single HTTP exchange with a provider.
///
/// Implementations must not follow redirects and must return non-2xx responses as
/// `Ok(HttpResponse)`, leaving status classification to the caller. Timeouts belong here,
/// the flows never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}
