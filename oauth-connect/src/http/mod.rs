//! HTTP transport for provider calls.

mod client;
mod transport;

pub use client::{HttpClientConfig, ReqwestTransport, TransportBuilder};
pub use transport::{FilePart, HttpRequest, HttpResponse, RequestBody, Transport};
