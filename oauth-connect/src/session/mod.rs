//! Session token carrier.
//!
//! OAuth 1.0a logins span two independent invocations of the caller ("begin" and the
//! provider callback). The request token crosses that boundary through a caller-supplied
//! [`SessionCarrier`], usually backed by the user's session cookie.

mod file;
mod memory;

pub use file::FileSession;
pub use memory::MemorySession;

use async_trait::async_trait;
use log::*;

use crate::error::{Error, ErrorKind};
use crate::oauth::token::RequestToken;

/// Session key holding the pending request token as `{"key": ..., "secret": ...}`.
pub const REQUEST_TOKEN_KEY: &str = "request_token";

/// Minimal key/value contract over a user's session.
///
/// Operations are independent and idempotent; deleting an absent key is a no-op.
#[async_trait]
pub trait SessionCarrier: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<(), Error>;

    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    async fn delete(&self, key: &str) -> Result<(), Error>;
}

/// Stash a request token until the provider calls back.
pub async fn save_request_token(
    carrier: &dyn SessionCarrier,
    token: &RequestToken,
) -> Result<(), Error> {
    let value = serde_json::to_string(token)?;
    carrier.set(REQUEST_TOKEN_KEY, value).await
}

/// Read back the pending request token, removing it from the session when `delete` is set.
///
/// The delete happens before the stored value is decoded, so an unreadable token is
/// discarded as well.
pub async fn load_request_token(
    carrier: &dyn SessionCarrier,
    delete: bool,
) -> Result<Option<RequestToken>, Error> {
    let stored = carrier.get(REQUEST_TOKEN_KEY).await?;
    if delete {
        delete_request_token(carrier).await?;
    }

    match stored {
        Some(value) => serde_json::from_str(&value).map(Some).map_err(|e| {
            warn!("Discarding malformed request token in session: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::SessionStateMissing,
            }
        }),
        None => Ok(None),
    }
}

pub async fn delete_request_token(carrier: &dyn SessionCarrier) -> Result<(), Error> {
    carrier.delete(REQUEST_TOKEN_KEY).await
}
