//! # oauth-connect
//!
//! Third-party login and delegated API credentials for several social providers:
//! - OAuth 1.0a request-token logins (QQ Weibo, Twitter)
//! - OAuth 2.0 authorization-code logins (Douban, Sina Weibo, Renren, Instagram)
//! - HMAC-SHA1 and MD5 request signing
//! - token refresh with per-account locking
//!
//! ## Architecture
//!
//! The crate never persists anything on its own. Callers plug in:
//! - a [`session::SessionCarrier`] that holds the OAuth 1.0a request token between the
//!   "begin" and callback requests
//! - a [`oauth::token::Storage`] that keeps access tokens for linked accounts
//! - optionally a custom [`http::Transport`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_connect::{
//!     http::TransportBuilder,
//!     oauth::{CallbackParams, Connector, ProviderKind},
//!     session::MemorySession,
//! };
//!
//! let connector = Connector::new(ProviderKind::Douban, credentials, Arc::new(transport));
//! let url = connector.begin(&session).await?;
//! // ... user authorizes, provider calls back ...
//! let token = connector.complete(&session, &callback_params).await?;
//! let profile = connector.fetch_profile(&token, None).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;
pub mod session;
pub mod signature;

// Re-export commonly used types
pub use credentials::ProviderCredentials;
pub use error::{Error, ErrorKind};
pub use oauth::{CallbackParams, Connector, ProviderKind, UserProfile};
