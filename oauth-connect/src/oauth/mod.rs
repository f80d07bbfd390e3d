//! OAuth login infrastructure.
//!
//! Shared OAuth 1.0a and OAuth 2.0 flows, the per-provider implementations on top of them
//! and the [`Connector`] callers drive a login through.

mod connector;
mod descriptor;
mod oauth1;
mod oauth2;
mod profile;
mod provider;

pub mod providers;
pub mod token;

pub use connector::{CallbackParams, Connector};
pub use descriptor::{AuthFamily, ProviderDescriptor};
pub use oauth1::OAuth1Flow;
pub use oauth2::{OAuth2Flow, RefreshStyle};
pub use profile::UserProfile;
pub use provider::{Flow, Provider, ProviderKind};
