//! OAuth provider trait and types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::descriptor::{AuthFamily, ProviderDescriptor};
use super::oauth1::OAuth1Flow;
use super::oauth2::OAuth2Flow;
use super::profile::UserProfile;
use super::providers;
use super::token::AccessToken;
use crate::error::{config_error, Error};

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Douban,
    Sina,
    Renren,
    Instagram,
    Qq,
    Twitter,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::Douban,
        ProviderKind::Sina,
        ProviderKind::Renren,
        ProviderKind::Instagram,
        ProviderKind::Qq,
        ProviderKind::Twitter,
    ];

    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Douban => "douban",
            ProviderKind::Sina => "sina",
            ProviderKind::Renren => "renren",
            ProviderKind::Instagram => "instagram",
            ProviderKind::Qq => "qq",
            ProviderKind::Twitter => "twitter",
        }
    }

    pub fn family(&self) -> AuthFamily {
        match self {
            ProviderKind::Qq | ProviderKind::Twitter => AuthFamily::OAuth1,
            _ => AuthFamily::OAuth2,
        }
    }

    /// Built-in endpoints of this provider.
    pub fn descriptor(&self) -> ProviderDescriptor {
        match self {
            ProviderKind::Douban => providers::douban::descriptor(),
            ProviderKind::Sina => providers::sina::descriptor(),
            ProviderKind::Renren => providers::renren::descriptor(),
            ProviderKind::Instagram => providers::instagram::descriptor(),
            ProviderKind::Qq => providers::qq::descriptor(),
            ProviderKind::Twitter => providers::twitter::descriptor(),
        }
    }

    /// Whether the provider can exchange a refresh token for a new access token.
    pub fn supports_refresh(&self) -> bool {
        matches!(self, ProviderKind::Douban | ProviderKind::Renren)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or_else(|| config_error(&format!("unknown provider: {}", s)))
    }
}

/// The authorization flow behind a provider.
pub enum Flow<'a> {
    OAuth1(&'a OAuth1Flow),
    OAuth2(&'a OAuth2Flow),
}

/// Trait implemented once per provider.
///
/// The shared flows cover login; implementations add what differs between providers:
/// - how (and whether) tokens are refreshed
/// - where the user profile lives and how it maps onto [`UserProfile`]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn kind(&self) -> ProviderKind;

    /// The flow used to log a user in.
    fn flow(&self) -> Flow<'_>;

    /// Exchange a refresh token for a new access token.
    ///
    /// Providers without refresh support return `UnsupportedOperation`.
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error>;

    /// Fetch and normalize the profile of the token's owner.
    ///
    /// # Arguments
    ///
    /// * `token` - Access token from `complete` or `refresh`
    /// * `uid` - Provider user id; falls back to `token.uid` when `None`
    async fn fetch_profile(
        &self,
        token: &AccessToken,
        uid: Option<&str>,
    ) -> Result<UserProfile, Error>;
}
