//! Instagram OAuth 2.0 provider.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde_json::Value;

use super::{non_empty, resolve_uid};
use crate::error::{missing_field_error, unsupported_error, Error};
use crate::http::HttpRequest;
use crate::oauth::descriptor::{AuthFamily, ProviderDescriptor};
use crate::oauth::oauth2::OAuth2Flow;
use crate::oauth::token::AccessToken;
use crate::oauth::{Flow, ProviderKind, UserProfile};
use crate::signature::percent_encode;

const AUTHORIZE_URI: &str = "https://api.instagram.com/oauth/authorize/";
const ACCESS_TOKEN_URI: &str = "https://api.instagram.com/oauth/access_token";
const USER_INFO_URI: &str = "https://api.instagram.com/v1/users/{uid}/";
const DEFAULT_SCOPE: &str = "basic likes comments relationships";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        family: AuthFamily::OAuth2,
        authorize_uri: AUTHORIZE_URI.to_string(),
        access_token_uri: ACCESS_TOKEN_URI.to_string(),
        request_token_uri: None,
        api_uri: None,
        user_info_uri: Some(USER_INFO_URI.to_string()),
        default_scope: Some(DEFAULT_SCOPE.to_string()),
    }
}

pub struct Instagram {
    flow: OAuth2Flow,
}

impl Instagram {
    pub fn new(flow: OAuth2Flow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl crate::oauth::Provider for Instagram {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Instagram
    }

    fn flow(&self) -> Flow<'_> {
        Flow::OAuth2(&self.flow)
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AccessToken, Error> {
        Err(unsupported_error("refresh"))
    }

    async fn fetch_profile(
        &self,
        token: &AccessToken,
        uid: Option<&str>,
    ) -> Result<UserProfile, Error> {
        let uid = resolve_uid(uid, token)?;
        let uri = format!(
            "{}?access_token={}",
            self.flow
                .descriptor()
                .user_info_endpoint()?
                .replace("{uid}", &percent_encode(&uid)),
            percent_encode(token.access_token.expose_secret())
        );

        debug!("Fetching Instagram user info for {}", uid);
        let response = self.flow.send(HttpRequest::get(uri)).await?;
        let profile = response
            .json()?
            .get("data")
            .and_then(map_profile)
            .ok_or_else(|| missing_field_error("data", &response.text()))?;

        info!("Fetched Instagram profile {}", profile.uid);
        Ok(profile)
    }
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    let id = non_empty(value, "id")?;
    let username = non_empty(value, "username").unwrap_or_else(|| id.clone());
    let picture = non_empty(value, "profile_picture");

    Some(UserProfile {
        nickname: non_empty(value, "full_name").unwrap_or_else(|| username.clone()),
        uid: username,
        avatar: picture.clone(),
        icon: picture,
        intro: non_empty(value, "bio"),
        signature: None,
        email: None,
        id,
    })
}
