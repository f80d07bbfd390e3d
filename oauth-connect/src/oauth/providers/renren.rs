//! Renren OAuth 2.0 provider with MD5-signed REST calls.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde_json::Value;

use super::non_empty;
use crate::error::{missing_field_error, Error};
use crate::http::HttpRequest;
use crate::oauth::descriptor::{AuthFamily, ProviderDescriptor};
use crate::oauth::oauth2::{OAuth2Flow, RefreshStyle};
use crate::oauth::token::AccessToken;
use crate::oauth::{Flow, ProviderKind, UserProfile};
use crate::signature::{self, SignatureParameters};

const AUTHORIZE_URI: &str = "https://graph.renren.com/oauth/authorize";
const ACCESS_TOKEN_URI: &str = "https://graph.renren.com/oauth/token";
const API_URI: &str = "http://api.renren.com/restserver.do";
const DEFAULT_SCOPE: &str = "read_user_status status_update read_user_feed publish_feed \
    read_user_blog publish_blog read_user_photo photo_upload read_user_album";
const USER_FIELDS: &str = "uid,name,sex,star,zidou,vip,birthday,tinyurl,headurl,mainurl,\
    hometown_location,work_history,university_history";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        family: AuthFamily::OAuth2,
        authorize_uri: AUTHORIZE_URI.to_string(),
        access_token_uri: ACCESS_TOKEN_URI.to_string(),
        request_token_uri: None,
        api_uri: None,
        user_info_uri: Some(API_URI.to_string()),
        default_scope: Some(DEFAULT_SCOPE.to_string()),
    }
}

/// Renren provider.
///
/// REST calls are signed with the application secret through the MD5 `sig` scheme.
pub struct Renren {
    flow: OAuth2Flow,
}

impl Renren {
    pub fn new(flow: OAuth2Flow) -> Self {
        Self { flow }
    }

    fn user_info_params(&self, token: &AccessToken, uid: &str) -> SignatureParameters {
        [
            ("method", "users.getInfo"),
            ("v", "1.0"),
            ("access_token", token.access_token.expose_secret().as_str()),
            ("uid", uid),
            ("format", "json"),
            ("fields", USER_FIELDS),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

#[async_trait]
impl crate::oauth::Provider for Renren {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Renren
    }

    fn flow(&self) -> Flow<'_> {
        Flow::OAuth2(&self.flow)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        self.flow
            .refresh_token(refresh_token, RefreshStyle::QueryString)
            .await
    }

    async fn fetch_profile(
        &self,
        token: &AccessToken,
        uid: Option<&str>,
    ) -> Result<UserProfile, Error> {
        // An empty uid asks for the token owner.
        let uid = uid.or(token.uid.as_deref()).unwrap_or_default();
        let signed = signature::md5::sign(
            self.flow.credentials().api_secret.expose_secret(),
            self.user_info_params(token, uid),
        );
        let uri = format!(
            "{}?{}",
            self.flow.descriptor().user_info_endpoint()?,
            signed.query
        );

        debug!("Fetching Renren user info");
        let response = self.flow.send(HttpRequest::post(uri)).await?;
        let profile = response
            .json()?
            .as_array()
            .and_then(|users| users.first())
            .and_then(map_profile)
            .ok_or_else(|| missing_field_error("uid", &response.text()))?;

        info!("Fetched Renren profile {}", profile.id);
        Ok(profile)
    }
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    let id = non_empty(value, "uid")?;

    Some(UserProfile {
        uid: id.clone(),
        nickname: non_empty(value, "name").unwrap_or_default(),
        avatar: non_empty(value, "mainurl").or_else(|| non_empty(value, "headurl")),
        icon: non_empty(value, "tinyurl"),
        intro: None,
        signature: None,
        email: None,
        id,
    })
}
