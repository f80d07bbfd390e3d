//! Tencent QQ Weibo OAuth 1.0a provider.

use async_trait::async_trait;
use log::*;
use reqwest::Method;
use serde_json::Value;

use super::non_empty;
use crate::error::{missing_field_error, unsupported_error, Error};
use crate::oauth::descriptor::{AuthFamily, ProviderDescriptor};
use crate::oauth::oauth1::OAuth1Flow;
use crate::oauth::token::AccessToken;
use crate::oauth::{Flow, ProviderKind, UserProfile};
use crate::signature::SignatureParameters;

const REQUEST_TOKEN_URI: &str = "https://open.t.qq.com/cgi-bin/request_token";
const AUTHORIZE_URI: &str = "https://open.t.qq.com/cgi-bin/authorize";
const ACCESS_TOKEN_URI: &str = "https://open.t.qq.com/cgi-bin/access_token";
const API_URI: &str = "http://open.t.qq.com/api";
const USER_INFO_PATH: &str = "/user/info";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        family: AuthFamily::OAuth1,
        authorize_uri: AUTHORIZE_URI.to_string(),
        access_token_uri: ACCESS_TOKEN_URI.to_string(),
        request_token_uri: Some(REQUEST_TOKEN_URI.to_string()),
        api_uri: Some(API_URI.to_string()),
        user_info_uri: Some(format!("{}{}", API_URI, USER_INFO_PATH)),
        default_scope: None,
    }
}

pub struct Qq {
    flow: OAuth1Flow,
}

impl Qq {
    pub fn new(flow: OAuth1Flow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl crate::oauth::Provider for Qq {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Qq
    }

    fn flow(&self) -> Flow<'_> {
        Flow::OAuth1(&self.flow)
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AccessToken, Error> {
        Err(unsupported_error("refresh"))
    }

    async fn fetch_profile(
        &self,
        token: &AccessToken,
        _uid: Option<&str>,
    ) -> Result<UserProfile, Error> {
        let mut params = SignatureParameters::new();
        params.insert("format".to_string(), "json".to_string());

        debug!("Fetching QQ user info");
        let uri = self.flow.descriptor().user_info_endpoint()?.to_string();
        let response = self
            .flow
            .call_with_token(token, Method::GET, &uri, params, None)
            .await?;
        let profile = response
            .json()?
            .get("data")
            .and_then(map_profile)
            .ok_or_else(|| missing_field_error("data", &response.text()))?;

        info!("Fetched QQ profile {}", profile.id);
        Ok(profile)
    }
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    let name = non_empty(value, "name")?;
    let head = non_empty(value, "head");

    Some(UserProfile {
        uid: name.clone(),
        nickname: non_empty(value, "nick").unwrap_or_else(|| name.clone()),
        icon: head.as_ref().map(|head| format!("{}/50", head)),
        avatar: head.as_ref().map(|head| format!("{}/100", head)),
        intro: non_empty(value, "introduction"),
        signature: None,
        email: non_empty(value, "email"),
        id: name,
    })
}
