//! Twitter OAuth 1.0a provider.

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

const REQUEST_TOKEN_URI: &str = "https://api.twitter.com/oauth/request_token";
const AUTHORIZE_URI: &str = "https://api.twitter.com/oauth/authorize";
const ACCESS_TOKEN_URI: &str = "https://api.twitter.com/oauth/access_token";
const API_URI: &str = "https://api.twitter.com/1.1";
const VERIFY_CREDENTIALS_PATH: &str = "/account/verify_credentials.json";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        family: AuthFamily::OAuth1,
        authorize_uri: AUTHORIZE_URI.to_string(),
        access_token_uri: ACCESS_TOKEN_URI.to_string(),
        request_token_uri: Some(REQUEST_TOKEN_URI.to_string()),
        api_uri: Some(API_URI.to_string()),
        user_info_uri: Some(format!("{}{}", API_URI, VERIFY_CREDENTIALS_PATH)),
        default_scope: None,
    }
}

pub struct Twitter {
    flow: OAuth1Flow,
}

impl Twitter {
    pub fn new(flow: OAuth1Flow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl crate::oauth::Provider for Twitter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Twitter
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
        debug!("Verifying Twitter credentials");
        let uri = self.flow.descriptor().user_info_endpoint()?.to_string();
        let response = self
            .flow
            .call_with_token(token, Method::GET, &uri, SignatureParameters::new(), None)
            .await?;
        let profile = map_profile(&response.json()?)
            .ok_or_else(|| missing_field_error("id_str", &response.text()))?;

        info!("Fetched Twitter profile {}", profile.uid);
        Ok(profile)
    }
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    let id = non_empty(value, "id_str").or_else(|| non_empty(value, "id"))?;
    let icon = non_empty(value, "profile_image_url");

    Some(UserProfile {
        uid: non_empty(value, "screen_name").unwrap_or_else(|| id.clone()),
        nickname: non_empty(value, "name").unwrap_or_default(),
        avatar: icon.as_ref().map(|icon| icon.replace("_normal", "")),
        icon,
        intro: non_empty(value, "description"),
        signature: None,
        email: None,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TransportBuilder;
    use crate::oauth::Provider;
    use crate::{ErrorKind, ProviderCredentials};
    use mockito::{Matcher, Server};
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Arc;

    fn provider(base: &str) -> Twitter {
        let credentials = ProviderCredentials::new(
            "ck".to_string(),
            SecretString::new("cs".to_string()),
            "http://localhost/connect/twitter/callback".to_string(),
        );
        let transport = Arc::new(TransportBuilder::new().build().unwrap());
        Twitter::new(OAuth1Flow::new(
            descriptor().rebased(base),
            credentials,
            transport,
        ))
    }

    #[test]
    fn test_map_profile_strips_normal_suffix() {
        let profile = map_profile(&json!({
            "id": 6253282,
            "id_str": "6253282",
            "screen_name": "twitterapi",
            "name": "Twitter API",
            "profile_image_url": "http://a0.twimg.com/profile_images/2284174872/7df3h38zabcvjylnyfe3_normal.png",
            "description": "The Real Twitter API."
        }))
        .unwrap();

        assert_eq!(profile.id, "6253282");
        assert_eq!(profile.uid, "twitterapi");
        assert_eq!(
            profile.avatar.as_deref(),
            Some("http://a0.twimg.com/profile_images/2284174872/7df3h38zabcvjylnyfe3.png")
        );
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/1.1/account/verify_credentials.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("oauth_token".into(), "at".into()),
                Matcher::UrlEncoded("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id_str":"6253282","screen_name":"twitterapi","name":"Twitter API"}"#)
            .create_async()
            .await;

        let token = AccessToken::new("at".to_string(), Some("ats".to_string()));
        let profile = provider(&server.url())
            .fetch_profile(&token, None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.nickname, "Twitter API");
    }

    #[tokio::test]
    async fn test_refresh_is_unsupported() {
        let err = provider("http://127.0.0.1:9").refresh("x").await.unwrap_err();
        assert!(matches!(err.error_kind, ErrorKind::UnsupportedOperation(_)));
    }
}
