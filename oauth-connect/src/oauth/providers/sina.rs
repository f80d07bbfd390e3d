//! Sina Weibo OAuth 2.0 provider.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde_json::Value;
use url::form_urlencoded::Serializer;

use super::{non_empty, resolve_uid};
use crate::error::{missing_field_error, unsupported_error, Error};
use crate::http::HttpRequest;
use crate::oauth::descriptor::{AuthFamily, ProviderDescriptor};
use crate::oauth::oauth2::OAuth2Flow;
use crate::oauth::token::AccessToken;
use crate::oauth::{Flow, ProviderKind, UserProfile};

const AUTHORIZE_URI: &str = "https://api.weibo.com/oauth2/authorize";
const ACCESS_TOKEN_URI: &str = "https://api.weibo.com/oauth2/access_token";
const USER_INFO_URI: &str = "https://api.weibo.com/2/users/show.json";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        family: AuthFamily::OAuth2,
        authorize_uri: AUTHORIZE_URI.to_string(),
        access_token_uri: ACCESS_TOKEN_URI.to_string(),
        request_token_uri: None,
        api_uri: None,
        user_info_uri: Some(USER_INFO_URI.to_string()),
        default_scope: None,
    }
}

pub struct Sina {
    flow: OAuth2Flow,
}

impl Sina {
    pub fn new(flow: OAuth2Flow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl crate::oauth::Provider for Sina {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Sina
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
        let query = Serializer::new(String::new())
            .append_pair("source", &self.flow.credentials().api_key)
            .append_pair("access_token", token.access_token.expose_secret())
            .append_pair("uid", &uid)
            .finish();
        let uri = format!("{}?{}", self.flow.descriptor().user_info_endpoint()?, query);

        debug!("Fetching Sina user info for {}", uid);
        let response = self.flow.send(HttpRequest::get(uri)).await?;
        let profile = map_profile(&response.json()?)
            .ok_or_else(|| missing_field_error("id", &response.text()))?;

        info!("Fetched Sina profile {}", profile.id);
        Ok(profile)
    }
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    let id = non_empty(value, "idstr").or_else(|| non_empty(value, "id"))?;

    Some(UserProfile {
        uid: non_empty(value, "domain").unwrap_or_else(|| id.clone()),
        nickname: non_empty(value, "screen_name").unwrap_or_default(),
        avatar: non_empty(value, "avatar_large"),
        icon: non_empty(value, "profile_image_url"),
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

    fn provider(base: &str) -> Sina {
        let credentials = ProviderCredentials::new(
            "app-key".to_string(),
            SecretString::new("shh".to_string()),
            "http://localhost/connect/sina/callback".to_string(),
        );
        let transport = Arc::new(TransportBuilder::new().build().unwrap());
        Sina::new(OAuth2Flow::new(
            descriptor().rebased(base),
            credentials,
            transport,
        ))
    }

    #[test]
    fn test_map_profile_without_domain_uses_id() {
        let profile = map_profile(&json!({
            "id": 1904178193,
            "idstr": "1904178193",
            "domain": "",
            "screen_name": "weibo user",
            "profile_image_url": "http://tp2.sinaimg.cn/1904178193/50/0/1",
            "avatar_large": "http://tp2.sinaimg.cn/1904178193/180/0/1",
            "description": "bio"
        }))
        .unwrap();

        assert_eq!(profile.id, "1904178193");
        assert_eq!(profile.uid, "1904178193");
        assert_eq!(profile.nickname, "weibo user");
        assert_eq!(
            profile.avatar.as_deref(),
            Some("http://tp2.sinaimg.cn/1904178193/180/0/1")
        );
        assert_eq!(profile.intro.as_deref(), Some("bio"));
    }

    #[tokio::test]
    async fn test_fetch_profile_uses_token_uid() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/2/users/show.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("source".into(), "app-key".into()),
                Matcher::UrlEncoded("access_token".into(), "at".into()),
                Matcher::UrlEncoded("uid".into(), "1904178193".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"id":1904178193,"domain":"vanity","screen_name":"someone"}"#)
            .create_async()
            .await;

        let token =
            AccessToken::new("at".to_string(), None).with_uid(Some("1904178193".to_string()));
        let profile = provider(&server.url())
            .fetch_profile(&token, None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.id, "1904178193");
        assert_eq!(profile.uid, "vanity");
    }

    #[tokio::test]
    async fn test_fetch_profile_requires_uid() {
        let err = provider("http://127.0.0.1:9")
            .fetch_profile(&AccessToken::new("at".to_string(), None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            ErrorKind::MissingCredentialField { ref field, .. } if field == "uid"
        ));
    }

    #[tokio::test]
    async fn test_refresh_is_unsupported() {
        let err = provider("http://127.0.0.1:9").refresh("rt").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::UnsupportedOperation("refresh".to_string())
        );
    }
}
