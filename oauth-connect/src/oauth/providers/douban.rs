//! Douban OAuth 2.0 provider.

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

const AUTHORIZE_URI: &str = "https://www.douban.com/service/auth2/auth";
const ACCESS_TOKEN_URI: &str = "https://www.douban.com/service/auth2/token";
const USER_INFO_URI: &str = "https://api.douban.com/people/@me";

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

/// Douban provider.
///
/// Refresh tokens rotate: every refresh returns a new one and invalidates the old.
pub struct Douban {
    flow: OAuth2Flow,
}

impl Douban {
    pub fn new(flow: OAuth2Flow) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl crate::oauth::Provider for Douban {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Douban
    }

    fn flow(&self) -> Flow<'_> {
        Flow::OAuth2(&self.flow)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, Error> {
        self.flow
            .refresh_token(refresh_token, RefreshStyle::FormBody)
            .await
    }

    async fn fetch_profile(
        &self,
        token: &AccessToken,
        _uid: Option<&str>,
    ) -> Result<UserProfile, Error> {
        let uri = format!("{}?alt=json", self.flow.descriptor().user_info_endpoint()?);
        let request = HttpRequest::get(uri).with_header(
            "Authorization",
            format!("Bearer {}", token.access_token.expose_secret()),
        );

        debug!("Fetching Douban user info");
        let response = self.flow.send(request).await?;
        let profile = map_profile(&response.json()?)
            .ok_or_else(|| missing_field_error("id", &response.text()))?;

        info!("Fetched Douban profile {}", profile.uid);
        Ok(profile)
    }
}

/// Atom-style `{"$t": ...}` text node.
fn node_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|node| non_empty(node, "$t"))
}

fn map_profile(value: &Value) -> Option<UserProfile> {
    // "http://api.douban.com/people/1000001" -> "1000001"
    let id = node_text(value, "id")?
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .to_string();

    let icon = value
        .get("link")
        .and_then(Value::as_array)
        .and_then(|links| {
            links
                .iter()
                .find(|link| link.get("@rel").and_then(Value::as_str) == Some("icon"))
        })
        .and_then(|link| non_empty(link, "@href"));

    Some(UserProfile {
        uid: node_text(value, "db:uid").unwrap_or_else(|| id.clone()),
        nickname: node_text(value, "title").unwrap_or_default(),
        avatar: icon.as_ref().map(|icon| icon.replace("/icon/u", "/icon/ul")),
        icon,
        intro: node_text(value, "content"),
        signature: node_text(value, "db:signature"),
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

    const PEOPLE_ME: &str = r#"{
        "id": {"$t": "http://api.douban.com/people/1000001"},
        "db:uid": {"$t": "ahbei"},
        "title": {"$t": "阿北"},
        "link": [
            {"@rel": "self", "@href": "http://api.douban.com/people/1000001"},
            {"@rel": "alternate", "@href": "http://www.douban.com/people/ahbei/"},
            {"@rel": "icon", "@href": "http://img3.douban.com/icon/u1000001-28.jpg"}
        ],
        "content": {"$t": "douban founder"},
        "db:signature": {"$t": "hello"}
    }"#;

    fn provider(base: &str) -> Douban {
        let credentials = ProviderCredentials::new(
            "client".to_string(),
            SecretString::new("shh".to_string()),
            "http://localhost/connect/douban/callback".to_string(),
        );
        let transport = Arc::new(TransportBuilder::new().build().unwrap());
        Douban::new(OAuth2Flow::new(
            descriptor().rebased(base),
            credentials,
            transport,
        ))
    }

    #[test]
    fn test_map_profile() {
        let profile = map_profile(&serde_json::from_str(PEOPLE_ME).unwrap()).unwrap();

        assert_eq!(profile.id, "1000001");
        assert_eq!(profile.uid, "ahbei");
        assert_eq!(profile.nickname, "阿北");
        assert_eq!(
            profile.icon.as_deref(),
            Some("http://img3.douban.com/icon/u1000001-28.jpg")
        );
        assert_eq!(
            profile.avatar.as_deref(),
            Some("http://img3.douban.com/icon/ul1000001-28.jpg")
        );
        assert_eq!(profile.intro.as_deref(), Some("douban founder"));
        assert_eq!(profile.signature.as_deref(), Some("hello"));
    }

    #[test]
    fn test_map_profile_without_icon() {
        let profile = map_profile(&json!({
            "id": {"$t": "http://api.douban.com/people/2"},
            "title": {"$t": "two"}
        }))
        .unwrap();

        assert_eq!(profile.uid, "2");
        assert_eq!(profile.icon, None);
        assert_eq!(profile.avatar, None);
    }

    #[tokio::test]
    async fn test_fetch_profile_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/people/@me")
            .match_query(Matcher::UrlEncoded("alt".into(), "json".into()))
            .match_header("authorization", "Bearer at")
            .with_status(200)
            .with_body(PEOPLE_ME)
            .create_async()
            .await;

        let profile = provider(&server.url())
            .fetch_profile(&AccessToken::new("at".to_string(), None), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.uid, "ahbei");
    }

    #[tokio::test]
    async fn test_fetch_profile_with_expired_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/people/@me")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"msg":"access_token_has_expired","code":106}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .fetch_profile(&AccessToken::new("at".to_string(), None), None)
            .await
            .unwrap_err();
        assert!(matches!(err.error_kind, ErrorKind::Transport { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_refresh_posts_form_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/service/auth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "client".into()),
                Matcher::UrlEncoded("client_secret".into(), "shh".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost/connect/douban/callback".into(),
                ),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "rt".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at2","refresh_token":"rt2","douban_user_id":"1000001"}"#)
            .create_async()
            .await;

        let token = provider(&server.url()).refresh("rt").await.unwrap();

        mock.assert_async().await;
        let plain = token.into_plain();
        assert_eq!(plain.access_token, "at2");
        assert_eq!(plain.secondary_secret.as_deref(), Some("rt2"));
    }
}
