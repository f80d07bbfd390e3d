//! Token manager with per-alias refresh locking.

use std::sync::Arc;

use dashmap::DashMap;
use log::*;
use tokio::sync::Mutex;

use super::{AccessToken, Storage};
use crate::error::{missing_field_error, token_error, Error, TokenErrorKind};
use crate::oauth::Provider;

/// Token manager that refreshes stored tokens and writes the result back to storage.
///
/// Refreshes for the same alias and provider are serialised. Providers such as Douban hand
/// out a new refresh token on every refresh and invalidate the old one, so two concurrent
/// refreshes would leave one of them holding a dead refresh token.
pub struct Manager<S: Storage> {
    storage: S,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: Storage> Manager<S> {
    /// Create a new token manager with the given storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            refresh_locks: DashMap::new(),
        }
    }

    /// Refresh the stored token of an alias through its provider and store the result.
    ///
    /// The stored secondary secret is used as the refresh token. When the provider does
    /// not return a new refresh token the old one is kept.
    ///
    /// # Returns
    ///
    /// The new access token, or an error if there is nothing to refresh or the provider
    /// rejects the refresh. Storage is left untouched on failure.
    pub async fn refresh(
        &self,
        provider: &dyn Provider,
        alias_id: &str,
    ) -> Result<AccessToken, Error> {
        let provider_id = provider.kind().as_str();
        let lock_key = format!("{}:{}", alias_id, provider_id);

        let lock = self
            .refresh_locks
            .entry(lock_key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let stored = self
            .storage
            .get(alias_id, provider_id)
            .await?
            .ok_or_else(|| token_error(TokenErrorKind::NotFound, "No token stored for alias"))?;

        let refresh_token = stored
            .secondary_secret()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing_field_error("refresh_token", ""))?
            .to_string();

        debug!("Refreshing {} token for alias {}", provider_id, alias_id);

        let mut refreshed = provider
            .refresh(&refresh_token)
            .await
            .inspect_err(|e| warn!("Refreshing token for alias {} failed: {}", alias_id, e))?;

        if refreshed.secondary_secret.is_none() {
            refreshed.secondary_secret = stored.secondary_secret.clone();
        }
        if refreshed.uid.is_none() {
            refreshed.uid = stored.uid.clone();
        }

        self.storage
            .store(alias_id, provider_id, refreshed.clone())
            .await?;

        info!("Refreshed {} token for alias {}", provider_id, alias_id);

        Ok(refreshed)
    }

    /// Store a token for an alias.
    pub async fn store_token(
        &self,
        alias_id: &str,
        provider_id: &str,
        token: AccessToken,
    ) -> Result<(), Error> {
        self.storage.store(alias_id, provider_id, token).await
    }

    /// Get the stored token for an alias.
    pub async fn get_token(
        &self,
        alias_id: &str,
        provider_id: &str,
    ) -> Result<Option<AccessToken>, Error> {
        self.storage.get(alias_id, provider_id).await
    }

    /// Delete the stored token for an alias.
    pub async fn delete_token(&self, alias_id: &str, provider_id: &str) -> Result<(), Error> {
        self.storage.delete(alias_id, provider_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TransportBuilder;
    use crate::oauth::providers;
    use crate::oauth::token::MemoryStorage;
    use crate::oauth::ProviderKind;
    use crate::{ErrorKind, ProviderCredentials};
    use mockito::{Matcher, Server};
    use secrecy::{ExposeSecret, SecretString};

    fn credentials() -> ProviderCredentials {
        ProviderCredentials::new(
            "client".to_string(),
            SecretString::new("shh".to_string()),
            "http://localhost/callback".to_string(),
        )
    }

    fn provider(kind: ProviderKind, base: &str) -> Box<dyn Provider> {
        let transport = Arc::new(TransportBuilder::new().build().unwrap());
        providers::build(kind, kind.descriptor().rebased(base), credentials(), transport)
    }

    #[tokio::test]
    async fn test_refresh_stores_rotated_tokens() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/service/auth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "old-rt".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"new-at","refresh_token":"new-rt","expires_in":604800}"#)
            .create_async()
            .await;

        let manager = Manager::new(MemoryStorage::new());
        manager
            .store_token(
                "7",
                "douban",
                AccessToken::new("old-at".to_string(), Some("old-rt".to_string()))
                    .with_uid(Some("ahbei".to_string())),
            )
            .await
            .unwrap();

        let provider = provider(ProviderKind::Douban, &server.url());
        let refreshed = manager.refresh(provider.as_ref(), "7").await.unwrap();

        mock.assert_async().await;
        assert_eq!(refreshed.access_token.expose_secret(), "new-at");

        let stored = manager.get_token("7", "douban").await.unwrap().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "new-at");
        assert_eq!(stored.secondary_secret(), Some("new-rt"));
        assert_eq!(stored.uid.as_deref(), Some("ahbei"));
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_storage_untouched() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/service/auth2/token")
            .with_status(400)
            .with_body(r#"{"code":119,"msg":"invalid_refresh_token"}"#)
            .create_async()
            .await;

        let manager = Manager::new(MemoryStorage::new());
        manager
            .store_token(
                "7",
                "douban",
                AccessToken::new("old-at".to_string(), Some("old-rt".to_string())),
            )
            .await
            .unwrap();

        let provider = provider(ProviderKind::Douban, &server.url());
        let err = manager.refresh(provider.as_ref(), "7").await.unwrap_err();
        assert_eq!(err.status(), Some(400));

        let stored = manager.get_token("7", "douban").await.unwrap().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "old-at");
    }

    #[tokio::test]
    async fn test_refresh_without_stored_token() {
        let manager = Manager::new(MemoryStorage::new());
        let provider = provider(ProviderKind::Douban, "http://127.0.0.1:9");

        let err = manager.refresh(provider.as_ref(), "7").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_refresh_on_provider_without_refresh_support() {
        let manager = Manager::new(MemoryStorage::new());
        manager
            .store_token(
                "7",
                "sina",
                AccessToken::new("at".to_string(), Some("rt".to_string())),
            )
            .await
            .unwrap();

        let provider = provider(ProviderKind::Sina, "http://127.0.0.1:9");
        let err = manager.refresh(provider.as_ref(), "7").await.unwrap_err();
        assert!(matches!(err.error_kind, ErrorKind::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn test_store_and_delete_token() {
        let manager = Manager::new(MemoryStorage::new());
        manager
            .store_token("1", "qq", AccessToken::new("at".to_string(), Some("ats".to_string())))
            .await
            .unwrap();
        assert!(manager.get_token("1", "qq").await.unwrap().is_some());

        manager.delete_token("1", "qq").await.unwrap();
        assert!(manager.get_token("1", "qq").await.unwrap().is_none());
    }
}
