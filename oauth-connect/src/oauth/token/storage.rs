//! Token storage trait for handing OAuth tokens to the caller's persistence layer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::AccessToken;
use crate::error::Error;

/// Trait for storing and retrieving access tokens.
///
/// This crate never persists tokens itself; the caller supplies an implementation backed by
/// its own account records. Tokens are keyed by the caller's account alias (the local id of
/// a linked third-party account) and the provider id.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store (insert or replace) the token for an alias and provider.
    async fn store(&self, alias_id: &str, provider_id: &str, token: AccessToken)
        -> Result<(), Error>;

    /// Retrieve the token for an alias and provider.
    ///
    /// # Returns
    ///
    /// `Some(AccessToken)` if found, `None` if not found.
    async fn get(&self, alias_id: &str, provider_id: &str) -> Result<Option<AccessToken>, Error>;

    /// Delete the token for an alias and provider. Deleting an absent token is a no-op.
    async fn delete(&self, alias_id: &str, provider_id: &str) -> Result<(), Error>;
}

/// In-process [`Storage`], mostly useful in tests and one-shot tools.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tokens: Arc<Mutex<HashMap<String, AccessToken>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(alias_id: &str, provider_id: &str) -> String {
        format!("{}:{}", alias_id, provider_id)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn store(
        &self,
        alias_id: &str,
        provider_id: &str,
        token: AccessToken,
    ) -> Result<(), Error> {
        let mut map = self.tokens.lock().await;
        map.insert(Self::key(alias_id, provider_id), token);
        Ok(())
    }

    async fn get(&self, alias_id: &str, provider_id: &str) -> Result<Option<AccessToken>, Error> {
        let map = self.tokens.lock().await;
        Ok(map.get(&Self::key(alias_id, provider_id)).cloned())
    }

    async fn delete(&self, alias_id: &str, provider_id: &str) -> Result<(), Error> {
        let mut map = self.tokens.lock().await;
        map.remove(&Self::key(alias_id, provider_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_store_and_get() {
        let storage = MemoryStorage::new();
        storage
            .store("42", "douban", AccessToken::new("at".to_string(), None))
            .await
            .unwrap();

        let token = storage.get("42", "douban").await.unwrap().unwrap();
        assert_eq!(token.access_token.expose_secret(), "at");
        assert!(storage.get("42", "sina").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = MemoryStorage::new();
        storage
            .store("42", "douban", AccessToken::new("at".to_string(), None))
            .await
            .unwrap();

        storage.delete("42", "douban").await.unwrap();
        storage.delete("42", "douban").await.unwrap();
        assert!(storage.get("42", "douban").await.unwrap().is_none());
    }
}
