//! In-process session carrier.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SessionCarrier;
use crate::error::Error;

/// Session carrier over a shared map.
///
/// Clones share the same underlying map, so one instance can stand in for a user's
/// server-side session across the begin and callback requests.
#[derive(Clone, Default)]
pub struct MemorySession {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCarrier for MemorySession {
    async fn set(&self, key: &str, value: String) -> Result<(), Error> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let session = MemorySession::new();
        session.set("a", "1".to_string()).await.unwrap();
        assert_eq!(session.get("a").await.unwrap(), Some("1".to_string()));

        session.delete("a").await.unwrap();
        assert_eq!(session.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let session = MemorySession::new();
        session.set("a", "1".to_string()).await.unwrap();
        session.set("a", "2".to_string()).await.unwrap();
        assert_eq!(session.get("a").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_clones_share_values() {
        let session = MemorySession::new();
        let other = session.clone();
        session.set("a", "1".to_string()).await.unwrap();
        assert_eq!(other.get("a").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let session = MemorySession::new();
        session.delete("missing").await.unwrap();
        session.delete("missing").await.unwrap();
    }
}
