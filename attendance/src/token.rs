//! Bearer credential source consulted before every backend call.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, or `None` when the user is signed out.
    async fn access_token(&self) -> Option<String>;
}

/// In-process token holder.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(normalize(token))),
        }
    }

    /// Seeds the store from the configured `ACCESS_TOKEN`.
    pub fn from_config(cfg: &util::config::AppConfig) -> Self {
        Self::with_token(cfg.access_token.clone())
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.token.write().await = normalize(Some(token.into()));
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

fn normalize(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
