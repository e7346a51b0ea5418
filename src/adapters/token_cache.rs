use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Caches downstream tokens per service identity. Only the token and its
/// expiry are stored, never the secret used to obtain it.
///
/// A zero TTL disables the cache: `get` always misses and `insert` is a no-op.
#[derive(Debug, Clone)]
pub struct DownstreamTokenCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl DownstreamTokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, identity: &str) -> Option<String> {
        self.get_at(identity, Utc::now()).await
    }

    pub async fn get_at(&self, identity: &str, now: DateTime<Utc>) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        entries
            .get(identity)
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    pub async fn insert(&self, identity: &str, token: String) {
        self.insert_at(identity, token, Utc::now()).await
    }

    pub async fn insert_at(&self, identity: &str, token: String, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }

        // TTL 超出 chrono 可表示的範圍時不快取
        let Some(expires_at) = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
        else {
            warn!("Token cache TTL {:?} is out of range; not caching", self.ttl);
            return;
        };

        let mut entries = self.entries.write().await;
        entries.insert(identity.to_string(), CachedToken { token, expires_at });
        debug!("Cached downstream token for {} until {}", identity, expires_at);
    }

    pub async fn invalidate(&self, identity: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(identity).is_some() {
            debug!("Invalidated downstream token for {}", identity);
        }
    }
}

impl Default for DownstreamTokenCache {
    fn default() -> Self {
        Self::disabled()
    }
}
