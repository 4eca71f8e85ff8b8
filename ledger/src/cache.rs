use crate::domain::{Category, TransactionAccount};
use crate::ports::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const USER_ID_KEY: &str = "user:id";
pub const DATA_FIELD: &str = "data";

pub fn accounts_key(user_id: i64) -> String {
    format!("user:{}:accounts", user_id)
}

pub fn categories_key(user_id: i64) -> String {
    format!("user:{}:categories", user_id)
}

/// Typed read-through cache for the ledger's read-mostly collections.
///
/// Reads return `None` for every kind of miss: absent or expired key, missing
/// `data` field, a value of the wrong type, or a payload that no longer
/// deserializes. Writes are best-effort and only log on failure.
#[derive(Clone)]
pub struct LedgerCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl LedgerCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_user_id(&self) -> Option<i64> {
        let raw = match self.store.get(USER_ID_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss: {}", USER_ID_KEY);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", USER_ID_KEY, e);
                return None;
            }
        };

        match raw.parse::<i64>() {
            Ok(user_id) => {
                info!("Cache hit: {} = {}", USER_ID_KEY, user_id);
                Some(user_id)
            }
            Err(e) => {
                warn!("Cached {} is not a user id ('{}'): {}", USER_ID_KEY, raw, e);
                None
            }
        }
    }

    pub async fn set_user_id(&self, user_id: i64) {
        match self
            .store
            .set(USER_ID_KEY, user_id.to_string(), self.ttl)
            .await
        {
            Ok(()) => info!(
                "Cache set: {} = {} (TTL: {} seconds)",
                USER_ID_KEY,
                user_id,
                self.ttl.as_secs()
            ),
            Err(e) => warn!("Failed to cache user id: {}", e),
        }
    }

    pub async fn get_accounts(&self, user_id: i64) -> Option<Vec<TransactionAccount>> {
        self.get_collection(&accounts_key(user_id), "accounts").await
    }

    pub async fn set_accounts(&self, user_id: i64, accounts: &[TransactionAccount]) {
        self.set_collection(&accounts_key(user_id), "accounts", accounts)
            .await
    }

    pub async fn get_categories(&self, user_id: i64) -> Option<Vec<Category>> {
        self.get_collection(&categories_key(user_id), "categories")
            .await
    }

    pub async fn set_categories(&self, user_id: i64, categories: &[Category]) {
        self.set_collection(&categories_key(user_id), "categories", categories)
            .await
    }

    async fn get_collection<T: DeserializeOwned>(&self, key: &str, label: &str) -> Option<Vec<T>> {
        let fields = match self.store.hget_all(key).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if fields.is_empty() {
            debug!("Cache miss: {}", key);
            return None;
        }

        let Some(data) = fields.get(DATA_FIELD) else {
            debug!("Cache miss: {} (no {} field)", key, DATA_FIELD);
            return None;
        };

        match serde_json::from_str::<Vec<T>>(data) {
            Ok(items) => {
                info!("Cache hit: {} ({} {})", key, items.len(), label);
                Some(items)
            }
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn set_collection<T: Serialize>(&self, key: &str, label: &str, items: &[T]) {
        let data = match serde_json::to_string(items) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize {} for {}: {}", label, key, e);
                return;
            }
        };

        match self.store.hset(key, DATA_FIELD, data, self.ttl).await {
            Ok(()) => info!(
                "Cache set: {} ({} {}, TTL: {} seconds)",
                key,
                items.len(),
                label,
                self.ttl.as_secs()
            ),
            Err(e) => warn!("Failed to cache {}: {}", key, e),
        }
    }
}

impl std::fmt::Debug for LedgerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCache")
            .field("store", &"<dyn KeyValueStore>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
