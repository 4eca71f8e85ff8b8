use async_trait::async_trait;
use ledger::ports::KeyValueStore;
use moka::Expiry;
use moka::future::Cache;
use shared::{Error, Result};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone, Debug)]
enum StoredValue {
    Scalar(String),
    Hash(HashMap<String, String>),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Scalar(_) => "string",
            StoredValue::Hash(_) => "hash",
        }
    }
}

#[derive(Clone, Debug)]
struct StoredEntry {
    value: StoredValue,
    ttl: Duration,
}

/// Expires each key after the TTL it was last written with
struct PerKeyTtl;

impl Expiry<String, StoredEntry> for PerKeyTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

fn wrong_type(key: &str, found: &StoredValue, wanted: &str) -> Error {
    Error::Cache(format!(
        "WRONGTYPE key '{}' holds a {}, not a {}",
        key,
        found.type_name(),
        wanted
    ))
}

/// Moka-based key/value store with Redis-like scalar and hash values
/// and per-key expiry. Lock-free and safe to share across requests.
pub struct MokaStore {
    cache: Cache<String, StoredEntry>,
}

impl MokaStore {
    /// Create a store, optionally bounded to `max_entries` keys
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(PerKeyTtl);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new("ledger-cache", None)
    }
}

#[async_trait]
impl KeyValueStore for MokaStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.cache.get(key).await {
            Some(entry) => match entry.value {
                StoredValue::Scalar(value) => Ok(Some(value)),
                other => Err(wrong_type(key, &other, "string")),
            },
            None => Ok(None), // Either doesn't exist or TTL expired
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.cache
            .insert(
                key.to_string(),
                StoredEntry {
                    value: StoredValue::Scalar(value),
                    ttl,
                },
            )
            .await;
        debug!("SET {} (TTL: {} seconds)", key, ttl.as_secs());
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        match self.cache.get(key).await {
            Some(entry) => match entry.value {
                StoredValue::Hash(fields) => Ok(fields),
                other => Err(wrong_type(key, &other, "hash")),
            },
            None => Ok(HashMap::new()),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: String, ttl: Duration) -> Result<()> {
        // Read-modify-write without a guard; concurrent writers resolve last-writer-wins
        let mut fields = match self.cache.get(key).await {
            Some(entry) => match entry.value {
                StoredValue::Hash(fields) => fields,
                other => return Err(wrong_type(key, &other, "hash")),
            },
            None => HashMap::new(),
        };
        fields.insert(field.to_string(), value);

        self.cache
            .insert(
                key.to_string(),
                StoredEntry {
                    value: StoredValue::Hash(fields),
                    ttl,
                },
            )
            .await;
        debug!("HSET {} {} (TTL: {} seconds)", key, field, ttl.as_secs());
        Ok(())
    }
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
