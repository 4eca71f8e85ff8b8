use crate::ports::KeyValueStore;
use async_trait::async_trait;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum Stored {
    Scalar(String),
    Hash(HashMap<String, String>),
}

/// Non-expiring key/value store; records the TTL of every write
#[derive(Default)]
pub struct MemoryStore {
    pub entries: Mutex<HashMap<String, Stored>>,
    pub ttls: Mutex<HashMap<String, Duration>>,
}

impl MemoryStore {
    pub fn insert(&self, key: &str, value: Stored) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entries.lock().unwrap().get(key) {
            None => Ok(None),
            Some(Stored::Scalar(value)) => Ok(Some(value.clone())),
            Some(Stored::Hash(_)) => Err(Error::Cache(format!("WRONGTYPE {}", key))),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.insert(key, Stored::Scalar(value));
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        match self.entries.lock().unwrap().get(key) {
            None => Ok(HashMap::new()),
            Some(Stored::Hash(fields)) => Ok(fields.clone()),
            Some(Stored::Scalar(_)) => Err(Error::Cache(format!("WRONGTYPE {}", key))),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let mut fields = match entries.get(key) {
            None => HashMap::new(),
            Some(Stored::Hash(fields)) => fields.clone(),
            Some(Stored::Scalar(_)) => return Err(Error::Cache(format!("WRONGTYPE {}", key))),
        };
        fields.insert(field.to_string(), value);
        entries.insert(key.to_string(), Stored::Hash(fields));
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }
}

/// Store whose every operation fails, as an unreachable backend would
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn hget_all(&self, _key: &str) -> Result<HashMap<String, String>> {
        Err(Error::Cache("connection refused".into()))
    }

    async fn hset(&self, _key: &str, _field: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }
}
