#![deny(clippy::all)]

use crate::domain::{Category, Fetched, PocketSmithTransaction, TransactionAccount, User};
use async_trait::async_trait;
use shared::Result;
use std::collections::HashMap;
use std::time::Duration;

// Ports are the pluggable seams between the resolution core and its backends

/// Redis-shaped key/value storage with per-key expiry.
/// Every write carries its TTL so a key is never stored without one.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a scalar key; `Ok(None)` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a scalar key and (re)set its expiry
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Read every field of a hash key; empty when absent or expired
    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Write one field of a hash key and (re)set the expiry of the whole key
    async fn hset(&self, key: &str, field: &str, value: String, ttl: Duration) -> Result<()>;
}

/// Port for the remote ledger API
#[async_trait]
pub trait LedgerClient: Send + Sync + 'static {
    async fn get_me(&self) -> Result<Fetched<User>>;

    async fn get_transaction_accounts(
        &self,
        user_id: i64,
    ) -> Result<Fetched<Vec<TransactionAccount>>>;

    async fn get_categories(&self, user_id: i64) -> Result<Fetched<Vec<Category>>>;

    /// Never cached; always hits the live API
    async fn create_transaction(
        &self,
        account_id: i64,
        transaction: &PocketSmithTransaction,
    ) -> Result<()>;
}
