use ledger::{LedgerCache, PocketSmithClient, TransactionService};
use shared::config::{Config, RoutingMode};
use std::sync::Arc;
use storage_engine::MokaStore;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: Arc<TransactionService>,
    pub client_auth_key: Arc<str>,
}

impl AppState {
    pub fn new(transaction_service: Arc<TransactionService>, client_auth_key: &str) -> Self {
        Self {
            transaction_service,
            client_auth_key: Arc::from(client_auth_key),
        }
    }

    /// Wire the moka store, ledger cache, PocketSmith client and service from configuration
    pub fn from_config(config: &Config) -> shared::Result<Self> {
        let store = Arc::new(MokaStore::new("ledger-cache", config.cache_max_entries));
        let cache = LedgerCache::new(store, config.cache_ttl);
        let client = PocketSmithClient::new(
            config.api_key.as_str(),
            config.base_url.as_str(),
            config.http_timeout,
            cache,
        )?;
        let service = TransactionService::new(Arc::new(client), config.routing_mode);

        Ok(Self::new(Arc::new(service), &config.client_auth_key))
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.transaction_service.routing_mode()
    }
}
