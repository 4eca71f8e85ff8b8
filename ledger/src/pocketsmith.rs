use crate::cache::LedgerCache;
use crate::domain::{Category, Fetched, PocketSmithTransaction, TransactionAccount, User};
use crate::ports::LedgerClient;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{Error, Result};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.pocketsmith.com/v2";
const DEVELOPER_KEY_HEADER: &str = "X-Developer-Key";
const JSON: &str = "application/json";

/// PocketSmith API client with a cache-aside read path.
///
/// Reads consult the [`LedgerCache`] first and only go to the network on a
/// miss; a successful (200) response is written back before it is returned.
/// Transaction creation always goes to the live API.
pub struct PocketSmithClient {
    http: Client,
    base_url: String,
    api_key: String,
    cache: LedgerCache,
}

impl PocketSmithClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        cache: LedgerCache,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ledger-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            cache,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON resource, treating anything but 200 as a hard failure
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .header(ACCEPT, JSON)
            .header(DEVELOPER_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(|e| Error::Transport(format!("GET {} failed: {}", path, e)))?;

        let (status, body) = read_body(response, path).await?;
        if status != StatusCode::OK {
            error!(
                "PocketSmith GET {} failed with status {}: {}",
                path,
                status.as_u16(),
                body
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Serialization(format!("decode GET {} response: {}", path, e)))
    }
}

async fn read_body(response: Response, path: &str) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("read response of {}: {}", path, e)))?;
    Ok((status, body))
}

#[async_trait]
impl LedgerClient for PocketSmithClient {
    async fn get_me(&self) -> Result<Fetched<User>> {
        if let Some(id) = self.cache.get_user_id().await {
            return Ok(Fetched::cached(User { id }));
        }

        info!("Cache miss for user id, fetching from PocketSmith API");
        let user: User = self.fetch("/me").await?;
        self.cache.set_user_id(user.id).await;

        Ok(Fetched::remote(user))
    }

    async fn get_transaction_accounts(
        &self,
        user_id: i64,
    ) -> Result<Fetched<Vec<TransactionAccount>>> {
        if let Some(accounts) = self.cache.get_accounts(user_id).await {
            return Ok(Fetched::cached(accounts));
        }

        info!(
            "Cache miss for transaction accounts (user {}), fetching from PocketSmith API",
            user_id
        );
        let accounts: Vec<TransactionAccount> = self
            .fetch(&format!("/users/{}/transaction_accounts", user_id))
            .await?;
        self.cache.set_accounts(user_id, &accounts).await;

        Ok(Fetched::remote(accounts))
    }

    async fn get_categories(&self, user_id: i64) -> Result<Fetched<Vec<Category>>> {
        if let Some(categories) = self.cache.get_categories(user_id).await {
            return Ok(Fetched::cached(categories));
        }

        info!(
            "Cache miss for categories (user {}), fetching from PocketSmith API",
            user_id
        );
        let categories: Vec<Category> = self
            .fetch(&format!("/users/{}/categories", user_id))
            .await?;
        self.cache.set_categories(user_id, &categories).await;

        Ok(Fetched::remote(categories))
    }

    async fn create_transaction(
        &self,
        account_id: i64,
        transaction: &PocketSmithTransaction,
    ) -> Result<()> {
        let path = format!("/transaction_accounts/{}/transactions", account_id);
        let body = serde_json::to_vec(transaction)?;

        let response = self
            .http
            .post(self.url(&path))
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .header(DEVELOPER_KEY_HEADER, self.api_key.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("POST {} failed: {}", path, e)))?;

        let (status, body) = read_body(response, &path).await?;
        if status != StatusCode::OK && status != StatusCode::CREATED {
            error!(
                "PocketSmith POST {} failed with status {}: {}",
                path,
                status.as_u16(),
                body
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        info!("Created transaction in account {}", account_id);
        Ok(())
    }
}

impl std::fmt::Debug for PocketSmithClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketSmithClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DATA_FIELD, USER_ID_KEY, accounts_key, categories_key};
    use crate::domain::Source;
    use crate::ports::KeyValueStore;
    use crate::test_support::{FailingStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DAY: Duration = Duration::from_secs(86_400);

    fn client_for(server: &MockServer, store: Arc<dyn KeyValueStore>) -> PocketSmithClient {
        PocketSmithClient::new(
            "dev-key",
            server.uri(),
            Duration::from_secs(5),
            LedgerCache::new(store, DAY),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_me_fetches_once_then_serves_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("X-Developer-Key", "dev-key"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "login": "jo"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let first = client.get_me().await.unwrap();
        assert_eq!(first, Fetched::remote(User { id: 42 }));

        let second = client.get_me().await.unwrap();
        assert_eq!(second, Fetched::cached(User { id: 42 }));
        assert_eq!(store.get(USER_ID_KEY).await.unwrap(), Some("42".to_string()));
    }

    #[tokio::test]
    async fn test_accounts_are_fetched_from_network_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/transaction_accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "USD General", "currency_code": "usd"},
                {"id": 2, "name": "ARS Savings", "currency_code": "ars"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let first = client.get_transaction_accounts(42).await.unwrap();
        assert_eq!(first.source, Source::Remote);
        assert_eq!(first.data.len(), 2);

        let second = client.get_transaction_accounts(42).await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.data, first.data);
        assert_eq!(store.ttl_of(&accounts_key(42)), Some(DAY));
    }

    #[tokio::test]
    async fn test_categories_populate_cache_on_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 10, "title": "Groceries", "parent_id": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let fetched = client.get_categories(42).await.unwrap();
        assert_eq!(fetched.data[0].title, "Groceries");

        let fields = store.hget_all(&categories_key(42)).await.unwrap();
        assert!(fields.contains_key(DATA_FIELD));
    }

    #[tokio::test]
    async fn test_non_200_read_is_upstream_error_and_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/transaction_accounts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"bad key\"}"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let err = client.get_transaction_accounts(42).await.unwrap_err();
        match err {
            Error::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert!(!store.contains(&accounts_key(42)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let err = client.get_me().await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(!store.contains(USER_ID_KEY));
    }

    #[tokio::test]
    async fn test_unreachable_cache_falls_back_to_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(FailingStore));

        assert_eq!(client.get_me().await.unwrap().data.id, 5);
        assert_eq!(client.get_me().await.unwrap().data.id, 5);
    }

    #[tokio::test]
    async fn test_create_transaction_posts_json_and_accepts_201() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transaction_accounts/3/transactions"))
            .and(header("content-type", "application/json"))
            .and(header("X-Developer-Key", "dev-key"))
            .and(body_json(json!({
                "payee": "Store",
                "amount": "-42.50",
                "date": "2025-01-13",
                "is_transfer": false,
                "category_id": 10
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 999})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::default());
        let client = client_for(&server, store.clone());

        let tx = PocketSmithTransaction {
            payee: "Store".into(),
            amount: "-42.50".into(),
            date: "2025-01-13".into(),
            is_transfer: false,
            category_id: Some(10),
        };
        client.create_transaction(3, &tx).await.unwrap();

        // Transactions never touch the cache
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_transaction_failure_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transaction_accounts/3/transactions"))
            .respond_with(ResponseTemplate::new(422).set_body_string("amount is invalid"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryStore::default()));
        let tx = PocketSmithTransaction {
            payee: "Store".into(),
            amount: "abc".into(),
            date: "2025-01-13".into(),
            is_transfer: false,
            category_id: None,
        };

        let err = client.create_transaction(3, &tx).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 422, ref body } if body == "amount is invalid"));
        assert!(!err.is_client_error());
    }
}
