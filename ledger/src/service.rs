use crate::domain::listing::{AccountInfo, ShortcutEntities};
use crate::domain::{
    Category, Fetched, PocketSmithTransaction, Transaction, TransactionAccount,
};
use crate::ports::LedgerClient;
use shared::config::RoutingMode;
use shared::{Error, LookupTarget, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Case-insensitive comparison form for account names, currency codes and category titles
pub fn normalize(value: &str) -> String {
    value.to_lowercase()
}

/// Resolves human-readable names against the ledger and creates transactions
pub struct TransactionService {
    client: Arc<dyn LedgerClient>,
    routing_mode: RoutingMode,
}

impl TransactionService {
    pub fn new(client: Arc<dyn LedgerClient>, routing_mode: RoutingMode) -> Self {
        Self {
            client,
            routing_mode,
        }
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.routing_mode
    }

    /// Resolve the target account (and category) by name and create the transaction
    pub async fn add_transaction(&self, tx: &Transaction) -> Result<()> {
        let account_lookup = normalize(&tx.currency_or_account_name);
        let category_lookup = tx.category_title.as_deref().map(normalize);

        if category_lookup.is_none() && self.routing_mode.requires_category() {
            return Err(Error::Validation(
                "a category is required when routing by account name".to_string(),
            ));
        }

        let user_id = self.resolve_user_id().await?;
        let (accounts, categories) = self.fetch_collections(user_id).await?;

        let account_id = self.find_account(&accounts, &account_lookup, tx)?;
        // Currency routing never resolves a category, even when one is supplied
        let category_id = match (&category_lookup, &tx.category_title) {
            (Some(lookup), Some(title)) if self.routing_mode.requires_category() => {
                Some(find_category(&categories, lookup, title)?)
            }
            _ => None,
        };

        let transaction = PocketSmithTransaction {
            payee: tx.merchant.clone(),
            amount: tx.amount.clone(),
            date: tx.date.clone(),
            is_transfer: false,
            category_id,
        };

        self.client
            .create_transaction(account_id, &transaction)
            .await
            .inspect_err(|e| error!("Failed to create transaction in account {}: {}", account_id, e))
    }

    /// Every category title in the flattened tree, sorted ascending
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let user_id = self.resolve_user_id().await?;
        let categories = self
            .client
            .get_categories(user_id)
            .await
            .inspect_err(|e| error!("Failed to get categories: {}", e))?;

        Ok(category_titles(&categories.data))
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let user_id = self.resolve_user_id().await?;
        let accounts = self
            .client
            .get_transaction_accounts(user_id)
            .await
            .inspect_err(|e| error!("Failed to get transaction accounts: {}", e))?;

        Ok(account_infos(&accounts.data))
    }

    /// Accounts and category titles in one call, fetched concurrently
    pub async fn shortcut_entities(&self) -> Result<ShortcutEntities> {
        let user_id = self.resolve_user_id().await?;
        let (accounts, categories) = self.fetch_collections(user_id).await?;

        Ok(ShortcutEntities {
            accounts: account_infos(&accounts.data),
            categories: category_titles(&categories.data),
        })
    }

    async fn resolve_user_id(&self) -> Result<i64> {
        let user = self
            .client
            .get_me()
            .await
            .inspect_err(|e| error!("Failed to get user info: {}", e))?;
        Ok(user.data.id)
    }

    /// Fan out both collection reads and join; the first failure wins and the other result is dropped
    async fn fetch_collections(
        &self,
        user_id: i64,
    ) -> Result<(Fetched<Vec<TransactionAccount>>, Fetched<Vec<Category>>)> {
        tokio::try_join!(
            self.client.get_transaction_accounts(user_id),
            self.client.get_categories(user_id),
        )
        .inspect_err(|e| error!("Failed to get accounts and categories for user {}: {}", user_id, e))
    }

    fn find_account(
        &self,
        accounts: &Fetched<Vec<TransactionAccount>>,
        lookup: &str,
        tx: &Transaction,
    ) -> Result<i64> {
        let (target, found) = match self.routing_mode {
            RoutingMode::AccountName => (
                LookupTarget::AccountName,
                accounts.data.iter().find(|a| normalize(&a.name) == lookup),
            ),
            RoutingMode::CurrencyCode => (
                LookupTarget::CurrencyCode,
                accounts
                    .data
                    .iter()
                    .find(|a| normalize(&a.currency_code) == lookup),
            ),
        };

        match found {
            Some(account) => {
                info!(
                    "Resolved '{}' to transaction account {} ({})",
                    tx.currency_or_account_name, account.id, account.name
                );
                Ok(account.id)
            }
            None => {
                warn!(
                    "No transaction account found with {}: '{}' (searched among {} accounts from {})",
                    target.field(),
                    tx.currency_or_account_name,
                    accounts.data.len(),
                    accounts.source
                );
                Err(Error::lookup(target, tx.currency_or_account_name.clone()))
            }
        }
    }
}

/// Flat title match anywhere in the tree; no "Parent > Child" paths
fn find_category(categories: &Fetched<Vec<Category>>, lookup: &str, title: &str) -> Result<i64> {
    let flat = Category::flatten(&categories.data);
    match flat.iter().find(|c| normalize(&c.title) == lookup) {
        Some(category) => Ok(category.id),
        None => {
            warn!(
                "No category found with title: '{}' (searched among {} categories from {})",
                title,
                flat.len(),
                categories.source
            );
            Err(Error::lookup(LookupTarget::CategoryTitle, title))
        }
    }
}

fn category_titles(categories: &[Category]) -> Vec<String> {
    let mut titles: Vec<String> = Category::flatten(categories)
        .into_iter()
        .map(|c| c.title.clone())
        .collect();
    titles.sort();
    titles
}

fn account_infos(accounts: &[TransactionAccount]) -> Vec<AccountInfo> {
    accounts
        .iter()
        .map(|a| AccountInfo {
            name: a.name.clone(),
            currency: a.currency_code.clone(),
        })
        .collect()
}
