//! Resolution-and-caching core of the ledger proxy.
//!
//! Turns a normalized "add transaction" request into a PocketSmith
//! create-transaction call, resolving account and category names through a
//! cache-aside client.

pub mod cache;
pub mod domain;
pub mod pocketsmith;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use cache::LedgerCache;
pub use domain::listing::{AccountInfo, ShortcutEntities};
pub use domain::{Category, Fetched, PocketSmithTransaction, Source, Transaction, TransactionAccount, User};
pub use pocketsmith::PocketSmithClient;
pub use ports::{KeyValueStore, LedgerClient};
pub use service::TransactionService;
