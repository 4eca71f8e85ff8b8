//! Storage adapters for the ledger cache port.

pub mod moka_store;

pub use moka_store::MokaStore;
