pub mod entities;
pub mod health;
pub mod transactions;

pub use entities::{list_accounts, list_categories, shortcut_entities};
pub use health::health_check;
pub use transactions::append_transaction;
