use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAccount {
    pub id: i64,
    pub name: String,
    pub currency_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Category>,
}

impl Category {
    /// Depth-first flattening of a category forest, parents before their children
    pub fn flatten(categories: &[Category]) -> Vec<&Category> {
        let mut flat = Vec::with_capacity(categories.len());
        for category in categories {
            flat.push(category);
            flat.extend(Category::flatten(&category.children));
        }
        flat
    }
}

/// Normalized transaction handed over by the request adapter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub currency_or_account_name: String,
    pub category_title: Option<String>,
    pub merchant: String,
    /// Decimal separator already folded to '.'
    pub amount: String,
    pub date: String,
}

/// Body of `POST /transaction_accounts/{id}/transactions`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketSmithTransaction {
    pub payee: String,
    pub amount: String,
    pub date: String,
    pub is_transfer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Where a fetched value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Cache,
    Remote,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Cache => f.write_str("cache"),
            Source::Remote => f.write_str("remote"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: Source,
}

impl<T> Fetched<T> {
    pub fn cached(data: T) -> Self {
        Self {
            data,
            source: Source::Cache,
        }
    }

    pub fn remote(data: T) -> Self {
        Self {
            data,
            source: Source::Remote,
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

pub mod listing {
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct AccountInfo {
        pub name: String,
        pub currency: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct ShortcutEntities {
        pub accounts: Vec<AccountInfo>,
        pub categories: Vec<String>,
    }
}
