use serde::Deserialize;

pub const ADD_TRANSACTION_METHOD: &str = "transactions.add";

/// RPC-style envelope: `{"method": "transactions.add", "params": {...}}`
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Option<TransactionParams>,
}

/// Missing fields deserialize as empty strings and are rejected by validation
#[derive(Debug, Default, Deserialize)]
pub struct TransactionParams {
    /// Account name or currency code, depending on the routing mode
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub date: String,
}
