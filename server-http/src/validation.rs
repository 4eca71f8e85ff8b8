use crate::api::{RpcRequest, ADD_TRANSACTION_METHOD};
use axum::http::{header, HeaderMap, StatusCode};
use ledger::Transaction;
use shared::config::RoutingMode;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    UnsupportedContentType,
    MalformedBody,
    UnknownMethod(String),
    MissingParams,
    MissingField(&'static str),
    MultipleDecimalSeparators,
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::MultipleDecimalSeparators => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnsupportedContentType => {
                write!(f, "Content-Type must be application/json")
            }
            ValidationError::MalformedBody => write!(f, "Request body is not a valid RPC request"),
            ValidationError::UnknownMethod(method) => {
                write!(
                    f,
                    "Unsupported method '{}'. Must be '{}'",
                    method, ADD_TRANSACTION_METHOD
                )
            }
            ValidationError::MissingParams => write!(f, "Missing params"),
            ValidationError::MissingField(field) => {
                write!(f, "Missing required field '{}'", field)
            }
            ValidationError::MultipleDecimalSeparators => {
                write!(f, "Invalid amount format: multiple decimal separators")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate the `transactions.add` envelope and turn it into a normalized [`Transaction`]
pub fn parse_add_transaction(
    headers: &HeaderMap,
    body: &[u8],
    routing_mode: RoutingMode,
) -> Result<Transaction, ValidationError> {
    if !is_json(headers) {
        return Err(ValidationError::UnsupportedContentType);
    }

    let request: RpcRequest =
        serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;

    if request.method != ADD_TRANSACTION_METHOD {
        return Err(ValidationError::UnknownMethod(request.method));
    }

    let params = request.params.ok_or(ValidationError::MissingParams)?;

    let currency = required(params.currency, "currency")?;
    let merchant = required(params.merchant, "merchant")?;
    let value = required(params.value, "value")?;
    let date = required(params.date, "date")?;

    let category_title = if params.category.is_empty() {
        if routing_mode.requires_category() {
            return Err(ValidationError::MissingField("category"));
        }
        None
    } else {
        Some(params.category)
    };

    Ok(Transaction {
        currency_or_account_name: currency,
        category_title,
        merchant,
        amount: normalize_amount(&value)?,
        date,
    })
}

/// Fold ',' into '.' and reject amounts with more than one separator
pub fn normalize_amount(raw: &str) -> Result<String, ValidationError> {
    let amount = raw.replace(',', ".");
    if amount.matches('.').count() > 1 {
        return Err(ValidationError::MultipleDecimalSeparators);
    }
    Ok(amount)
}

fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
