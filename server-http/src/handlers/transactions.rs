use crate::api::{ErrorResponse, ResultResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::parse_add_transaction;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

/// POST /api/v1/transactions/append
pub async fn append_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let tx = match parse_add_transaction(&headers, &body, state.routing_mode()) {
        Ok(tx) => tx,
        Err(e) => {
            warn!("Rejected transaction request: {}", e);
            return (e.status_code(), Json(ErrorResponse::new(e.to_string()))).into_response();
        }
    };

    info!(
        "APPEND: account={}, category={:?}, date={}",
        tx.currency_or_account_name, tx.category_title, tx.date
    );

    match state.transaction_service.add_transaction(&tx).await {
        Ok(()) => (StatusCode::OK, Json(ResultResponse::ok())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
