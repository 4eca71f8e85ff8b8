use crate::api::{DataResponse, ItemsResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use ledger::{AccountInfo, ShortcutEntities};
use tracing::info;

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ItemsResponse<String>>, ApiError> {
    info!("LIST: categories");
    let items = state.transaction_service.list_categories().await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /api/v1/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<ItemsResponse<AccountInfo>>, ApiError> {
    info!("LIST: accounts");
    let items = state.transaction_service.list_accounts().await?;
    Ok(Json(ItemsResponse { items }))
}

/// GET /api/v1/shortcut_entities
pub async fn shortcut_entities(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<ShortcutEntities>>, ApiError> {
    info!("LIST: shortcut entities");
    let data = state.transaction_service.shortcut_entities().await?;
    Ok(Json(DataResponse { data }))
}
