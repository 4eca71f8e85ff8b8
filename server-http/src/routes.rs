use crate::handlers;
use crate::middleware::require_bearer_token;
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/transactions/append",
            post(handlers::append_transaction),
        )
        .route("/accounts", get(handlers::list_accounts))
        .route("/categories", get(handlers::list_categories))
        .route("/shortcut_entities", get(handlers::shortcut_entities))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        // Middleware: method, uri and final status of every request at info
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Router wrapped so trailing slashes are trimmed before route matching
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_router(state))
}
