use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Constant-time token comparison
fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Authentication middleware for the client-facing API
pub async fn require_bearer_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .is_some_and(|token| tokens_match(&state.client_auth_key, token));

    if !authorized {
        warn!(
            "Invalid client auth for {} {}",
            request.method(),
            request.uri().path()
        );
        return Err((StatusCode::FORBIDDEN, "Forbidden").into_response());
    }

    Ok(next.run(request).await)
}
