//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use crate::ui::state::AppState;

/// Health check endpoint
///
/// Reports whether the message store is reachable. The body is plain text.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.check_health_usecase.execute().await {
        Ok(()) => (StatusCode::OK, "Message store connection is healthy"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Message store connection failed",
            )
        }
    }
}
