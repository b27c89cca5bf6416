//! Health check endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Public. `sms_enabled` is false when telephony credentials are missing.
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "vestry-api",
        "version": env!("CARGO_PKG_VERSION"),
        "sms_enabled": state.config.sms_enabled(),
    }))
}
