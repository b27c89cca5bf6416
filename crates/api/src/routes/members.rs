//! Member listing routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use vestry_common::error::AppError;
use vestry_common::types::Member;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/members", get(list_members))
}

/// GET /api/members — List every member with their groups.
async fn list_members(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Member>>, AppError> {
    let members = state.members.list_members().await?;
    Ok(Json(members))
}
