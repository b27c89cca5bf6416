pub mod announcements;
pub mod health;
pub mod members;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(announcements::router())
        .merge(members::router())
        .with_state(state)
}
