//! Shared application state for the Axum API server.

use std::sync::Arc;

use sqlx::PgPool;
use vestry_common::config::AppConfig;
use vestry_engine::dispatcher::NotificationDispatcher;
use vestry_engine::members::MemberStore;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub members: Arc<dyn MemberStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        members: Arc<dyn MemberStore>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            config,
            members,
            dispatcher,
        }
    }
}
