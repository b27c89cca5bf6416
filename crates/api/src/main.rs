//! Vestry API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vestry_common::config::AppConfig;
use vestry_common::db::{create_pool, migrate};
use vestry_engine::dispatcher::{DispatchSettings, NotificationDispatcher};
use vestry_engine::members::PgMemberStore;
use vestry_notifier::{SmsSender, TwilioSmsSender, UnconfiguredSmsSender};

use vestry_api::routes::create_router;
use vestry_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "vestry_api=debug,vestry_engine=debug,vestry_notifier=info,tower_http=debug",
            )
        }))
        .init();

    tracing::info!("Starting Vestry API server...");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    migrate(&pool).await?;

    let sender: Arc<dyn SmsSender> = match TwilioSmsSender::from_config(&config)? {
        Some(twilio) if config.sms_enabled() => {
            tracing::info!("SMS delivery enabled");
            Arc::new(twilio)
        }
        _ => {
            tracing::warn!(
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER are not all set; SMS sends will fail"
            );
            Arc::new(UnconfiguredSmsSender)
        }
    };

    let dispatcher = Arc::new(NotificationDispatcher::new(
        sender,
        DispatchSettings::from_config(&config),
    ));
    let members = Arc::new(PgMemberStore::new(pool.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let state = AppState::new(pool, config, members, dispatcher);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
