//! Gateway server assembly.
//!
//! Wires configuration, Postgres, Redis, and the event dispatcher into an
//! axum application serving the `/gateway` WebSocket endpoint.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use campus_cache::RedisPool;
use campus_common::{AppConfig, AppError};
use campus_core::SnowflakeGenerator;
use campus_db::{
    DatabaseConfig, PgConnectionRepository, PgMessageRepository, PgParticipantRepository,
    PgProfileRepository, PgReceiptRepository, PgRoomRepository,
};
use campus_service::ServiceContextBuilder;

use crate::broadcast::{EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;

/// Routes plus middleware, ready to serve.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect to Postgres and Redis and assemble the shared gateway state.
///
/// The event dispatcher is started before this returns, so the process is
/// already subscribed to the broadcast channel when the first socket
/// arrives.
pub async fn build_state(config: AppConfig) -> Result<GatewayState, AppError> {
    let pool = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..DatabaseConfig::default()
    }
    .connect()
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!(max = config.database.max_connections, "Postgres pool ready");

    let redis = RedisPool::shared((&config.redis).into())
        .map_err(|e| AppError::Cache(e.to_string()))?;

    let ids = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let services = ServiceContextBuilder::new()
        .pool(pool.clone())
        .redis_pool(redis)
        .profile_repo(Arc::new(PgProfileRepository::new(pool.clone())))
        .room_repo(Arc::new(PgRoomRepository::new(pool.clone())))
        .participant_repo(Arc::new(PgParticipantRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .receipt_repo(Arc::new(PgReceiptRepository::new(pool.clone())))
        .connection_repo(Arc::new(PgConnectionRepository::new(pool)))
        .snowflake_generator(ids)
        .chat(config.chat.clone())
        .storage(config.storage.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let connections = ConnectionManager::new_shared();

    let dispatcher = EventDispatcher::new(
        EventDispatcherConfig {
            redis_url: config.redis.url.clone(),
            ..EventDispatcherConfig::default()
        },
        connections.clone(),
    )
    .await
    .map_err(|e| AppError::Cache(format!("Event dispatcher startup failed: {e}")))?;

    let dispatcher = Arc::new(dispatcher);
    dispatcher.clone().start();

    Ok(GatewayState::new(services, connections, dispatcher, config))
}

/// Bring the gateway up on the configured address and serve until shutdown.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let state = build_state(config).await?;
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Cannot bind {addr}: {e}")))?;
    tracing::info!("Gateway listening on ws://{addr}/gateway");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}
