//! REST server assembly.
//!
//! Connects the backing stores, applies schema migrations, and stacks the
//! route tree behind the shared middleware.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use campus_cache::RedisPool;
use campus_common::{AppConfig, AppError};
use campus_core::SnowflakeGenerator;
use campus_db::{
    run_migrations, DatabaseConfig, PgConnectionRepository, PgMessageRepository,
    PgParticipantRepository, PgProfileRepository, PgReceiptRepository, PgRoomRepository,
};
use campus_service::ServiceContextBuilder;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// The complete application: routes, middleware, and static file serving.
///
/// Health probes and the public file tree mount outside the rate-limited
/// stack; everything else goes through it.
pub fn router(state: AppState) -> Router {
    let config = &state.config;
    let max_upload_bytes = config.storage.max_file_size_bytes() as usize;
    let upload_dir = config.storage.upload_dir.clone();

    let api = create_router(max_upload_bytes);
    let api = apply_middleware(
        api,
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    health_routes()
        .merge(api)
        .nest_service("/files", ServeDir::new(upload_dir))
        .with_state(state)
}

/// Connect to Postgres and Redis, migrate the schema, and assemble the
/// shared state.
///
/// The API is the only process that applies migrations; the gateway
/// expects the schema to already be in place.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    let pool = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..DatabaseConfig::default()
    }
    .connect()
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;
    info!(max = config.database.max_connections, "Postgres ready, schema current");

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

    Ok(AppState::new(services, config))
}

/// Bring the API up on the configured address and serve until shutdown.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = build_state(config).await?;
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Cannot bind {addr}: {e}")))?;
    info!("API listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}
