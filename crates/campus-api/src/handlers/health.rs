//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use campus_service::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
///
/// Succeeds whenever the process is up.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
///
/// 503 until both Postgres and Redis answer, so orchestrators keep
/// traffic off the instance until its dependencies are reachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let postgres_up = state.services.pool().acquire().await.is_ok();
    let redis_up = state.services.redis_pool().health_check().await.is_ok();

    let status = if postgres_up && redis_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse::ready(postgres_up, redis_up)))
}
