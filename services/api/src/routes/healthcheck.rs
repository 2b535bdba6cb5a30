//! Healthcheck endpoint

use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Liveness probe that also exercises the database connection
pub async fn healthcheck(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let healthy = common::database::health_check(&state.db_pool)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    if !healthy {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "Database health check failed"
        )));
    }

    Ok(ApiResponse::ok(
        json!({ "status": "ok" }),
        "Service is healthy",
    ))
}
