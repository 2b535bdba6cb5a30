//! Channel dashboard handlers

use axum::Extension;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Aggregated stats for the caller's channel
pub async fn channel_stats(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let stats = state
        .dashboard_repository
        .channel_stats(current_user.id)
        .await?;

    Ok(ApiResponse::ok(
        stats,
        "Channel stats fetched successfully",
    ))
}
