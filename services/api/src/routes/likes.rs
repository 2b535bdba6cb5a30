//! Like toggle handlers
//!
//! One toggle endpoint per target kind. The target must exist; the toggle
//! itself is idempotent per state, so replays settle on the intended side.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Extension;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::LikeTarget;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Toggle the caller's like on a video
pub async fn toggle_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    toggle(&state, current_user.id, LikeTarget::Video(id)).await
}

/// Toggle the caller's like on a comment
pub async fn toggle_comment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    toggle(&state, current_user.id, LikeTarget::Comment(id)).await
}

/// Toggle the caller's like on a tweet
pub async fn toggle_tweet(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    toggle(&state, current_user.id, LikeTarget::Tweet(id)).await
}

/// Videos the caller has liked, newest like first
pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let videos = state.like_repository.liked_videos(current_user.id).await?;

    Ok(ApiResponse::ok(
        videos,
        "Liked videos fetched successfully",
    ))
}

/// Total likes on a video
pub async fn video_like_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let target = LikeTarget::Video(id);
    if !state.like_repository.target_exists(target).await? {
        return Err(not_found(target));
    }

    let count = state.like_repository.count_for(target).await?;

    Ok(ApiResponse::ok(
        json!({ "likesCount": count }),
        "Like count fetched successfully",
    ))
}

async fn toggle(
    state: &AppState,
    caller: Uuid,
    target: LikeTarget,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    if !state.like_repository.target_exists(target).await? {
        return Err(not_found(target));
    }

    let liked = state.like_repository.toggle(caller, target).await?;
    let message = if liked { "Liked" } else { "Like removed" };

    Ok(ApiResponse::ok(json!({ "liked": liked }), message))
}

fn not_found(target: LikeTarget) -> ApiError {
    ApiError::NotFound(format!("No {} found with this id", target.kind()))
}
