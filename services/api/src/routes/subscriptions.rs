//! Subscription handlers
//!
//! Subscribing to your own channel is rejected outright; the database keeps
//! the same rule as a CHECK constraint.

use axum::Extension;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Toggle the caller's subscription to a channel
pub async fn toggle(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(channel_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if channel_id == current_user.id {
        return Err(ApiError::validation(
            "You cannot subscribe to your own channel",
        ));
    }

    if state.user_repository.find_by_id(channel_id).await?.is_none() {
        return Err(ApiError::NotFound("Channel does not exist".to_string()));
    }

    let subscribed = state
        .subscription_repository
        .toggle(current_user.id, channel_id)
        .await?;

    let message = if subscribed {
        "Subscribed"
    } else {
        "Unsubscribed"
    };

    Ok(ApiResponse::ok(json!({ "subscribed": subscribed }), message))
}

/// Channels the caller subscribes to
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let channels = state
        .subscription_repository
        .subscribed_channels(current_user.id)
        .await?;

    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}

/// Number of subscribers a channel has
pub async fn subscriber_count(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if state.user_repository.find_by_id(channel_id).await?.is_none() {
        return Err(ApiError::NotFound("Channel does not exist".to_string()));
    }

    let count = state
        .subscription_repository
        .subscriber_count(channel_id)
        .await?;

    Ok(ApiResponse::ok(
        json!({ "subscribersCount": count }),
        "Subscriber count fetched successfully",
    ))
}
