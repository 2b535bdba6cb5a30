//! Tweet handlers
//!
//! Tweets keep basic inline formatting (bold, italics) but nothing else;
//! content is bounded at 280 characters. Private tweets are visible to
//! their author only.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::tweet::{CreateTweetRequest, UpdateTweetRequest};
use crate::ownership::{ensure_owner, ensure_visible};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

/// Post a tweet
pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateTweetRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = clean_content(&payload.content)?;
    let is_public = payload.is_public.unwrap_or(true);

    let tweet = state
        .tweet_repository
        .insert(current_user.id, &content, is_public)
        .await?;

    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

/// Fetch a single tweet; private tweets are visible to their author only
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let tweet = state.tweet_repository.find_by_id(id).await?;
    let tweet = ensure_visible(tweet, current_user.id, "tweet")?;

    Ok(ApiResponse::ok(tweet, "Tweet fetched successfully"))
}

/// A user's tweets, newest first
///
/// Private tweets appear only when the caller asks for their own feed.
pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if state.user_repository.find_by_id(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User does not exist".to_string()));
    }

    let include_private = current_user.id == user_id;
    let tweets = state
        .tweet_repository
        .list_for_user(user_id, include_private)
        .await?;

    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

/// Edit a tweet's content
pub async fn update(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTweetRequest>,
) -> ApiResult<impl IntoResponse> {
    let tweet = state.tweet_repository.find_by_id(id).await?;
    ensure_owner(tweet, current_user.id, "tweet")?;

    let content = clean_content(&payload.content)?;
    let tweet = state.tweet_repository.update_content(id, &content).await?;

    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

/// Delete a tweet
pub async fn delete(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let tweet = state.tweet_repository.find_by_id(id).await?;
    ensure_owner(tweet, current_user.id, "tweet")?;

    state.tweet_repository.delete(id).await?;

    Ok(ApiResponse::ok(
        json!({ "id": id }),
        "Tweet deleted successfully",
    ))
}

fn clean_content(raw: &str) -> ApiResult<String> {
    let content = raw.trim();
    validation::validate_tweet_content(content).map_err(ApiError::validation)?;
    validation::sanitize_markup(content).map_err(ApiError::validation)
}
