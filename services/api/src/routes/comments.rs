//! Comment handlers
//!
//! Comments attach to exactly one parent, a video or a tweet. Creation
//! verifies the parent exists; update and delete are kind-agnostic and only
//! check ownership.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::comment::{CommentListResponse, CommentRequest};
use crate::models::{ParentRef, page_window};
use crate::ownership::ensure_owner;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Comment on a video
pub async fn add_to_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.video_repository.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("No video found with this id".to_string()));
    }

    add_comment(&state, current_user.id, ParentRef::Video(id), payload).await
}

/// Comment on a tweet
pub async fn add_to_tweet(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.tweet_repository.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("No tweet found with this id".to_string()));
    }

    add_comment(&state, current_user.id, ParentRef::Tweet(id), payload).await
}

/// A video's comments, newest first
pub async fn list_for_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    list_comments(&state, ParentRef::Video(id), query).await
}

/// A tweet's comments, newest first
pub async fn list_for_tweet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    list_comments(&state, ParentRef::Tweet(id), query).await
}

/// Edit a comment's content
pub async fn update(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.comment_repository.find_by_id(id).await?;
    ensure_owner(comment, current_user.id, "comment")?;

    let content = clean_content(&payload.content)?;
    let comment = state.comment_repository.update_content(id, &content).await?;

    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

/// Delete a comment
pub async fn delete(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.comment_repository.find_by_id(id).await?;
    ensure_owner(comment, current_user.id, "comment")?;

    state.comment_repository.delete(id).await?;

    Ok(ApiResponse::ok(
        json!({ "id": id }),
        "Comment deleted successfully",
    ))
}

async fn add_comment(
    state: &AppState,
    owner_id: Uuid,
    parent: ParentRef,
    payload: CommentRequest,
) -> ApiResult<ApiResponse<crate::models::Comment>> {
    let content = clean_content(&payload.content)?;
    let comment = state
        .comment_repository
        .insert(owner_id, &content, parent)
        .await?;

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

async fn list_comments(
    state: &AppState,
    parent: ParentRef,
    query: PageQuery,
) -> ApiResult<ApiResponse<CommentListResponse>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let (items, total) = state
        .comment_repository
        .list_for_parent(parent, limit, offset)
        .await?;

    Ok(ApiResponse::ok(
        CommentListResponse {
            items,
            page,
            limit,
            total,
        },
        "Comments fetched successfully",
    ))
}

fn clean_content(raw: &str) -> ApiResult<String> {
    let content = raw.trim();
    validation::validate_required(content, "Comment content").map_err(ApiError::validation)?;
    validation::sanitize_plain(content).map_err(ApiError::validation)
}
