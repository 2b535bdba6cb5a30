//! Playlist handlers
//!
//! Playlists start private. Membership is set-union: adding a video twice
//! is a no-op, and a removed video simply disappears from the order.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::playlist::{PlaylistDetail, PlaylistRequest};
use crate::ownership::{ensure_owner, ensure_visible};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation;

/// Create a playlist
pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PlaylistRequest>,
) -> ApiResult<impl IntoResponse> {
    let (name, description) = clean_request(payload)?;

    let playlist = state
        .playlist_repository
        .insert(current_user.id, &name, &description)
        .await?;

    Ok(ApiResponse::created(
        playlist,
        "Playlist created successfully",
    ))
}

/// Fetch a playlist with its member video ids
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    let playlist = ensure_visible(playlist, current_user.id, "playlist")?;

    let video_ids = state.playlist_repository.video_ids(id).await?;

    Ok(ApiResponse::ok(
        PlaylistDetail {
            playlist,
            video_ids,
        },
        "Playlist fetched successfully",
    ))
}

/// A user's playlists; private ones appear only to their owner
pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let mut playlists = state.playlist_repository.list_for_owner(user_id).await?;
    if current_user.id != user_id {
        playlists.retain(|playlist| playlist.is_public);
    }

    Ok(ApiResponse::ok(playlists, "Playlists fetched successfully"))
}

/// Rename a playlist or change its description
pub async fn update_info(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaylistRequest>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    ensure_owner(playlist, current_user.id, "playlist")?;

    let (name, description) = clean_request(payload)?;
    let playlist = state
        .playlist_repository
        .update_info(id, &name, &description)
        .await?;

    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

/// Add a video to a playlist
pub async fn add_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, video_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    let playlist = ensure_owner(playlist, current_user.id, "playlist")?;

    if state.video_repository.find_by_id(video_id).await?.is_none() {
        return Err(ApiError::NotFound("No video found with this id".to_string()));
    }

    state.playlist_repository.add_video(id, video_id).await?;
    let video_ids = state.playlist_repository.video_ids(id).await?;

    Ok(ApiResponse::ok(
        PlaylistDetail {
            playlist,
            video_ids,
        },
        "Video added to playlist",
    ))
}

/// Remove a video from a playlist
pub async fn remove_video(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, video_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    let playlist = ensure_owner(playlist, current_user.id, "playlist")?;

    state.playlist_repository.remove_video(id, video_id).await?;
    let video_ids = state.playlist_repository.video_ids(id).await?;

    Ok(ApiResponse::ok(
        PlaylistDetail {
            playlist,
            video_ids,
        },
        "Video removed from playlist",
    ))
}

/// Flip the public/private flag
pub async fn toggle_visibility(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    ensure_owner(playlist, current_user.id, "playlist")?;

    let playlist = state.playlist_repository.toggle_visibility(id).await?;
    let message = if playlist.is_public {
        "Playlist is now public"
    } else {
        "Playlist is now private"
    };

    Ok(ApiResponse::ok(playlist, message))
}

/// Delete a playlist
pub async fn delete(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlist_repository.find_by_id(id).await?;
    ensure_owner(playlist, current_user.id, "playlist")?;

    state.playlist_repository.delete(id).await?;

    Ok(ApiResponse::ok(
        json!({ "id": id }),
        "Playlist deleted successfully",
    ))
}

fn clean_request(payload: PlaylistRequest) -> ApiResult<(String, String)> {
    let name = payload.name.trim().to_string();
    validation::validate_required(&name, "Playlist name").map_err(ApiError::validation)?;

    let name = validation::sanitize_plain(&name).map_err(ApiError::validation)?;
    let description =
        validation::sanitize_plain(payload.description.trim()).map_err(ApiError::validation)?;

    Ok((name, description))
}
