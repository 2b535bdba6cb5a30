//! Video lifecycle handlers
//!
//! Upload is a multipart form carrying `title`, `description`, a `videoFile`,
//! and a `thumbnail`. The video object is stored first (its duration is
//! probed before anything reaches the bucket); if the thumbnail then fails,
//! the already-stored video object is released so no orphan survives a
//! half-finished upload. Deletion removes the row first, then releases both
//! stored objects and reports the per-object outcome to the caller.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::page_window;
use crate::models::video::{NewVideo, UpdateVideoRequest, VideoListResponse, VideoQuery};
use crate::ownership::{ensure_owner, ensure_visible};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::{self, MediaKind};
use crate::validation;

#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    video_path: Option<PathBuf>,
    thumbnail_path: Option<PathBuf>,
}

/// Publish a new video
pub async fn upload(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = UploadForm::default();

    let collected =
        collect_upload_form(&mut multipart, &state.media_config.upload_dir, &mut form).await;

    let spooled: Vec<PathBuf> = form
        .video_path
        .iter()
        .chain(form.thumbnail_path.iter())
        .cloned()
        .collect();

    if let Err(e) = collected {
        storage::discard_all(&spooled).await;
        return Err(e);
    }

    let title = form.title.unwrap_or_default().trim().to_string();
    let description = form.description.unwrap_or_default().trim().to_string();

    let mut errors = Vec::new();
    if let Err(e) = validation::validate_required(&title, "Title") {
        errors.push(e);
    }
    if let Err(e) = validation::validate_required(&description, "Description") {
        errors.push(e);
    }
    if form.video_path.is_none() {
        errors.push("Video file is required".to_string());
    }
    if form.thumbnail_path.is_none() {
        errors.push("Thumbnail is required".to_string());
    }
    if !errors.is_empty() {
        storage::discard_all(&spooled).await;
        return Err(ApiError::validation_errors(errors));
    }

    let title = match validation::sanitize_plain(&title) {
        Ok(title) => title,
        Err(e) => {
            storage::discard_all(&spooled).await;
            return Err(ApiError::validation(e));
        }
    };
    let description = match validation::sanitize_plain(&description) {
        Ok(description) => description,
        Err(e) => {
            storage::discard_all(&spooled).await;
            return Err(ApiError::validation(e));
        }
    };

    let video_path = form.video_path.ok_or_else(|| ApiError::validation("Video file is required"))?;
    let thumbnail_path = form
        .thumbnail_path
        .ok_or_else(|| ApiError::validation("Thumbnail is required"))?;

    // Spooled files are consumed by ingest from here on.
    let video_object = match state.media_store.ingest(&video_path, MediaKind::Video).await {
        Ok(stored) => stored,
        Err(e) => {
            storage::discard_local(&thumbnail_path).await;
            return Err(e);
        }
    };

    let duration = match video_object.duration {
        Some(duration) => duration,
        None => {
            storage::discard_local(&thumbnail_path).await;
            release_best_effort(&state, &video_object.public_id, MediaKind::Video).await;
            return Err(ApiError::Upload(
                "Video duration missing after ingest".to_string(),
            ));
        }
    };

    let thumbnail_object = match state
        .media_store
        .ingest(&thumbnail_path, MediaKind::Image)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            release_best_effort(&state, &video_object.public_id, MediaKind::Video).await;
            return Err(e);
        }
    };

    let new_video = NewVideo {
        owner_id: current_user.id,
        title,
        description,
        video_url: video_object.url,
        video_public_id: video_object.public_id.clone(),
        thumbnail_url: thumbnail_object.url,
        thumbnail_public_id: thumbnail_object.public_id.clone(),
        duration,
    };

    let video = match state.video_repository.insert(new_video).await {
        Ok(video) => video,
        Err(e) => {
            release_best_effort(&state, &video_object.public_id, MediaKind::Video).await;
            release_best_effort(&state, &thumbnail_object.public_id, MediaKind::Image).await;
            return Err(ApiError::Internal(e));
        }
    };

    info!("Published video {} for user {}", video.id, current_user.id);

    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// Fetch a single video, counting the view
///
/// The view counter increments atomically with the read; repeated fetches
/// by the same caller each count. The visibility gate runs first, so a
/// rejected fetch of an unpublished video leaves the counter untouched.
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let video = state.video_repository.find_by_id(id).await?;
    ensure_visible(video, current_user.id, "video")?;

    let video = state
        .video_repository
        .fetch_counting_view(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No video found with this id".to_string()))?;

    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Paginated video listing with search, owner filter, and sorting
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
) -> ApiResult<impl IntoResponse> {
    let (items, total) = state.video_repository.list(&query).await?;
    let (page, limit, _) = page_window(query.page, query.limit);

    Ok(ApiResponse::ok(
        VideoListResponse {
            items,
            page,
            limit,
            total,
        },
        "Videos fetched successfully",
    ))
}

/// Update title and/or description
pub async fn update_info(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVideoRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.title.is_none() && payload.description.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let video = state.video_repository.find_by_id(id).await?;
    ensure_owner(video, current_user.id, "video")?;

    let title = sanitize_optional(payload.title, "Title")?;
    let description = sanitize_optional(payload.description, "Description")?;

    let video = state
        .video_repository
        .update_info(id, title.as_deref(), description.as_deref())
        .await?;

    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

/// Replace the thumbnail, releasing the superseded object
pub async fn update_thumbnail(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let video = state.video_repository.find_by_id(id).await?;
    let video = ensure_owner(video, current_user.id, "video")?;

    let mut spooled: Option<PathBuf> = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "thumbnail" {
            let path = storage::spool_upload(&mut field, &state.media_config.upload_dir).await?;
            if let Some(old) = spooled.replace(path) {
                storage::discard_local(&old).await;
            }
        }
    }

    let path = spooled.ok_or_else(|| ApiError::validation("Thumbnail file is required"))?;
    let stored = state.media_store.ingest(&path, MediaKind::Image).await?;

    let updated = match state
        .video_repository
        .update_thumbnail(id, &stored.url, &stored.public_id)
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            release_best_effort(&state, &stored.public_id, MediaKind::Image).await;
            return Err(ApiError::Internal(e));
        }
    };

    release_best_effort(&state, &video.thumbnail_public_id, MediaKind::Image).await;

    Ok(ApiResponse::ok(updated, "Thumbnail updated successfully"))
}

/// Flip the published flag
pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let video = state.video_repository.find_by_id(id).await?;
    ensure_owner(video, current_user.id, "video")?;

    let video = state.video_repository.toggle_published(id).await?;
    let message = if video.is_published {
        "Video published"
    } else {
        "Video unpublished"
    };

    Ok(ApiResponse::ok(video, message))
}

/// Delete a video
///
/// The row deletion is authoritative; releasing the two stored objects is a
/// compensating action whose per-object outcome is reported rather than
/// swallowed. A failed release leaves the request successful: the video is
/// gone either way, and the report tells the operator what leaked.
pub async fn delete(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let video = state.video_repository.find_by_id(id).await?;
    let video = ensure_owner(video, current_user.id, "video")?;

    state.video_repository.delete(id).await?;

    let cleanup = state
        .media_store
        .release_all(&[
            (video.video_public_id.as_str(), MediaKind::Video),
            (video.thumbnail_public_id.as_str(), MediaKind::Image),
        ])
        .await;

    info!("Deleted video {} for user {}", id, current_user.id);

    Ok(ApiResponse::ok(
        json!({ "id": id, "cleanup": cleanup }),
        "Video deleted successfully",
    ))
}

async fn collect_upload_form(
    multipart: &mut Multipart,
    upload_dir: &str,
    form: &mut UploadForm,
) -> ApiResult<()> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                form.title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?,
                )
            }
            "description" => {
                form.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?,
                )
            }
            "videoFile" => {
                let path = storage::spool_upload(&mut field, upload_dir).await?;
                if let Some(old) = form.video_path.replace(path) {
                    storage::discard_local(&old).await;
                }
            }
            "thumbnail" => {
                let path = storage::spool_upload(&mut field, upload_dir).await?;
                if let Some(old) = form.thumbnail_path.replace(path) {
                    storage::discard_local(&old).await;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn sanitize_optional(value: Option<String>, field: &str) -> ApiResult<Option<String>> {
    match value {
        Some(value) => {
            let value = value.trim().to_string();
            validation::validate_required(&value, field).map_err(ApiError::validation)?;
            let value = validation::sanitize_plain(&value).map_err(ApiError::validation)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn release_best_effort(state: &AppState, public_id: &str, kind: MediaKind) {
    if let Err(e) = state.media_store.release(public_id, kind).await {
        warn!("Failed to release object {}: {}", public_id, e);
    }
}
