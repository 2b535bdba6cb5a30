//! Account and session handlers
//!
//! Registration is a multipart form (profile fields plus an avatar image and
//! an optional cover image). Credentials travel as httpOnly cookies with a
//! JSON fallback for non-browser clients. A user has at most one active
//! refresh token; rotation is compare-and-swap against the stored value, so
//! a replayed refresh token logs the session out instead of forking it.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::jwt::TokenPair;
use crate::middleware::{ACCESS_TOKEN_COOKIE, CurrentUser, REFRESH_TOKEN_COOKIE};
use crate::models::user::{
    ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterForm, UpdateAccountRequest,
    UserResponse,
};
use crate::repositories::user::NewUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::{self, MediaKind};
use crate::validation;

/// Register a new user from a multipart form
///
/// Field names: `username`, `email`, `fullName`, `password`, plus file
/// fields `avatar` (required) and `coverImage` (optional). Spooled files
/// are removed on every failure path; stored objects are released if the
/// row insert fails afterwards.
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = RegisterForm::default();
    let mut avatar_path: Option<PathBuf> = None;
    let mut cover_path: Option<PathBuf> = None;

    let collected = collect_register_form(
        &mut multipart,
        &state.media_config.upload_dir,
        &mut form,
        &mut avatar_path,
        &mut cover_path,
    )
    .await;

    let spooled: Vec<PathBuf> = avatar_path.iter().chain(cover_path.iter()).cloned().collect();

    if let Err(e) = collected {
        storage::discard_all(&spooled).await;
        return Err(e);
    }

    let mut errors = Vec::new();
    let username = form.username.unwrap_or_default().trim().to_lowercase();
    let email = form.email.unwrap_or_default().trim().to_lowercase();
    let full_name = form.full_name.unwrap_or_default().trim().to_string();
    let password = form.password.unwrap_or_default();

    if let Err(e) = validation::validate_username(&username) {
        errors.push(e);
    }
    if let Err(e) = validation::validate_email(&email) {
        errors.push(e);
    }
    if let Err(e) = validation::validate_required(&full_name, "Full name") {
        errors.push(e);
    }
    if let Err(e) = validation::validate_password(&password) {
        errors.push(e);
    }
    if avatar_path.is_none() {
        errors.push("Avatar image is required".to_string());
    }

    if !errors.is_empty() {
        storage::discard_all(&spooled).await;
        return Err(ApiError::validation_errors(errors));
    }

    let taken = match state.user_repository.identifier_taken(&username, &email).await {
        Ok(taken) => taken,
        Err(e) => {
            storage::discard_all(&spooled).await;
            return Err(ApiError::Internal(e));
        }
    };
    if taken {
        storage::discard_all(&spooled).await;
        return Err(ApiError::validation(
            "User with this email or username already exists",
        ));
    }

    // Past this point every spooled file is consumed (and removed) by ingest.
    let avatar_path = avatar_path.ok_or_else(|| ApiError::validation("Avatar image is required"))?;
    let avatar = match state.media_store.ingest(&avatar_path, MediaKind::Image).await {
        Ok(stored) => stored,
        Err(e) => {
            if let Some(cover) = &cover_path {
                storage::discard_local(cover).await;
            }
            return Err(e);
        }
    };

    let cover = match cover_path {
        Some(path) => match state.media_store.ingest(&path, MediaKind::Image).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                release_best_effort(&state, &avatar.public_id, MediaKind::Image).await;
                return Err(e);
            }
        },
        None => None,
    };

    let new_user = NewUser {
        username,
        email,
        full_name,
        password,
        avatar_url: avatar.url,
        avatar_public_id: avatar.public_id.clone(),
        cover_url: cover.as_ref().map(|c| c.url.clone()),
        cover_public_id: cover.as_ref().map(|c| c.public_id.clone()),
    };

    let user = match state.user_repository.create(new_user).await {
        Ok(user) => user,
        Err(e) => {
            release_best_effort(&state, &avatar.public_id, MediaKind::Image).await;
            if let Some(cover) = &cover {
                release_best_effort(&state, &cover.public_id, MediaKind::Image).await;
            }
            return Err(ApiError::Internal(e));
        }
    };

    info!("Registered user {}", user.username);

    Ok(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully",
    ))
}

/// Log in with username-or-email plus password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let identifier = payload.identifier.trim().to_lowercase();
    if identifier.is_empty() {
        return Err(ApiError::validation("Username or email is required"));
    }

    let user = state
        .user_repository
        .find_by_identifier(&identifier)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::Unauthorized("Invalid user credentials".to_string()));
    }

    let pair = state.token_service.issue_pair(user.id)?;
    state
        .user_repository
        .store_refresh_token(user.id, &pair.refresh_token)
        .await?;

    let jar = set_session_cookies(jar, &pair);

    Ok((
        jar,
        ApiResponse::ok(
            json!({
                "user": UserResponse::from(user),
                "accessToken": pair.access_token,
                "refreshToken": pair.refresh_token,
            }),
            "User logged in successfully",
        ),
    ))
}

/// Exchange a refresh token for a fresh pair
///
/// The presented token must both verify cryptographically and match the
/// stored value; the swap to the replacement happens in one statement, so
/// of two concurrent requests with the same token exactly one wins.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> ApiResult<impl IntoResponse> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| payload.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(|| ApiError::Unauthorized("Refresh token is required".to_string()))?;

    let claims = state
        .token_service
        .verify_refresh(&presented)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    let pair = state.token_service.issue_pair(claims.sub)?;

    let rotated = state
        .user_repository
        .rotate_refresh_token(claims.sub, &presented, &pair.refresh_token)
        .await?;

    if !rotated {
        return Err(ApiError::Unauthorized(
            "Refresh token is expired or already used".to_string(),
        ));
    }

    let jar = set_session_cookies(jar, &pair);

    Ok((
        jar,
        ApiResponse::ok(pair, "Access token refreshed successfully"),
    ))
}

/// Log out: revoke the stored refresh token and clear cookies
pub async fn logout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state
        .user_repository
        .clear_refresh_token(current_user.id)
        .await?;

    let jar = jar
        .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build())
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/").build());

    Ok((
        jar,
        ApiResponse::ok(json!({}), "User logged out successfully"),
    ))
}

/// The caller's own profile
pub async fn current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Current user fetched successfully",
    ))
}

/// Change the caller's password after re-verifying the old one
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_password(&payload.new_password).map_err(ApiError::validation)?;

    let user = state
        .user_repository
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    if !state
        .user_repository
        .verify_password(&user, &payload.old_password)?
    {
        return Err(ApiError::validation("Invalid old password"));
    }

    state
        .user_repository
        .update_password(current_user.id, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok(
        json!({}),
        "Password changed successfully",
    ))
}

/// Update full name and email
pub async fn update_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = payload.email.trim().to_lowercase();
    let full_name = validation::sanitize_plain(payload.full_name.trim())
        .map_err(ApiError::validation)?;

    let mut errors = Vec::new();
    if let Err(e) = validation::validate_email(&email) {
        errors.push(e);
    }
    if let Err(e) = validation::validate_required(&full_name, "Full name") {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation_errors(errors));
    }

    let user = state
        .user_repository
        .update_account(current_user.id, &full_name, &email)
        .await?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Account details updated successfully",
    ))
}

/// Replace the caller's avatar image
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    replace_profile_image(state, current_user.id, multipart, ProfileImage::Avatar).await
}

/// Replace the caller's cover image
pub async fn update_cover(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    replace_profile_image(state, current_user.id, multipart, ProfileImage::Cover).await
}

/// A channel's public profile with subscription counts relative to the caller
pub async fn channel_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    let profile = state
        .user_repository
        .channel_profile(&username, current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Channel does not exist".to_string()))?;

    Ok(ApiResponse::ok(
        profile,
        "Channel profile fetched successfully",
    ))
}

#[derive(Clone, Copy)]
enum ProfileImage {
    Avatar,
    Cover,
}

impl ProfileImage {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Cover => "coverImage",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Avatar => "Avatar",
            Self::Cover => "Cover image",
        }
    }
}

/// Spool and store the replacement image, update the row, then release the
/// superseded object. A failed release is logged and does not fail the
/// request; the row already points at the new object.
async fn replace_profile_image(
    state: AppState,
    user_id: Uuid,
    mut multipart: Multipart,
    which: ProfileImage,
) -> ApiResult<ApiResponse<UserResponse>> {
    let previous = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    let mut spooled: Option<PathBuf> = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == which.field_name() {
            let path = storage::spool_upload(&mut field, &state.media_config.upload_dir).await?;
            if let Some(old) = spooled.replace(path) {
                storage::discard_local(&old).await;
            }
        }
    }

    let path = spooled
        .ok_or_else(|| ApiError::validation(format!("{} file is required", which.label())))?;

    let stored = state.media_store.ingest(&path, MediaKind::Image).await?;

    let update = match which {
        ProfileImage::Avatar => {
            state
                .user_repository
                .update_avatar(user_id, &stored.url, &stored.public_id)
                .await
        }
        ProfileImage::Cover => {
            state
                .user_repository
                .update_cover(user_id, &stored.url, &stored.public_id)
                .await
        }
    };

    let user = match update {
        Ok(user) => user,
        Err(e) => {
            release_best_effort(&state, &stored.public_id, MediaKind::Image).await;
            return Err(ApiError::Internal(e));
        }
    };

    let superseded = match which {
        ProfileImage::Avatar => Some(previous.avatar_public_id),
        ProfileImage::Cover => previous.cover_public_id,
    };
    if let Some(public_id) = superseded {
        release_best_effort(&state, &public_id, MediaKind::Image).await;
    }

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        format!("{} updated successfully", which.label()),
    ))
}

async fn collect_register_form(
    multipart: &mut Multipart,
    upload_dir: &str,
    form: &mut RegisterForm,
    avatar_path: &mut Option<PathBuf>,
    cover_path: &mut Option<PathBuf>,
) -> ApiResult<()> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "username" => form.username = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "fullName" => form.full_name = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            "avatar" => {
                let path = storage::spool_upload(&mut field, upload_dir).await?;
                if let Some(old) = avatar_path.replace(path) {
                    storage::discard_local(&old).await;
                }
            }
            "coverImage" => {
                let path = storage::spool_upload(&mut field, upload_dir).await?;
                if let Some(old) = cover_path.replace(path) {
                    storage::discard_local(&old).await;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))
}

async fn release_best_effort(state: &AppState, public_id: &str, kind: MediaKind) {
    if let Err(e) = state.media_store.release(public_id, kind).await {
        warn!("Failed to release superseded object {}: {}", public_id, e);
    }
}

fn set_session_cookies(jar: CookieJar, pair: &TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone()))
        .add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            pair.refresh_token.clone(),
        ))
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "token-value".to_string());
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
