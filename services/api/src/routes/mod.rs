//! HTTP surface of the API service
//!
//! Everything is served under `/api/v1`. Registration, login, token refresh,
//! and the healthcheck are public; every other route goes through the
//! authentication gate.

pub mod comments;
pub mod dashboard;
pub mod healthcheck;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Uploads are streamed to disk, so the body limit only bounds spool size
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthcheck", get(healthcheck::healthcheck))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh-token", post(users::refresh_token));

    let protected = Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/current", get(users::current_user))
        .route("/users/change-password", post(users::change_password))
        .route("/users/update-account", patch(users::update_account))
        .route("/users/avatar", patch(users::update_avatar))
        .route("/users/cover", patch(users::update_cover))
        .route("/users/channel/:username", get(users::channel_profile))
        .route("/videos", post(videos::upload).get(videos::list))
        .route(
            "/videos/:id",
            get(videos::get_by_id)
                .patch(videos::update_info)
                .delete(videos::delete),
        )
        .route("/videos/:id/thumbnail", patch(videos::update_thumbnail))
        .route("/videos/:id/toggle-publish", patch(videos::toggle_publish))
        .route(
            "/comments/video/:id",
            get(comments::list_for_video).post(comments::add_to_video),
        )
        .route(
            "/comments/tweet/:id",
            get(comments::list_for_tweet).post(comments::add_to_tweet),
        )
        .route(
            "/comments/:id",
            patch(comments::update).delete(comments::delete),
        )
        .route("/likes/toggle/video/:id", post(likes::toggle_video))
        .route("/likes/toggle/comment/:id", post(likes::toggle_comment))
        .route("/likes/toggle/tweet/:id", post(likes::toggle_tweet))
        .route("/likes/videos", get(likes::liked_videos))
        .route("/likes/video/:id/count", get(likes::video_like_count))
        .route("/tweets", post(tweets::create))
        .route("/tweets/user/:user_id", get(tweets::list_for_user))
        .route(
            "/tweets/:id",
            get(tweets::get_by_id)
                .patch(tweets::update)
                .delete(tweets::delete),
        )
        .route("/playlists", post(playlists::create))
        .route(
            "/playlists/:id",
            get(playlists::get_by_id)
                .patch(playlists::update_info)
                .delete(playlists::delete),
        )
        .route("/playlists/user/:user_id", get(playlists::list_for_user))
        .route(
            "/playlists/:id/videos/:video_id",
            patch(playlists::add_video).delete(playlists::remove_video),
        )
        .route(
            "/playlists/:id/toggle-visibility",
            patch(playlists::toggle_visibility),
        )
        .route(
            "/subscriptions/channel/:channel_id",
            post(subscriptions::toggle),
        )
        .route("/subscriptions", get(subscriptions::subscribed_channels))
        .route(
            "/subscriptions/channel/:channel_id/subscribers-count",
            get(subscriptions::subscriber_count),
        )
        .route("/dashboard/stats", get(dashboard::channel_stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
