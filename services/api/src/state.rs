//! Application state shared across handlers

use sqlx::PgPool;

use crate::config::MediaConfig;
use crate::jwt::TokenService;
use crate::repositories::{
    CommentRepository, DashboardRepository, LikeRepository, PlaylistRepository,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use crate::storage::MediaStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_service: TokenService,
    pub media_store: MediaStore,
    pub media_config: MediaConfig,
    pub user_repository: UserRepository,
    pub video_repository: VideoRepository,
    pub comment_repository: CommentRepository,
    pub like_repository: LikeRepository,
    pub tweet_repository: TweetRepository,
    pub playlist_repository: PlaylistRepository,
    pub subscription_repository: SubscriptionRepository,
    pub dashboard_repository: DashboardRepository,
}
