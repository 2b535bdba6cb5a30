//! Integration tests for repository-level invariants
//!
//! These tests exercise the toggle, rotation, view-counter, visibility, and
//! dashboard behavior against a real database. They need a running
//! PostgreSQL instance (see `DATABASE_URL`), so they are ignored by default.

use aws_config::BehaviorVersion;
use axum::Extension;
use axum::extract::{Path, State};
use sqlx::PgPool;
use uuid::Uuid;

use api::config::{JwtConfig, MediaConfig};
use api::error::ApiError;
use api::jwt::TokenService;
use api::middleware::CurrentUser;
use api::models::LikeTarget;
use api::models::user::User;
use api::models::video::{NewVideo, Video};
use api::repositories::user::NewUser;
use api::repositories::{
    CommentRepository, DashboardRepository, LikeRepository, PlaylistRepository,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use api::routes::{tweets, videos};
use api::state::AppState;
use api::storage::MediaStore;
use common::database::{DatabaseConfig, init_pool, run_migrations};

async fn setup_pool() -> PgPool {
    let config = DatabaseConfig::from_env().expect("Failed to load database config");
    let pool = init_pool(&config).await.expect("Failed to connect");
    run_migrations(&pool).await.expect("Failed to migrate");
    pool
}

async fn test_state(pool: PgPool) -> AppState {
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let media_store = MediaStore::new(
        aws_sdk_s3::Client::new(&aws_config),
        "test-bucket".to_string(),
        "https://cdn.example.com".to_string(),
    );
    let token_service = TokenService::new(JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 864_000,
    });

    AppState {
        db_pool: pool.clone(),
        token_service,
        media_store,
        media_config: MediaConfig {
            bucket: "test-bucket".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
            upload_dir: "./tmp/test-uploads".to_string(),
        },
        user_repository: UserRepository::new(pool.clone()),
        video_repository: VideoRepository::new(pool.clone()),
        comment_repository: CommentRepository::new(pool.clone()),
        like_repository: LikeRepository::new(pool.clone()),
        tweet_repository: TweetRepository::new(pool.clone()),
        playlist_repository: PlaylistRepository::new(pool.clone()),
        subscription_repository: SubscriptionRepository::new(pool.clone()),
        dashboard_repository: DashboardRepository::new(pool),
    }
}

async fn create_user(repo: &UserRepository) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    let username = format!("u{}", &tag[..12]);
    repo.create(NewUser {
        username: username.clone(),
        email: format!("{username}@example.com"),
        full_name: "Test User".to_string(),
        password: "password123".to_string(),
        avatar_url: "https://cdn.example.com/images/avatar.png".to_string(),
        avatar_public_id: format!("images/{tag}.png"),
        cover_url: None,
        cover_public_id: None,
    })
    .await
    .expect("Failed to create user")
}

async fn create_video(repo: &VideoRepository, owner_id: Uuid) -> Video {
    repo.insert(NewVideo {
        owner_id,
        title: "Test video".to_string(),
        description: "A test video".to_string(),
        video_url: "https://cdn.example.com/videos/clip.mp4".to_string(),
        video_public_id: format!("videos/{}.mp4", Uuid::new_v4()),
        thumbnail_url: "https://cdn.example.com/images/thumb.png".to_string(),
        thumbnail_public_id: format!("images/{}.png", Uuid::new_v4()),
        duration: 12.5,
    })
    .await
    .expect("Failed to create video")
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_like_toggle_involution() {
    let pool = setup_pool().await;
    let users = UserRepository::new(pool.clone());
    let videos = VideoRepository::new(pool.clone());
    let likes = LikeRepository::new(pool);

    let user = create_user(&users).await;
    let video = create_video(&videos, user.id).await;
    let target = LikeTarget::Video(video.id);

    assert!(likes.toggle(user.id, target).await.unwrap());
    assert_eq!(likes.count_for(target).await.unwrap(), 1);

    // Toggling again returns to the original state.
    assert!(!likes.toggle(user.id, target).await.unwrap());
    assert_eq!(likes.count_for(target).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_subscription_toggle_involution() {
    let pool = setup_pool().await;
    let users = UserRepository::new(pool.clone());
    let subscriptions = SubscriptionRepository::new(pool);

    let subscriber = create_user(&users).await;
    let channel = create_user(&users).await;

    assert!(subscriptions.toggle(subscriber.id, channel.id).await.unwrap());
    assert_eq!(subscriptions.subscriber_count(channel.id).await.unwrap(), 1);

    assert!(!subscriptions.toggle(subscriber.id, channel.id).await.unwrap());
    assert_eq!(subscriptions.subscriber_count(channel.id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_replayed_refresh_token_fails_rotation() {
    let pool = setup_pool().await;
    let users = UserRepository::new(pool);
    let user = create_user(&users).await;

    users.store_refresh_token(user.id, "issued-1").await.unwrap();

    // First rotation with the current token wins.
    assert!(
        users
            .rotate_refresh_token(user.id, "issued-1", "issued-2")
            .await
            .unwrap()
    );

    // Replaying the superseded token changes nothing.
    assert!(
        !users
            .rotate_refresh_token(user.id, "issued-1", "issued-3")
            .await
            .unwrap()
    );

    // The current token still rotates.
    assert!(
        users
            .rotate_refresh_token(user.id, "issued-2", "issued-3")
            .await
            .unwrap()
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_view_counter_increments_per_fetch() {
    let pool = setup_pool().await;
    let users = UserRepository::new(pool.clone());
    let videos = VideoRepository::new(pool);

    let user = create_user(&users).await;
    let video = create_video(&videos, user.id).await;
    assert_eq!(video.views, 0);

    let fetched = videos.fetch_counting_view(video.id).await.unwrap().unwrap();
    assert_eq!(fetched.views, 1);

    let fetched = videos.fetch_counting_view(video.id).await.unwrap().unwrap();
    assert_eq!(fetched.views, 2);

    let stored = videos.find_by_id(video.id).await.unwrap().unwrap();
    assert_eq!(stored.views, 2);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_channel_stats_aggregation() {
    let pool = setup_pool().await;
    let users = UserRepository::new(pool.clone());
    let videos = VideoRepository::new(pool.clone());
    let likes = LikeRepository::new(pool.clone());
    let subscriptions = SubscriptionRepository::new(pool.clone());
    let dashboard = DashboardRepository::new(pool);

    let owner = create_user(&users).await;
    let viewer = create_user(&users).await;

    // An empty channel reports zeros, including the view sum over no rows.
    let stats = dashboard.channel_stats(owner.id).await.unwrap();
    assert_eq!(stats.videos_count, 0);
    assert_eq!(stats.views_count, 0);
    assert_eq!(stats.likes_count, 0);
    assert_eq!(stats.subscribers_count, 0);

    let video = create_video(&videos, owner.id).await;
    videos.fetch_counting_view(video.id).await.unwrap();
    videos.fetch_counting_view(video.id).await.unwrap();
    likes.toggle(viewer.id, LikeTarget::Video(video.id)).await.unwrap();
    subscriptions.toggle(viewer.id, owner.id).await.unwrap();

    let stats = dashboard.channel_stats(owner.id).await.unwrap();
    assert_eq!(stats.videos_count, 1);
    assert_eq!(stats.views_count, 2);
    assert_eq!(stats.likes_count, 1);
    assert_eq!(stats.subscribers_count, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_forbidden_video_fetch_does_not_count_view() {
    let pool = setup_pool().await;
    let state = test_state(pool).await;

    let owner = create_user(&state.user_repository).await;
    let other = create_user(&state.user_repository).await;

    let video = create_video(&state.video_repository, owner.id).await;
    let video = state
        .video_repository
        .toggle_published(video.id)
        .await
        .unwrap();
    assert!(!video.is_published);

    let result = videos::get_by_id(
        State(state.clone()),
        Extension(CurrentUser { id: other.id }),
        Path(video.id),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));

    // The rejected fetch left the counter untouched.
    let stored = state
        .video_repository
        .find_by_id(video.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.views, 0);

    // The owner's fetch counts.
    assert!(
        videos::get_by_id(
            State(state.clone()),
            Extension(CurrentUser { id: owner.id }),
            Path(video.id),
        )
        .await
        .is_ok()
    );
    let stored = state
        .video_repository
        .find_by_id(video.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.views, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_private_tweet_visible_to_author_only() {
    let pool = setup_pool().await;
    let state = test_state(pool).await;

    let author = create_user(&state.user_repository).await;
    let other = create_user(&state.user_repository).await;

    let tweet = state
        .tweet_repository
        .insert(author.id, "just for me", false)
        .await
        .unwrap();

    let result = tweets::get_by_id(
        State(state.clone()),
        Extension(CurrentUser { id: other.id }),
        Path(tweet.id),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));

    assert!(
        tweets::get_by_id(
            State(state.clone()),
            Extension(CurrentUser { id: author.id }),
            Path(tweet.id),
        )
        .await
        .is_ok()
    );

    // The private tweet also stays out of the public listing.
    let public_feed = state
        .tweet_repository
        .list_for_user(author.id, false)
        .await
        .unwrap();
    assert!(public_feed.iter().all(|t| t.id != tweet.id));
}
