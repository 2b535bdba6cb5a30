use anyhow::Result;
use aws_config::BehaviorVersion;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, init_pool, run_migrations};
use tokio::net::TcpListener;

use api::config::AppConfig;
use api::jwt::TokenService;
use api::repositories::{
    CommentRepository, DashboardRepository, LikeRepository, PlaylistRepository,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use api::routes;
use api::state::AppState;
use api::storage::MediaStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let config = AppConfig::from_env()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let media_store = MediaStore::new(
        s3_client,
        config.media.bucket.clone(),
        config.media.public_base_url.clone(),
    );

    let token_service = TokenService::new(config.jwt.clone());

    let app_state = AppState {
        db_pool: pool.clone(),
        token_service,
        media_store,
        media_config: config.media.clone(),
        user_repository: UserRepository::new(pool.clone()),
        video_repository: VideoRepository::new(pool.clone()),
        comment_repository: CommentRepository::new(pool.clone()),
        like_repository: LikeRepository::new(pool.clone()),
        tweet_repository: TweetRepository::new(pool.clone()),
        playlist_repository: PlaylistRepository::new(pool.clone()),
        subscription_repository: SubscriptionRepository::new(pool.clone()),
        dashboard_repository: DashboardRepository::new(pool),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
