//! Video model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ownership::{Owned, Restricted};

/// Video entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    /// Duration in seconds
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Restricted for Video {
    fn is_public(&self) -> bool {
        self.is_published
    }
}

/// Insert payload assembled by the upload handler once both media objects
/// are stored
#[derive(Debug)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    pub duration: f64,
}

/// Video row joined with its owner, for listings
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoListItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_avatar_url: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for video listing
#[derive(Debug, Clone, Deserialize)]
pub struct VideoQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Substring match against title/description
    pub query: Option<String>,
    /// Sort field (created_at, views, duration, title)
    pub sort_by: Option<String>,
    /// Sort order (asc or desc)
    pub order: Option<String>,
    /// Filter by owner
    pub user_id: Option<Uuid>,
}

/// Response for video listing with pagination
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub items: Vec<VideoListItem>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Title/description update payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}
