//! Playlist model and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ownership::{Owned, Restricted};

/// Playlist entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Restricted for Playlist {
    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Playlist with its member video ids in playlist order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub video_ids: Vec<Uuid>,
}

/// Create/update payload
#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub name: String,
    pub description: String,
}
