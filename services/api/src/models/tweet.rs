//! Tweet model and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ownership::{Owned, Restricted};

/// Tweet entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Restricted for Tweet {
    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Create payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTweetRequest {
    pub content: String,
    /// Defaults to public
    pub is_public: Option<bool>,
}

/// Update payload
#[derive(Debug, Deserialize)]
pub struct UpdateTweetRequest {
    pub content: String,
}
