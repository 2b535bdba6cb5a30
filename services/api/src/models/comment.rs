//! Comment model with its tagged parent reference
//!
//! A comment attaches to exactly one parent, a video or a tweet. The
//! reference is a tagged variant enforced at construction rather than a
//! pair of nullable foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::ownership::Owned;

/// The one parent a comment attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ParentRef {
    Video(Uuid),
    Tweet(Uuid),
}

#[derive(Debug, Error)]
#[error("unknown comment parent kind: {0}")]
pub struct UnknownParentKind(String);

impl ParentRef {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Tweet(_) => "tweet",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Video(id) | Self::Tweet(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: Uuid) -> Result<Self, UnknownParentKind> {
        match kind {
            "video" => Ok(Self::Video(id)),
            "tweet" => Ok(Self::Tweet(id)),
            other => Err(UnknownParentKind(other.to_string())),
        }
    }
}

/// Comment entity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub parent: ParentRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

fn parent_from_row(row: &PgRow) -> Result<ParentRef, sqlx::Error> {
    let kind: String = row.try_get("parent_kind")?;
    let parent_id: Uuid = row.try_get("parent_id")?;
    ParentRef::from_parts(&kind, parent_id).map_err(|e| sqlx::Error::ColumnDecode {
        index: "parent_kind".to_string(),
        source: Box::new(e),
    })
}

impl FromRow<'_, PgRow> for Comment {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            content: row.try_get("content")?,
            parent: parent_from_row(row)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Comment joined with its author, for listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub author_username: String,
    pub author_avatar_url: String,
    pub content: String,
    pub parent: ParentRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for CommentWithAuthor {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            author_username: row.try_get("author_username")?,
            author_avatar_url: row.try_get("author_avatar_url")?,
            content: row.try_get("content")?,
            parent: parent_from_row(row)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Create/update payload
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// Paginated comment listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub items: Vec<CommentWithAuthor>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_ref_parts_roundtrip() {
        let id = Uuid::new_v4();
        let parent = ParentRef::from_parts("video", id).unwrap();
        assert_eq!(parent, ParentRef::Video(id));
        assert_eq!(parent.kind(), "video");
        assert_eq!(parent.id(), id);

        let parent = ParentRef::from_parts("tweet", id).unwrap();
        assert_eq!(parent.kind(), "tweet");
    }

    #[test]
    fn test_unknown_parent_kind_is_rejected() {
        assert!(ParentRef::from_parts("comment", Uuid::new_v4()).is_err());
        assert!(ParentRef::from_parts("", Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_parent_ref_serialization() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(ParentRef::Tweet(id)).unwrap();
        assert_eq!(value["kind"], "tweet");
        assert_eq!(value["id"], id.to_string());
    }
}
