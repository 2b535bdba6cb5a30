//! Like repository: the NotLiked ⇄ Liked toggle and its reads

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::like::LikeTarget;
use crate::models::video::Video;

/// Like repository
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the like state for (owner, target): delete if present, create
    /// otherwise. Returns true when the target is now liked.
    ///
    /// Neither branch errors; a concurrent duplicate insert is absorbed by
    /// the unique index and ON CONFLICT DO NOTHING.
    pub async fn toggle(&self, owner_id: Uuid, target: LikeTarget) -> Result<bool> {
        let deleted = sqlx::query(
            "DELETE FROM likes WHERE owner_id = $1 AND target_kind = $2 AND target_id = $3",
        )
        .bind(owner_id)
        .bind(target.kind())
        .bind(target.id())
        .execute(&self.pool)
        .await?;

        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO likes (owner_id, target_kind, target_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_id, target_kind, target_id) DO NOTHING
            "#,
        )
        .bind(owner_id)
        .bind(target.kind())
        .bind(target.id())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Check that the like target actually exists
    pub async fn target_exists(&self, target: LikeTarget) -> Result<bool> {
        let sql = match target {
            LikeTarget::Video(_) => "SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)",
            LikeTarget::Comment(_) => "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)",
            LikeTarget::Tweet(_) => "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)",
        };

        let exists: bool = sqlx::query_scalar(sql)
            .bind(target.id())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Total number of likes on a target
    pub async fn count_for(&self, target: LikeTarget) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.kind())
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Videos the given user has liked, newest like first
    pub async fn liked_videos(&self, owner_id: Uuid) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT v.* FROM videos v
            JOIN likes l ON l.target_kind = 'video' AND l.target_id = v.id
            WHERE l.owner_id = $1
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }
}
