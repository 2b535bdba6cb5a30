//! Dashboard aggregation: read-only fan-out over the caller's channel

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::dashboard::ChannelStats;

/// Dashboard repository
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the caller's channel stats. The three aggregations run
    /// concurrently; each defaults to zero for an empty channel, and a
    /// failure in any of them fails the whole request.
    pub async fn channel_stats(&self, owner_id: Uuid) -> Result<ChannelStats> {
        let (video_totals, likes_count, subscribers_count) = tokio::try_join!(
            self.video_totals(owner_id),
            self.likes_on_videos(owner_id),
            self.subscriber_count(owner_id),
        )?;

        Ok(ChannelStats {
            videos_count: video_totals.0,
            views_count: video_totals.1,
            likes_count,
            subscribers_count,
        })
    }

    /// Count and view sum of the owner's videos
    ///
    /// SUM over BIGINT comes back as NUMERIC, so the sum is cast back to
    /// BIGINT to decode as i64.
    async fn video_totals(&self, owner_id: Uuid) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS videos_count,
                   COALESCE(SUM(views), 0)::BIGINT AS views_count
            FROM videos WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.try_get("videos_count")?, row.try_get("views_count")?))
    }

    /// Likes across all of the owner's videos, via a join on like targets
    async fn likes_on_videos(&self, owner_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes l
            JOIN videos v ON l.target_kind = 'video' AND l.target_id = v.id
            WHERE v.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn subscriber_count(&self, channel_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
