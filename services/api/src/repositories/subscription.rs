//! Subscription repository: the subscribe/unsubscribe toggle and its reads

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::subscription::SubscribedChannel;

/// Subscription repository
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the subscription state for (subscriber, channel). Returns true
    /// when the pair is now subscribed.
    pub async fn toggle(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let deleted =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
                .bind(subscriber_id)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;

        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO subscriptions (subscriber_id, channel_id)
            VALUES ($1, $2)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Number of subscribers a channel has
    pub async fn subscriber_count(&self, channel_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Channels the given user subscribes to, newest first
    pub async fn subscribed_channels(&self, subscriber_id: Uuid) -> Result<Vec<SubscribedChannel>> {
        let channels = sqlx::query_as::<_, SubscribedChannel>(
            r#"
            SELECT s.channel_id, u.username, u.full_name, u.avatar_url,
                   s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }
}
