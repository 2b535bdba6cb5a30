//! Tweet repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tweet::Tweet;

/// Tweet repository
#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, owner_id: Uuid, content: &str, is_public: bool) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (owner_id, content, is_public)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(content)
        .bind(is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tweet)
    }

    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "UPDATE tweets SET content = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// A user's tweets, newest first; private tweets only when the caller
    /// is that user
    pub async fn list_for_user(&self, user_id: Uuid, include_private: bool) -> Result<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT * FROM tweets
            WHERE owner_id = $1 AND (is_public OR $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(include_private)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }
}
