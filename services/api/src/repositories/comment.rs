//! Comment repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::comment::{Comment, CommentWithAuthor, ParentRef};

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, owner_id: Uuid, content: &str, parent: ParentRef) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (owner_id, content, parent_kind, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(content)
        .bind(parent.kind())
        .bind(parent.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List a parent's comments newest-first with their authors joined in
    pub async fn list_for_parent(
        &self,
        parent: ParentRef,
        limit: u32,
        offset: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64)> {
        let items = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.owner_id, u.username AS author_username,
                   u.avatar_url AS author_avatar_url, c.content,
                   c.parent_kind, c.parent_id, c.created_at, c.updated_at
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.parent_kind = $1 AND c.parent_id = $2
            ORDER BY c.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(parent.kind())
        .bind(parent.id())
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE parent_kind = $1 AND parent_id = $2",
        )
        .bind(parent.kind())
        .bind(parent.id())
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }
}
