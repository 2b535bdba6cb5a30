//! Video repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::video::{NewVideo, Video, VideoListItem, VideoQuery};

/// Video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new_video: NewVideo) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (owner_id, title, description, video_url, video_public_id,
                                thumbnail_url, thumbnail_public_id, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new_video.owner_id)
        .bind(&new_video.title)
        .bind(&new_video.description)
        .bind(&new_video.video_url)
        .bind(&new_video.video_public_id)
        .bind(&new_video.thumbnail_url)
        .bind(&new_video.thumbnail_public_id)
        .bind(new_video.duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    /// Fetch a video and atomically count the view
    ///
    /// The counter is monotonic and never reset; the increment happens in the
    /// same statement as the read.
    pub async fn fetch_counting_view(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// List videos with pagination, substring search, owner filter, and
    /// whitelisted sorting
    pub async fn list(&self, query: &VideoQuery) -> Result<(Vec<VideoListItem>, i64)> {
        let (_, limit, offset) = crate::models::page_window(query.page, query.limit);

        let sort_column = match query.sort_by.as_deref() {
            Some("views") => "v.views",
            Some("duration") => "v.duration",
            Some("title") => "v.title",
            _ => "v.created_at",
        };
        let sort_dir = match query.order.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };

        let items = sqlx::query_as::<_, VideoListItem>(&format!(
            r#"
            SELECT v.id, v.owner_id, u.username AS owner_username,
                   u.avatar_url AS owner_avatar_url, v.title, v.description,
                   v.thumbnail_url, v.duration, v.views, v.is_published, v.created_at
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE ($1::text IS NULL
                   OR v.title ILIKE '%' || $1 || '%'
                   OR v.description ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR v.owner_id = $2)
            ORDER BY {sort_column} {sort_dir}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&query.query)
        .bind(query.user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM videos v
            WHERE ($1::text IS NULL
                   OR v.title ILIKE '%' || $1 || '%'
                   OR v.description ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR v.owner_id = $2)
            "#,
        )
        .bind(&query.query)
        .bind(query.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn update_info(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn update_thumbnail(&self, id: Uuid, url: &str, public_id: &str) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, thumbnail_public_id = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(url)
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn toggle_published(&self, id: Uuid) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET is_published = NOT is_published, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
