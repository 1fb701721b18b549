//! Handle database requests.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::post::{Post, PostWithAuthor};

/// Listings are always truncated to the newest entries.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    /// Create a new [`PostRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert [`Post`] into database.
    pub async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO posts (id, title, summary, content, cover, author_id, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(&post.cover)
        .bind(&post.author_id)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find a post using the `id` field.
    pub async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"SELECT id, title, summary, content, cover, author_id, created_at
                FROM posts WHERE id = ?"#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find a post with its author's username resolved.
    pub async fn find_with_author(
        &self,
        post_id: &str,
    ) -> Result<Option<PostWithAuthor>> {
        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"SELECT p.id, p.title, p.summary, p.content, p.cover,
                    p.author_id, p.created_at, u.username AS author
                FROM posts p
                LEFT JOIN users u ON u.id = p.author_id
                WHERE p.id = ?"#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Update the mutable fields of a post.
    pub async fn update(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"UPDATE posts
                SET title = ?, summary = ?, content = ?, cover = ?
                WHERE id = ?"#,
        )
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(&post.cover)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Newest posts first, truncated to `limit`, author usernames
    /// resolved where possible.
    pub async fn list(&self, limit: i64) -> Result<Vec<PostWithAuthor>> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(
            r#"SELECT p.id, p.title, p.summary, p.content, p.cover,
                    p.author_id, p.created_at, u.username AS author
                FROM posts p
                LEFT JOIN users u ON u.id = p.author_id
                ORDER BY p.created_at DESC
                LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
