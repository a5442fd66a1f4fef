//! Post repository.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::RwLock;

use crate::models::Post;

/// Repository for post operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Persist a fully constructed post.
    async fn insert(&self, post: &Post) -> Result<()>;

    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<Post>>;

    /// One identity's posts, newest first.
    async fn list_by_email(&self, email: &str) -> Result<Vec<Post>>;
}

/// PostgreSQL implementation of PostRepo.
#[derive(Clone)]
pub struct PgPostRepo {
    pool: Pool<Postgres>,
}

impl PgPostRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, kind, email, content, photo, file, duration_secs, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id)
        .bind(post.kind)
        .bind(&post.email)
        .bind(&post.content)
        .bind(&post.photo)
        .bind(&post.file)
        .bind(post.duration_secs)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>> {
        let posts =
            sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(posts)
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}

/// Process-local implementation of PostRepo, used when no database is
/// configured. Newest-first ordering follows insertion order, matching the
/// PostgreSQL implementation's created_at ordering.
#[derive(Default)]
pub struct MemoryPostRepo {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepo for MemoryPostRepo {
    async fn insert(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().expect("post store poisoned");
        posts.push(post.clone());
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>> {
        let posts = self.posts.read().expect("post store poisoned");
        Ok(posts.iter().rev().cloned().collect())
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<Post>> {
        let posts = self.posts.read().expect("post store poisoned");
        Ok(posts
            .iter()
            .rev()
            .filter(|p| p.email == email)
            .cloned()
            .collect())
    }
}
