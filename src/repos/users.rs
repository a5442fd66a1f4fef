//! User repository.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use std::sync::RwLock;
use uuid::Uuid;

use crate::models::User;

/// Repository for user operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users.
    async fn list(&self) -> Result<Vec<User>>;

    /// Create a new user.
    async fn create(&self, email: &str, name: &str) -> Result<User>;

    /// Merge profile fields into a user's profile document, creating the
    /// user when absent. `name`, when given, replaces the stored name.
    async fn upsert_profile<'a>(
        &self,
        email: &str,
        name: Option<&'a str>,
        patch: &serde_json::Value,
    ) -> Result<User>;
}

/// PostgreSQL implementation of UserRepo.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: Pool<Postgres>,
}

impl PgUserRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create(&self, email: &str, name: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upsert_profile<'a>(
        &self,
        email: &str,
        name: Option<&'a str>,
        patch: &serde_json::Value,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, profile) VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET name = COALESCE($2, users.name),
                profile = users.profile || $3
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(patch)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

/// Process-local implementation of UserRepo, used when no database is
/// configured. Same visible semantics as the PostgreSQL implementation.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_profile(profile: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(profile), Some(patch)) = (profile.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            profile.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().expect("user store poisoned");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = self.users.read().expect("user store poisoned");
        Ok(users.clone())
    }

    async fn create(&self, email: &str, name: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: Some(name.to_string()),
            profile: serde_json::json!({}),
            created_at: Utc::now(),
        };
        let mut users = self.users.write().expect("user store poisoned");
        anyhow::ensure!(
            !users.iter().any(|u| u.email == email),
            "duplicate email: {email}"
        );
        users.push(user.clone());
        Ok(user)
    }

    async fn upsert_profile<'a>(
        &self,
        email: &str,
        name: Option<&'a str>,
        patch: &serde_json::Value,
    ) -> Result<User> {
        let mut users = self.users.write().expect("user store poisoned");
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            if let Some(name) = name {
                user.name = Some(name.to_string());
            }
            merge_profile(&mut user.profile, patch);
            return Ok(user.clone());
        }

        let mut profile = serde_json::json!({});
        merge_profile(&mut profile, patch);
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            profile,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
