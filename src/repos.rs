//! Durable repositories (users, posts).
//!
//! Each repository is abstracted behind a trait with two implementations:
//! PostgreSQL, and an in-memory fallback with identical visible semantics
//! used when no database is configured. The backend is selected once at
//! startup; handlers never branch on which one is active.
//!
//! ## Usage in Handlers
//!
//! Repositories are accessed via `state.repos`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let user = state.repos.users.find_by_email(&email).await?;
//!     state.repos.posts.insert(&post).await?;
//! }
//! ```

mod posts;
mod users;

pub use posts::{MemoryPostRepo, PgPostRepo, PostRepo};
pub use users::{MemoryUserRepo, PgUserRepo, UserRepo};

#[cfg(test)]
pub use posts::MockPostRepo;
#[cfg(test)]
pub use users::MockUserRepo;

use std::sync::Arc;

/// Collection of all repositories.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
}
