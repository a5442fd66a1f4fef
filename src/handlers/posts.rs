//! Text post endpoints.
//!
//! Audio posts are created through the gated upload endpoint
//! (`handlers::uploads`); both kinds are served from the same feed here.

use axum::{
    Json, Router, debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use garde::Validate;

use crate::{
    api::{CreatePostPayload, EmailQuery, PostResponse},
    error::AppError,
    models::Post,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_post).get(list_posts))
        .route("/userpost", get(user_posts))
}

#[debug_handler]
async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let post = Post::text(&email, payload.content.trim(), payload.photo.clone(), Utc::now());
    state.repos.posts.insert(&post).await?;

    tracing::info!(post_id = %post.id, email = %email, "text post created");

    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}

#[debug_handler]
async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state.repos.posts.list_recent().await?;

    Ok(Json(posts))
}

#[debug_handler]
async fn user_posts(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = query.email.trim().to_lowercase();
    let posts = state.repos.posts.list_by_email(&email).await?;

    Ok(Json(posts))
}
