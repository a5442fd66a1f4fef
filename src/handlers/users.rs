//! User CRUD endpoints.

use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use garde::Validate;

use crate::{
    api::{EmailQuery, RegisterPayload, UpdateProfilePayload},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/loggedinuser", get(logged_in_user))
        .route("/user", get(list_users))
        .route("/userupdate/{email}", patch(update_profile))
}

#[debug_handler]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim();

    if state.repos.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("user already exists".into()));
    }

    let user = state.repos.users.create(&email, name).await?;

    tracing::info!(user_id = %user.id, email = %email, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Returns an array of matching users (empty when unknown), mirroring the
/// lookup shape the web client expects.
#[debug_handler]
async fn logged_in_user(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = query.email.trim().to_lowercase();
    let users: Vec<_> = state
        .repos
        .users
        .find_by_email(&email)
        .await?
        .into_iter()
        .collect();

    Ok(Json(users))
}

#[debug_handler]
async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.repos.users.list().await?;

    Ok(Json(users))
}

#[debug_handler]
async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }

    let mut patch = serde_json::Map::new();
    let fields = [
        ("bio", &payload.bio),
        ("location", &payload.location),
        ("website", &payload.website),
        ("dob", &payload.dob),
        ("profile_image", &payload.profile_image),
        ("cover_image", &payload.cover_image),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            patch.insert(key.to_string(), serde_json::Value::String(value.clone()));
        }
    }

    let user = state
        .repos
        .users
        .upsert_profile(
            &email,
            payload.name.as_deref(),
            &serde_json::Value::Object(patch),
        )
        .await?;

    tracing::info!(user_id = %user.id, email = %email, "profile updated");

    Ok(Json(user))
}
