//! Gated audio upload endpoint.
//!
//! Flow (each check short-circuits):
//! 1. email + otp fields present
//! 2. one-time code valid (checked without consuming it, so a later
//!    rejection leaves the code usable within its own expiry)
//! 3. current instant inside the upload admission window (IST)
//! 4. an audio file was received
//! 5. decoded duration within the cap
//!
//! The transport layer enforces the size cap: the request body limit on this
//! route rejects oversize uploads before any artifact is staged.
//!
//! The file is staged to disk while the multipart body streams in, so most
//! rejections happen with an artifact already on disk. Every rejection path
//! deletes it - a staged artifact never outlives the request that created
//! it. Deletion lives here rather than in the individual checks so all paths
//! clean up the same way.

use std::path::PathBuf;

use axum::{
    Json, Router, debug_handler,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use chrono::{DateTime, Utc};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    api::PostResponse, error::AppError, models::Post, state::AppState, stores::OtpOutcome,
};

/// Transport-enforced cap on the upload body (100 MB).
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
/// Longest admissible decoded duration (5 minutes). The bound is inclusive.
const MAX_DURATION_SECS: f64 = 300.0;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-audio", post(upload_audio))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
}

#[derive(Default)]
struct UploadForm {
    email: Option<String>,
    otp: Option<String>,
    staged: Option<PathBuf>,
}

#[debug_handler]
async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PostResponse>, AppError> {
    let mut form = UploadForm::default();
    if let Err(err) = read_form(&state, &mut multipart, &mut form).await {
        if let Some(path) = &form.staged {
            discard_artifact(&state, path).await;
        }
        return Err(err);
    }

    let post = admit_upload(&state, &form, Utc::now()).await?;

    Ok(Json(PostResponse { post }))
}

/// Reads the multipart fields, staging the audio part as it arrives.
/// `form` is filled in place so the caller can clean up a staged file even
/// when a later field fails to parse.
async fn read_form(
    state: &AppState,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("email") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| AppError::Validation(err.to_string()))?;
                form.email = Some(text.trim().to_lowercase());
            }
            Some("otp") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| AppError::Validation(err.to_string()))?;
                form.otp = Some(text.trim().to_string());
            }
            Some("audio") => {
                if !field
                    .content_type()
                    .is_some_and(|ct| ct.starts_with("audio/"))
                {
                    return Err(AppError::Payload("only audio files are allowed"));
                }

                let name = field.file_name().unwrap_or("audio").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(err.to_string()))?;
                form.staged = Some(state.artifacts.stage(&name, bytes).await?);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Runs the gate checks in order; any rejection deletes whatever was staged.
async fn admit_upload(
    state: &AppState,
    form: &UploadForm,
    now: DateTime<Utc>,
) -> Result<Post, AppError> {
    match gate_upload(state, form, now).await {
        Ok(post) => Ok(post),
        Err(err) => {
            if let Some(path) = &form.staged {
                discard_artifact(state, path).await;
            }
            Err(err)
        }
    }
}

async fn gate_upload(
    state: &AppState,
    form: &UploadForm,
    now: DateTime<Utc>,
) -> Result<Post, AppError> {
    let email = form.email.as_deref().filter(|s| !s.is_empty());
    let otp = form.otp.as_deref().filter(|s| !s.is_empty());
    let (Some(email), Some(otp)) = (email, otp) else {
        return Err(AppError::Validation("email and otp are required".into()));
    };

    // Non-consuming check: a rejection further down must not burn the code.
    match state.stores.otp.peek(email, otp, now).await? {
        OtpOutcome::Accepted => {}
        outcome => {
            tracing::warn!(email = %email, ?outcome, "upload rejected: bad otp");
            return Err(AppError::Auth("invalid or expired otp"));
        }
    }

    if !state.config.upload_window.admits(now) {
        tracing::info!(email = %email, window = %state.config.upload_window, "upload rejected: window closed");
        return Err(AppError::WindowClosed(
            "audio uploads allowed only between 14:00 and 19:00 IST",
        ));
    }

    let Some(path) = &form.staged else {
        return Err(AppError::Validation("no audio file uploaded".into()));
    };

    let duration_secs = match state.probe.duration_secs(path).await {
        Ok(duration) => duration,
        Err(err) => {
            tracing::warn!(email = %email, error = %err, "upload rejected: unreadable audio");
            return Err(AppError::Payload("unreadable audio file"));
        }
    };
    if duration_secs > MAX_DURATION_SECS {
        tracing::info!(email = %email, duration_secs, "upload rejected: too long");
        return Err(AppError::Payload(
            "audio longer than 5 minutes not allowed",
        ));
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();
    let post = Post::audio(email, &file_name, duration_secs, now);
    state.repos.posts.insert(&post).await?;

    tracing::info!(
        email = %email,
        post_id = %post.id,
        duration_secs,
        "audio upload admitted"
    );

    Ok(post)
}

/// Best-effort deletion of a staged artifact; failure is logged, never
/// surfaced (the rejection reason must win).
async fn discard_artifact(state: &AppState, path: &std::path::Path) {
    if let Err(err) = state.artifacts.delete(path).await {
        tracing::warn!(path = %path.display(), error = %err, "failed to delete staged upload");
    }
}
