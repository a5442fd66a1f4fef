//! One-time code endpoints.
//!
//! Flow:
//! 1. User requests a code via POST /request-otp with their email
//! 2. A 6-digit code is stored in the process-local registry (5 min TTL)
//!    and emailed to the user (best-effort)
//! 3. User submits email + code to POST /verify-otp
//! 4. The code is checked in order: issued at all, not expired, matching;
//!    a successful verification consumes it (single use)
//!
//! The upload flow checks codes through the same registry but without
//! consuming them - see `handlers::uploads`.

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use chrono::Utc;
use garde::Validate;

use crate::{
    api::{RequestOtpPayload, RequestOtpResponse, VerifyOtpPayload, VerifyOtpResponse},
    error::AppError,
    state::AppState,
    stores::OtpOutcome,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
}

#[debug_handler]
async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let entry = state.stores.otp.issue(&email, Utc::now()).await?;

    // Best-effort: a mail outage must not fail issuance.
    if let Err(err) = state.email.send_otp_code(&email, &entry.code).await {
        tracing::warn!(email = %email, error = %err, "failed to send otp email");
    }

    tracing::info!(email = %email, "otp issued");

    Ok(Json(RequestOtpResponse {
        expires_at: entry.expires_at,
    }))
}

#[debug_handler]
async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let outcome = state
        .stores
        .otp
        .verify(&email, payload.code.trim(), Utc::now())
        .await?;

    match outcome {
        OtpOutcome::Accepted => {
            tracing::info!(email = %email, "otp verified");
            Ok(Json(VerifyOtpResponse { ok: true }))
        }
        OtpOutcome::NoEntry => {
            tracing::warn!(email = %email, "otp verification failed: no code requested");
            Err(AppError::Validation("no otp requested".into()))
        }
        OtpOutcome::Expired => {
            tracing::warn!(email = %email, "otp verification failed: expired");
            Err(AppError::Validation("otp expired".into()))
        }
        OtpOutcome::Mismatch => {
            tracing::warn!(email = %email, "otp verification failed: mismatch");
            Err(AppError::Validation("invalid otp".into()))
        }
    }
}
