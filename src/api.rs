//! API request/response types.
//!
//! Request payloads carry garde validation rules; handlers call
//! `payload.validate()` before acting on them.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::{Invoice, Post};

/// Request a one-time code for an email address.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestOtpPayload {
    #[garde(email)]
    pub email: String,
}

/// Returned after issuing a one-time code.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestOtpResponse {
    pub expires_at: DateTime<Utc>,
}

/// Submit the one-time code received via email.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct VerifyOtpPayload {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 6), pattern(r"^[0-9]+$"))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub name: String,
}

/// Profile fields patched into the user's profile document. All fields are
/// optional; absent fields are left untouched.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub dob: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePostPayload {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1, max = 10_000))]
    pub content: String,
    #[garde(skip)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub post: Post,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordPayload {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubscribePayload {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub plan: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub invoice: Invoice,
}

/// `?email=` query used by the per-user lookup endpoints.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}
