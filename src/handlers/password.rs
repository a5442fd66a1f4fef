//! Password-reset request endpoint.
//!
//! Rate limited to one admitted request per email per 24 hours; the
//! timestamp is recorded only when the limiter admits the attempt, so a
//! denied request never extends the wait. The temporary password is emailed
//! best-effort and deliberately never persisted or hashed here - storing
//! credentials is outside this service.

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use chrono::{Duration, Utc};
use garde::Validate;
use rand::Rng;

use crate::{
    api::{ForgotPasswordPayload, ForgotPasswordResponse},
    error::AppError,
    state::AppState,
    stores::RateDecision,
};

/// One admitted reset request per email per day.
const RESET_COOLDOWN_HOURS: i64 = 24;
const TEMP_PASSWORD_LEN: usize = 12;

pub fn router() -> Router<AppState> {
    Router::new().route("/forgot-password", post(forgot_password))
}

#[debug_handler]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let decision = state
        .stores
        .rate_limiter
        .try_acquire(&email, Duration::hours(RESET_COOLDOWN_HOURS), Utc::now())
        .await?;

    if let RateDecision::Denied { retry_after_ms } = decision {
        tracing::info!(email = %email, retry_after_ms, "password reset rejected: too soon");
        return Err(AppError::TooSoon {
            message: "You can request forgot password only once per day",
            retry_after_ms,
        });
    }

    let password = generate_temp_password(TEMP_PASSWORD_LEN);

    if let Err(err) = state.email.send_temp_password(&email, &password).await {
        tracing::warn!(email = %email, error = %err, "failed to send password reset email");
    }

    tracing::info!(email = %email, "password reset admitted");

    Ok(Json(ForgotPasswordResponse {
        note: "Password reset email sent".to_string(),
    }))
}

/// Temporary password of alternating lower/upper-case letters by position
/// (even index lower), each drawn uniformly from its 26-letter pool. No
/// digits or symbols.
fn generate_temp_password(len: usize) -> String {
    const LOWERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

    let mut rng = rand::rng();
    (0..len)
        .map(|i| {
            let c = LOWERS[rng.random_range(0..LOWERS.len())] as char;
            if i % 2 == 0 { c } else { c.to_ascii_uppercase() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockEmailSender;
    use crate::stores::MockRateLimiter;
    use crate::test_utils::TestStateBuilder;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn fresh_identity_is_admitted_and_emailed() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_try_acquire()
            .withf(|email, cooldown, _| email == "a@x.com" && *cooldown == Duration::hours(24))
            .returning(|_, _, _| Ok(RateDecision::Allowed));

        let mut email = MockEmailSender::new();
        email
            .expect_send_temp_password()
            .withf(|to, password| {
                to == "a@x.com" && password.len() == 12 && password.chars().all(|c| c.is_ascii_alphabetic())
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let state = TestStateBuilder::new()
            .with_rate_limiter(limiter)
            .with_email_sender(email)
            .build();

        let payload = ForgotPasswordPayload {
            email: "a@x.com".to_string(),
        };
        let result = forgot_password(State(state), Json(payload)).await.unwrap();

        assert_eq!(result.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cooling_down_identity_gets_retry_hint() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_try_acquire().returning(|_, _, _| {
            Ok(RateDecision::Denied {
                retry_after_ms: 3_600_000,
            })
        });

        let state = TestStateBuilder::new().with_rate_limiter(limiter).build();

        let payload = ForgotPasswordPayload {
            email: "a@x.com".to_string(),
        };
        let result = forgot_password(State(state), Json(payload)).await;

        match result {
            Err(AppError::TooSoon { retry_after_ms, .. }) => {
                assert_eq!(retry_after_ms, 3_600_000);
            }
            _ => panic!("expected TooSoon"),
        }
    }

    #[tokio::test]
    async fn mail_outage_does_not_fail_an_admitted_request() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_try_acquire()
            .returning(|_, _, _| Ok(RateDecision::Allowed));

        let mut email = MockEmailSender::new();
        email
            .expect_send_temp_password()
            .returning(|_, _| Err(anyhow::anyhow!("smtp down")));

        let state = TestStateBuilder::new()
            .with_rate_limiter(limiter)
            .with_email_sender(email)
            .build();

        let payload = ForgotPasswordPayload {
            email: "a@x.com".to_string(),
        };
        assert!(forgot_password(State(state), Json(payload)).await.is_ok());
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let state = TestStateBuilder::new().build();

        let payload = ForgotPasswordPayload {
            email: "".to_string(),
        };
        let result = forgot_password(State(state), Json(payload)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn temp_password_alternates_case_by_position() {
        for _ in 0..50 {
            let password = generate_temp_password(12);
            assert_eq!(password.len(), 12);
            for (i, c) in password.chars().enumerate() {
                assert!(c.is_ascii_alphabetic());
                if i % 2 == 0 {
                    assert!(c.is_ascii_lowercase(), "even index must be lowercase: {password}");
                } else {
                    assert!(c.is_ascii_uppercase(), "odd index must be uppercase: {password}");
                }
            }
        }
    }
}
