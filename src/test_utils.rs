//! Shared test utilities for handler tests.
//!
//! Provides common mock factories and a flexible `TestStateBuilder` for
//! constructing `AppState` instances with only the doubles needed for each
//! test. Anything not configured defaults to an empty mock, which panics on
//! unexpected calls - a useful assertion in itself.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, mock_user};
//!
//! let mut users = MockUserRepo::new();
//! users.expect_find_by_email().returning(|_| Ok(None));
//!
//! let state = TestStateBuilder::new().with_user_repo(users).build();
//! ```

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::User;
use crate::policy::AdmissionWindow;
use crate::repos::{MockPostRepo, MockUserRepo, PostRepo, Repos, UserRepo};
use crate::services::{
    ArtifactStore, AudioProbe, EmailSender, MockArtifactStore, MockAudioProbe, MockEmailSender,
};
use crate::state::AppState;
use crate::stores::{MockOtpStore, MockRateLimiter, OtpStore, RateLimiter, Stores};

/// Creates a test configuration with the default admission windows.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 5000,
        database_url: None,
        smtp_url: None,
        resend_api_key: None,
        upload_dir: "uploads".into(),
        upload_window: AdmissionWindow::new(14, 0, 19, 0),
        payment_window: AdmissionWindow::new(10, 0, 11, 0),
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Creates a mock user with the given email.
pub fn mock_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: Some("Test User".to_string()),
        profile: serde_json::json!({}),
        created_at: Utc::now(),
    }
}

/// Builder for constructing test `AppState` with custom doubles.
///
/// Accepts any implementation of the relevant trait, so tests can pass
/// either a mockall mock or a real in-memory implementation.
pub struct TestStateBuilder {
    user_repo: Option<Arc<dyn UserRepo>>,
    post_repo: Option<Arc<dyn PostRepo>>,
    otp_store: Option<Arc<dyn OtpStore>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    email_sender: Option<Arc<dyn EmailSender>>,
    audio_probe: Option<Arc<dyn AudioProbe>>,
    artifact_store: Option<Arc<dyn ArtifactStore>>,
}

impl TestStateBuilder {
    /// Creates a new builder with no doubles configured.
    pub fn new() -> Self {
        Self {
            user_repo: None,
            post_repo: None,
            otp_store: None,
            rate_limiter: None,
            email_sender: None,
            audio_probe: None,
            artifact_store: None,
        }
    }

    pub fn with_user_repo(mut self, repo: impl UserRepo + 'static) -> Self {
        self.user_repo = Some(Arc::new(repo));
        self
    }

    pub fn with_post_repo(mut self, repo: impl PostRepo + 'static) -> Self {
        self.post_repo = Some(Arc::new(repo));
        self
    }

    pub fn with_otp_store(mut self, store: impl OtpStore + 'static) -> Self {
        self.otp_store = Some(Arc::new(store));
        self
    }

    pub fn with_rate_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_email_sender(mut self, sender: impl EmailSender + 'static) -> Self {
        self.email_sender = Some(Arc::new(sender));
        self
    }

    pub fn with_audio_probe(mut self, probe: impl AudioProbe + 'static) -> Self {
        self.audio_probe = Some(Arc::new(probe));
        self
    }

    pub fn with_artifact_store(mut self, store: impl ArtifactStore + 'static) -> Self {
        self.artifact_store = Some(Arc::new(store));
        self
    }

    /// Builds the `AppState` using configured doubles or empty mocks.
    pub fn build(self) -> AppState {
        AppState {
            config: test_config(),
            repos: Repos {
                users: self
                    .user_repo
                    .unwrap_or_else(|| Arc::new(MockUserRepo::new())),
                posts: self
                    .post_repo
                    .unwrap_or_else(|| Arc::new(MockPostRepo::new())),
            },
            stores: Stores {
                otp: self
                    .otp_store
                    .unwrap_or_else(|| Arc::new(MockOtpStore::new())),
                rate_limiter: self
                    .rate_limiter
                    .unwrap_or_else(|| Arc::new(MockRateLimiter::new())),
            },
            email: self
                .email_sender
                .unwrap_or_else(|| Arc::new(MockEmailSender::new())),
            probe: self
                .audio_probe
                .unwrap_or_else(|| Arc::new(MockAudioProbe::new())),
            artifacts: self
                .artifact_store
                .unwrap_or_else(|| Arc::new(MockArtifactStore::new())),
            backend: "memory",
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
