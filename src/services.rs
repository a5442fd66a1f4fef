//! External service abstractions.
//!
//! Each service the API depends on is abstracted behind a trait to enable
//! mocking in tests.
//!
//! ## Services
//!
//! - **email** - transactional mail via Resend (prod) or SMTP (dev);
//!   best-effort, failures are logged and never fail an admitted request
//! - **media** - decoded audio duration via lofty
//! - **storage** - filesystem staging/deletion of uploaded artifacts
//!
//! ## Usage in Handlers
//!
//! Services are accessed via `AppState`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let duration = state.probe.duration_secs(&path).await?;
//!     state.artifacts.delete(&path).await?;
//!
//!     if let Err(err) = state.email.send_otp_code(&email, &code).await {
//!         tracing::warn!(error = %err, "failed to send mail");
//!     }
//! }
//! ```

mod email;
mod media;
mod storage;

pub use email::{EmailSender, EmailSenderImpl};
pub use media::{AudioProbe, LoftyAudioProbe};
pub use storage::{ArtifactStore, FsArtifactStore};

#[cfg(test)]
pub use email::MockEmailSender;
#[cfg(test)]
pub use media::MockAudioProbe;
#[cfg(test)]
pub use storage::MockArtifactStore;
