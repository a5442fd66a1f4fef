//! Ephemeral stores (process-local).
//!
//! Short-lived request-gating state that is intentionally not persisted:
//! one-time codes and rate-limit timestamps live only for the process
//! lifetime and are lost on restart.
//!
//! ## Stores
//!
//! - **otp** - one-time codes keyed by email (5 min TTL, single use)
//! - **rate_limit** - per-email cooldown timestamps (password reset)
//!
//! Both are concurrent maps with per-key locking, so operations on the same
//! email are linearized while unrelated emails never block each other.
//!
//! ## Usage in Handlers
//!
//! Stores are accessed via `state.stores`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let entry = state.stores.otp.issue(&email, Utc::now()).await?;
//!     let decision = state.stores.rate_limiter.try_acquire(&email, cooldown, now).await?;
//! }
//! ```

mod otp;
mod rate_limit;

pub use otp::{InMemoryOtpStore, OtpEntry, OtpOutcome, OtpStore};
pub use rate_limit::{InMemoryRateLimiter, RateDecision, RateLimiter};

#[cfg(test)]
pub use otp::MockOtpStore;
#[cfg(test)]
pub use rate_limit::MockRateLimiter;

use std::sync::Arc;

/// Collection of all ephemeral stores.
#[derive(Clone)]
pub struct Stores {
    pub otp: Arc<dyn OtpStore>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}
