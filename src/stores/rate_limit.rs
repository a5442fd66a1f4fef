//! Per-identity cooldown tracking.
//!
//! Used by the password-reset flow to enforce one request per identity per
//! cooldown period. The last-allowed timestamp is recorded only when this
//! check admits the attempt, so a denied attempt never extends the wait.
//! Entries are never evicted; the map holds one timestamp per identity.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Still cooling down; retry no sooner than this many milliseconds.
    Denied { retry_after_ms: i64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

/// Rate limiter trait for per-identity cooldowns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Admit the attempt if no prior attempt was admitted within `cooldown`.
    /// An attempt exactly at `last + cooldown` is admitted.
    async fn try_acquire(
        &self,
        email: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<RateDecision>;
}

/// Process-local implementation of RateLimiter.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    last_allowed: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn try_acquire(
        &self,
        email: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<RateDecision> {
        // The entry guard linearizes concurrent attempts for the same email,
        // so two racing requests cannot both observe "no prior attempt".
        let decision = match self.last_allowed.entry(email.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                RateDecision::Allowed
            }
            Entry::Occupied(mut occupied) => {
                let elapsed = now - *occupied.get();
                if elapsed >= cooldown {
                    occupied.insert(now);
                    RateDecision::Allowed
                } else {
                    RateDecision::Denied {
                        retry_after_ms: (cooldown - elapsed).num_milliseconds(),
                    }
                }
            }
        };

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn first_attempt_is_allowed_immediate_retry_is_denied() {
        let limiter = InMemoryRateLimiter::new();
        let cooldown = Duration::hours(24);
        let now = at(9, 0);

        let first = limiter.try_acquire("a@x.com", cooldown, now).await.unwrap();
        assert!(first.is_allowed());

        let second = limiter.try_acquire("a@x.com", cooldown, now).await.unwrap();
        match second {
            RateDecision::Denied { retry_after_ms } => {
                assert_eq!(retry_after_ms, cooldown.num_milliseconds());
            }
            RateDecision::Allowed => panic!("expected Denied"),
        }
    }

    #[tokio::test]
    async fn attempt_exactly_at_cooldown_is_allowed() {
        let limiter = InMemoryRateLimiter::new();
        let cooldown = Duration::hours(24);
        let now = at(9, 0);

        assert!(limiter
            .try_acquire("a@x.com", cooldown, now)
            .await
            .unwrap()
            .is_allowed());
        assert!(limiter
            .try_acquire("a@x.com", cooldown, now + cooldown)
            .await
            .unwrap()
            .is_allowed());
    }

    #[tokio::test]
    async fn denied_attempt_does_not_extend_the_wait() {
        let limiter = InMemoryRateLimiter::new();
        let cooldown = Duration::hours(24);
        let start = at(9, 0);

        assert!(limiter
            .try_acquire("a@x.com", cooldown, start)
            .await
            .unwrap()
            .is_allowed());

        // Denied halfway through; the window still ends 24h after `start`.
        let halfway = start + Duration::hours(12);
        assert!(!limiter
            .try_acquire("a@x.com", cooldown, halfway)
            .await
            .unwrap()
            .is_allowed());
        assert!(limiter
            .try_acquire("a@x.com", cooldown, start + cooldown)
            .await
            .unwrap()
            .is_allowed());
    }

    #[tokio::test]
    async fn identities_do_not_share_cooldowns() {
        let limiter = InMemoryRateLimiter::new();
        let cooldown = Duration::hours(24);
        let now = at(9, 0);

        assert!(limiter
            .try_acquire("a@x.com", cooldown, now)
            .await
            .unwrap()
            .is_allowed());
        assert!(limiter
            .try_acquire("b@x.com", cooldown, now)
            .await
            .unwrap()
            .is_allowed());
    }

    #[tokio::test]
    async fn denied_reports_remaining_wait() {
        let limiter = InMemoryRateLimiter::new();
        let cooldown = Duration::hours(24);
        let start = at(9, 0);

        limiter.try_acquire("a@x.com", cooldown, start).await.unwrap();

        let later = start + Duration::hours(20);
        match limiter.try_acquire("a@x.com", cooldown, later).await.unwrap() {
            RateDecision::Denied { retry_after_ms } => {
                assert_eq!(retry_after_ms, Duration::hours(4).num_milliseconds());
            }
            RateDecision::Allowed => panic!("expected Denied"),
        }
    }
}
