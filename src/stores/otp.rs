//! One-time code registry.
//!
//! Codes live only for the process lifetime; nothing here touches durable
//! storage. One live entry per email - reissuing overwrites the previous
//! code. Entries are consumed by `verify` on success and otherwise left in
//! place (an expired entry is overwritten by the next `issue`).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;

/// Codes expire this long after issuance.
const OTP_TTL_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct OtpEntry {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of checking a submitted code, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
    Accepted,
    /// Nothing issued for this email, or the code was already consumed.
    NoEntry,
    Expired,
    Mismatch,
}

/// Store for one-time code operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Issue a fresh 6-digit code for `email`, overwriting any prior entry.
    async fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<OtpEntry>;

    /// Check a submitted code and consume the entry on success (single use).
    async fn verify(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<OtpOutcome>;

    /// Check a submitted code without consuming the entry. Used by flows
    /// where a later check may still reject the request - the code must
    /// survive such a rejection.
    async fn peek(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<OtpOutcome>;
}

/// Process-local implementation of OtpStore.
///
/// The map gives per-key locking: concurrent calls for the same email are
/// linearized while unrelated emails proceed in parallel.
#[derive(Default)]
pub struct InMemoryOtpStore {
    entries: DashMap<String, OtpEntry>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check(entry: &OtpEntry, code: &str, now: DateTime<Utc>) -> OtpOutcome {
    if now >= entry.expires_at {
        OtpOutcome::Expired
    } else if entry.code != code {
        OtpOutcome::Mismatch
    } else {
        OtpOutcome::Accepted
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<OtpEntry> {
        let code: String = {
            let mut rng = rand::rng();
            (0..6).map(|_| rng.random_range(0..10).to_string()).collect()
        };

        let entry = OtpEntry {
            code,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        };
        self.entries.insert(email.to_string(), entry.clone());

        Ok(entry)
    }

    async fn verify(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<OtpOutcome> {
        let outcome = match self.entries.entry(email.to_string()) {
            Entry::Vacant(_) => OtpOutcome::NoEntry,
            Entry::Occupied(occupied) => {
                let outcome = check(occupied.get(), code, now);
                if outcome == OtpOutcome::Accepted {
                    occupied.remove();
                }
                outcome
            }
        };

        Ok(outcome)
    }

    async fn peek(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<OtpOutcome> {
        let outcome = match self.entries.get(email) {
            None => OtpOutcome::NoEntry,
            Some(entry) => check(&entry, code, now),
        };

        Ok(outcome)
    }
}
