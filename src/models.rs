use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Free-form profile document (bio, location, avatar, ...), patched via
    /// PATCH /userupdate.
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_kind", rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Audio,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub kind: PostKind,
    pub email: String,
    /// Text body (text posts only).
    pub content: Option<String>,
    /// Attached photo URL (text posts only).
    pub photo: Option<String>,
    /// Staged audio file name (audio posts only).
    pub file: Option<String>,
    /// Decoded audio duration in seconds (audio posts only).
    pub duration_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn text(
        email: &str,
        content: &str,
        photo: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: PostKind::Text,
            email: email.to_string(),
            content: Some(content.to_string()),
            photo,
            file: None,
            duration_secs: None,
            created_at,
        }
    }

    pub fn audio(email: &str, file: &str, duration_secs: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: PostKind::Audio,
            email: email.to_string(),
            content: None,
            photo: None,
            file: Some(file.to_string()),
            duration_secs: Some(duration_secs),
            created_at,
        }
    }
}

/// Subscription tiers with their fixed invoice amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Bronze,
    Silver,
    Gold,
}

impl Plan {
    /// Parses a plan name; unrecognized names are rejected rather than
    /// falling through to an undefined amount.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "free" => Some(Plan::Free),
            "bronze" => Some(Plan::Bronze),
            "silver" => Some(Plan::Silver),
            "gold" => Some(Plan::Gold),
            _ => None,
        }
    }

    pub fn amount(self) -> i64 {
        match self {
            Plan::Free => 0,
            Plan::Bronze => 100,
            Plan::Silver => 300,
            Plan::Gold => 1000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Bronze => "bronze",
            Plan::Silver => "silver",
            Plan::Gold => "gold",
        }
    }
}

/// Mock invoice produced by the subscription flow; no payment gateway is
/// involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub email: String,
    pub plan: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
}
