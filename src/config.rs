use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::policy::AdmissionWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL connection string. When unset the server falls back to
    /// process-local in-memory storage for users and posts.
    #[serde(default)]
    pub database_url: Option<String>,
    /// SMTP URL for development email (e.g., smtp://localhost:1025)
    #[serde(default)]
    pub smtp_url: Option<String>,
    /// Resend API key for production email
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Directory staged audio uploads are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// IST window during which audio uploads are admitted.
    #[serde(default = "default_upload_window")]
    pub upload_window: AdmissionWindow,
    /// IST window during which subscription payments are admitted.
    #[serde(default = "default_payment_window")]
    pub payment_window: AdmissionWindow,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_upload_window() -> AdmissionWindow {
    AdmissionWindow::new(14, 0, 19, 0)
}

fn default_payment_window() -> AdmissionWindow {
    AdmissionWindow::new(10, 0, 11, 0)
}
