use std::sync::Arc;

use crate::{
    config::Config,
    repos::Repos,
    services::{ArtifactStore, AudioProbe, EmailSender},
    stores::Stores,
};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Durable repositories (PostgreSQL or in-memory fallback).
    pub repos: Repos,
    /// Ephemeral stores (process-local).
    pub stores: Stores,
    /// Email sender.
    pub email: Arc<dyn EmailSender>,
    /// Audio metadata probe.
    pub probe: Arc<dyn AudioProbe>,
    /// Staged-upload storage.
    pub artifacts: Arc<dyn ArtifactStore>,
    /// Name of the active persistence backend, for health reporting.
    pub backend: &'static str,
}
