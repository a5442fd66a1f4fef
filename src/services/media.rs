//! Media metadata probing.
//!
//! The upload gate only needs the decoded duration of an audio container.
//! Probing is behind a trait so handler tests can simulate arbitrary
//! durations and decode failures without fixture files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use lofty::file::AudioFile;
use lofty::probe::Probe;

/// Trait for reading decoded media duration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioProbe: Send + Sync {
    /// Decoded duration of the audio file at `path`, in seconds.
    /// Fails on unreadable or corrupt containers.
    async fn duration_secs(&self, path: &Path) -> Result<f64>;
}

/// lofty-backed implementation of AudioProbe.
pub struct LoftyAudioProbe;

#[async_trait]
impl AudioProbe for LoftyAudioProbe {
    async fn duration_secs(&self, path: &Path) -> Result<f64> {
        let path: PathBuf = path.to_path_buf();

        // lofty does blocking file IO; keep it off the request threads.
        let duration = tokio::task::spawn_blocking(move || -> Result<f64> {
            let tagged = Probe::open(&path)
                .with_context(|| format!("opening {}", path.display()))?
                .read()
                .with_context(|| format!("decoding {}", path.display()))?;
            Ok(tagged.properties().duration().as_secs_f64())
        })
        .await??;

        Ok(duration)
    }
}
