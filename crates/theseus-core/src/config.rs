//! Analysis configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TheseusError};

/// Default sampling stride for the history timeline.
pub const DEFAULT_SAMPLE_STRIDE: usize = 50;

/// Default positional tolerance (±lines) when matching against old content.
pub const DEFAULT_WINDOW: usize = 10;

/// Tunables for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of concurrent file workers.
    pub workers: usize,
    /// Sample every Nth revision for the timeline.
    pub sample_stride: usize,
    /// How far (±lines) a line may have moved and still match.
    pub window: usize,
    /// Ask the provider to follow renames when listing a file's revisions.
    pub follow_renames: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            window: DEFAULT_WINDOW,
            follow_renames: true,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with `THESEUS_WORKERS` / `THESEUS_SAMPLE`.
    ///
    /// Unparseable or zero values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(workers) = positive_env("THESEUS_WORKERS") {
            config.workers = workers;
        }
        if let Some(stride) = positive_env("THESEUS_SAMPLE") {
            config.sample_stride = stride;
        }
        config
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_sample_stride(mut self, sample_stride: usize) -> Self {
        self.sample_stride = sample_stride;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_follow_renames(mut self, follow_renames: bool) -> Self {
        self.follow_renames = follow_renames;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(TheseusError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.sample_stride == 0 {
            return Err(TheseusError::InvalidConfig(
                "sample stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Available hardware parallelism, or 1 when it cannot be determined.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn positive_env(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(key = %key, value = %raw, "ignoring invalid value");
            None
        }
    }
}
