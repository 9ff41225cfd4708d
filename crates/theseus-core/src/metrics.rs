//! Run counters: files analyzed and skipped, lines traced, and how often a
//! file had to fall back to being its own origin.
//!
//! Counters are process-wide. A run takes a [`MetricsSnapshot`] when it
//! starts and [`Metrics::flush`] logs only what changed since then.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

/// Lock-free atomic counters for one process.
pub struct Metrics {
    files_analyzed: AtomicU64,
    files_failed: AtomicU64,
    lines_traced: AtomicU64,
    history_fallbacks: AtomicU64,
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub files_analyzed: u64,
    pub files_failed: u64,
    pub lines_traced: u64,
    pub history_fallbacks: u64,
}

impl MetricsSnapshot {
    /// Counts added between `earlier` and `self`.
    pub fn since(&self, earlier: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            files_analyzed: self.files_analyzed.saturating_sub(earlier.files_analyzed),
            files_failed: self.files_failed.saturating_sub(earlier.files_failed),
            lines_traced: self.lines_traced.saturating_sub(earlier.lines_traced),
            history_fallbacks: self.history_fallbacks.saturating_sub(earlier.history_fallbacks),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            files_analyzed: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            lines_traced: AtomicU64::new(0),
            history_fallbacks: AtomicU64::new(0),
        }
    }

    pub fn inc_files_analyzed(&self) {
        self.files_analyzed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "files_analyzed", "counter incremented");
    }

    pub fn inc_files_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "files_failed", "counter incremented");
    }

    /// Add `n` traced lines.
    pub fn add_lines_traced(&self, n: u64) {
        self.lines_traced.fetch_add(n, Ordering::Relaxed);
    }

    /// A file whose history was unavailable and fell back to "own origin".
    pub fn inc_history_fallbacks(&self) {
        self.history_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "history_fallbacks", "counter incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_analyzed: self.files_analyzed(),
            files_failed: self.files_failed(),
            lines_traced: self.lines_traced(),
            history_fallbacks: self.history_fallbacks(),
        }
    }

    /// Log the counts accumulated since `start` as one `info!` event.
    pub fn flush(&self, start: &MetricsSnapshot) -> MetricsSnapshot {
        let run = self.snapshot().since(start);
        tracing::info!(
            files_analyzed = run.files_analyzed,
            files_failed = run.files_failed,
            lines_traced = run.lines_traced,
            history_fallbacks = run.history_fallbacks,
            "run totals"
        );
        run
    }

    pub fn files_analyzed(&self) -> u64 {
        self.files_analyzed.load(Ordering::Relaxed)
    }

    pub fn files_failed(&self) -> u64 {
        self.files_failed.load(Ordering::Relaxed)
    }

    pub fn lines_traced(&self) -> u64 {
        self.lines_traced.load(Ordering::Relaxed)
    }

    pub fn history_fallbacks(&self) -> u64 {
        self.history_fallbacks.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.files_analyzed.store(0, Ordering::Relaxed);
        self.files_failed.store(0, Ordering::Relaxed);
        self.lines_traced.store(0, Ordering::Relaxed);
        self.history_fallbacks.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let metrics = Metrics::new();
        metrics.inc_files_analyzed();
        metrics.inc_files_analyzed();
        assert_eq!(metrics.files_analyzed(), 2);

        metrics.inc_files_failed();
        assert_eq!(metrics.files_failed(), 1);

        metrics.add_lines_traced(40);
        metrics.add_lines_traced(2);
        assert_eq!(metrics.lines_traced(), 42);

        metrics.inc_history_fallbacks();
        assert_eq!(metrics.history_fallbacks(), 1);
    }

    #[test]
    fn test_flush_reports_only_counts_since_start() {
        let metrics = Metrics::new();
        metrics.inc_files_analyzed();
        metrics.add_lines_traced(100);
        metrics.inc_history_fallbacks();

        let start = metrics.snapshot();
        metrics.inc_files_analyzed();
        metrics.inc_files_failed();
        metrics.add_lines_traced(7);

        let run = metrics.flush(&start);
        assert_eq!(
            run,
            MetricsSnapshot {
                files_analyzed: 1,
                files_failed: 1,
                lines_traced: 7,
                history_fallbacks: 0,
            }
        );
        // process-wide counters are untouched
        assert_eq!(metrics.files_analyzed(), 2);
        assert_eq!(metrics.lines_traced(), 107);
    }

    #[test]
    fn test_reset_clears_counts() {
        let metrics = Metrics::new();
        metrics.inc_files_analyzed();
        metrics.inc_files_failed();
        metrics.add_lines_traced(5);
        metrics.inc_history_fallbacks();
        metrics.reset();
        assert_eq!(metrics.files_analyzed(), 0);
        assert_eq!(metrics.files_failed(), 0);
        assert_eq!(metrics.lines_traced(), 0);
        assert_eq!(metrics.history_fallbacks(), 0);
    }
}
