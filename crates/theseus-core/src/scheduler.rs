//! Fixed-size worker pool running [`FileAnalysisPipeline`] over a file set.
//!
//! Paths are queued up front on a closed channel; each worker pulls until the
//! queue is empty. Results travel back over a second channel to a single
//! collector that feeds the [`ResultAggregator`]. No worker outlives
//! [`ParallelScheduler::run`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::aggregate::ResultAggregator;
use crate::error::{FileError, Result, TheseusError};
use crate::metrics::METRICS;
use crate::model::{CodebaseResult, FileResult};
use crate::pipeline::FileAnalysisPipeline;

/// Outcome of one scheduled batch.
#[derive(Debug)]
pub struct ScheduleReport {
    /// Aggregate over every file that succeeded (no snapshots yet).
    pub result: CodebaseResult,
    /// Files that were skipped, with the reason.
    pub failures: Vec<FileError>,
}

/// Runs file analyses on `workers` concurrent tasks.
#[derive(Debug, Clone, Copy)]
pub struct ParallelScheduler {
    workers: usize,
}

impl ParallelScheduler {
    /// `workers` is clamped to at least 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyze every path exactly once.
    ///
    /// A failing (or panicking) file is logged and recorded in
    /// [`ScheduleReport::failures`]; it never stops the batch.
    pub async fn run(
        &self,
        paths: Vec<String>,
        pipeline: FileAnalysisPipeline,
    ) -> Result<ScheduleReport> {
        let pool_size = self.workers.min(paths.len()).max(1);
        info!(files = paths.len(), workers = pool_size, "analyzing files");

        let (work_tx, work_rx) = mpsc::unbounded_channel::<String>();
        for path in paths {
            // receiver is alive until the workers finish
            let _ = work_tx.send(path);
        }
        drop(work_tx);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let (result_tx, mut result_rx) =
            mpsc::unbounded_channel::<std::result::Result<FileResult, FileError>>();

        let mut workers = JoinSet::new();
        for worker_id in 0..pool_size {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let pipeline = pipeline.clone();

            workers.spawn(async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some(path) = next else {
                        break;
                    };

                    let outcome = AssertUnwindSafe(pipeline.analyze(&path))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| Err(FileError::Panicked(path.clone())));

                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!(worker_id, "worker drained queue");
            });
        }
        drop(result_tx);

        let mut aggregator = ResultAggregator::new();
        let mut failures = Vec::new();
        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                Ok(file) => {
                    METRICS.inc_files_analyzed();
                    info!(
                        path = %file.path,
                        lines = file.total_lines,
                        original_pct = %format!("{:.1}", file.original_pct()),
                        "completed"
                    );
                    aggregator.add(file);
                }
                Err(e) => {
                    METRICS.inc_files_failed();
                    warn!(path = %e.path(), error = %e, "skipping file");
                    failures.push(e);
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            joined.map_err(|e| TheseusError::Join(e.to_string()))?;
        }

        Ok(ScheduleReport {
            result: aggregator.finish(),
            failures,
        })
    }
}
