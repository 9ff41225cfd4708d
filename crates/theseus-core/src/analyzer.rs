//! End-to-end repository analysis.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::classify::LineClassifier;
use crate::config::AnalysisConfig;
use crate::error::{FileError, HistoryResult, Result, TheseusError};
use crate::history::RevisionHistoryProvider;
use crate::metrics::METRICS;
use crate::model::CodebaseResult;
use crate::pipeline::FileAnalysisPipeline;
use crate::scheduler::ParallelScheduler;
use crate::timeline::TimelineEstimator;

/// Outcome of [`analyze_repository`].
#[derive(Debug)]
pub struct AnalysisReport {
    pub result: CodebaseResult,
    /// Files that were skipped, with the reason.
    pub skipped: Vec<FileError>,
}

/// Analyze every tracked, non-skippable file in `repo`.
///
/// Fails only when the provider is not backed by a repository, no file is
/// left after filtering, or `config` is invalid. Per-file failures end up in
/// [`AnalysisReport::skipped`]; a timeline failure leaves the snapshot list
/// empty.
#[instrument(skip_all, fields(repo = %repo.display(), workers = config.workers))]
pub async fn analyze_repository(
    repo: &Path,
    provider: Arc<dyn RevisionHistoryProvider>,
    classifier: Arc<dyn LineClassifier>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;
    let metrics_start = METRICS.snapshot();

    if !provider.is_repository().await {
        return Err(TheseusError::NotARepository(repo.to_path_buf()));
    }

    let tracked = provider.tracked_files().await?;
    let tracked_count = tracked.len();
    let paths: Vec<String> = tracked
        .into_iter()
        .filter(|path| !classifier.is_skippable_path(path))
        .collect();
    if paths.is_empty() {
        return Err(TheseusError::NoFiles);
    }
    info!(
        tracked = tracked_count,
        selected = paths.len(),
        "discovered files"
    );

    let pipeline = FileAnalysisPipeline::new(Arc::clone(&provider), classifier, config);
    let report = ParallelScheduler::new(config.workers)
        .run(paths, pipeline)
        .await?;

    let mut result = report.result;
    if let Err(e) = attach_timeline(provider.as_ref(), &mut result, config.sample_stride).await {
        warn!(error = %e, "could not estimate history timeline");
    }

    METRICS.flush(&metrics_start);
    Ok(AnalysisReport {
        result,
        skipped: report.failures,
    })
}

/// Fill `result.snapshots` from the repository-wide revision list.
///
/// Leaves the snapshots untouched on error.
pub async fn attach_timeline(
    provider: &dyn RevisionHistoryProvider,
    result: &mut CodebaseResult,
    sample_stride: usize,
) -> HistoryResult<()> {
    let revisions = provider.all_revisions().await?;
    result.snapshots = TimelineEstimator::new(provider, sample_stride)
        .estimate(&revisions, result.original_pct())
        .await;
    info!(
        revisions = revisions.len(),
        snapshots = result.snapshots.len(),
        "estimated timeline"
    );
    Ok(())
}
