//! Per-file analysis: read, attribute, classify, trace, summarise.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::classify::LineClassifier;
use crate::config::AnalysisConfig;
use crate::error::FileError;
use crate::history::RevisionHistoryProvider;
use crate::metrics::METRICS;
use crate::model::FileResult;
use crate::provenance::ProvenanceTracer;

/// Analyzes one file end to end.
///
/// Cheap to clone; every worker holds its own handle to the shared provider
/// and classifier.
#[derive(Clone)]
pub struct FileAnalysisPipeline {
    provider: Arc<dyn RevisionHistoryProvider>,
    classifier: Arc<dyn LineClassifier>,
    follow_renames: bool,
    window: usize,
}

impl FileAnalysisPipeline {
    pub fn new(
        provider: Arc<dyn RevisionHistoryProvider>,
        classifier: Arc<dyn LineClassifier>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            provider,
            classifier,
            follow_renames: config.follow_renames,
            window: config.window,
        }
    }

    /// Trace every kept line of `path` back to its origin.
    ///
    /// Attribution may cover fewer lines than the raw content (a trailing
    /// newline yields an extra empty segment); the content is truncated to
    /// the attributed length. Attribution covering *more* lines than the
    /// content, or no code lines surviving classification, fail this file
    /// only.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn analyze(&self, path: &str) -> Result<FileResult, FileError> {
        let (content, attribution) = futures::future::join(
            self.provider.current_content(path),
            self.provider.line_attribution(path),
        )
        .await;

        let content = content.map_err(|source| FileError::Read {
            path: path.to_string(),
            source,
        })?;
        let attribution = attribution.map_err(|source| FileError::Attribution {
            path: path.to_string(),
            source,
        })?;

        let mut lines: Vec<&str> = content.split('\n').collect();
        if attribution.len() > lines.len() {
            return Err(FileError::LengthMismatch {
                path: path.to_string(),
                attributed: attribution.len(),
                actual: lines.len(),
            });
        }
        if attribution.len() < lines.len() {
            debug!(
                attributed = attribution.len(),
                raw = lines.len(),
                "truncating content to attributed lines"
            );
            lines.truncate(attribution.len());
        }

        let kept: Vec<(usize, &str)> = lines
            .iter()
            .enumerate()
            .filter(|(_, text)| !self.classifier.is_skippable_line(text, path))
            .map(|(idx, text)| (idx, *text))
            .collect();

        if kept.is_empty() {
            return Err(FileError::NoCodeLines(path.to_string()));
        }

        let tracer = ProvenanceTracer::for_file(
            self.provider.as_ref(),
            path,
            self.follow_renames,
            self.window,
        )
        .await;

        let provenance = kept
            .into_iter()
            .map(|(idx, text)| tracer.trace(text, idx + 1, &attribution[idx]))
            .collect::<Vec<_>>();

        METRICS.add_lines_traced(provenance.len() as u64);
        let result = FileResult::from_lines(path, provenance);
        debug!(
            total = result.total_lines,
            original = result.original_lines,
            "file traced"
        );
        Ok(result)
    }
}
