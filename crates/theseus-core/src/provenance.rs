//! Line provenance tracing.
//!
//! A current line is matched against the file's text at its oldest known
//! revision. The match is positional: only lines within ±`window` of the
//! current position are candidates, which tolerates imports being added or
//! declarations being reordered without scanning the whole file. This is a
//! heuristic identity criterion, not a proof of lineage.

use tracing::{debug, warn};

use crate::history::RevisionHistoryProvider;
use crate::metrics::METRICS;
use crate::model::{LineAttribution, LineProvenance, Revision};
use crate::similarity::{is_original, similarity};

/// Oldest known content of a file.
#[derive(Debug, Clone)]
struct OriginText {
    revision: Revision,
    lines: Vec<String>,
}

/// Resolves current lines of one file to their earliest similar occurrence.
///
/// The oldest revision's text is fetched once in [`ProvenanceTracer::for_file`]
/// and reused for every line; tracing itself does no I/O.
#[derive(Debug, Clone)]
pub struct ProvenanceTracer {
    origin: Option<OriginText>,
    window: usize,
}

impl ProvenanceTracer {
    /// Load the oldest known text of `path`.
    ///
    /// A missing revision list or missing historical text never fails: the
    /// tracer degrades to treating every line as its own origin.
    pub async fn for_file(
        provider: &dyn RevisionHistoryProvider,
        path: &str,
        follow_renames: bool,
        window: usize,
    ) -> Self {
        let revisions = match provider.revision_list(path, follow_renames).await {
            Ok(revisions) => revisions,
            Err(e) => {
                debug!(path = %path, error = %e, "no revision list, lines are their own origin");
                METRICS.inc_history_fallbacks();
                return Self::without_history(window);
            }
        };

        let Some(oldest) = revisions.last() else {
            debug!(path = %path, "empty revision list, lines are their own origin");
            METRICS.inc_history_fallbacks();
            return Self::without_history(window);
        };

        match provider.file_at(&oldest.id, path).await {
            Ok(text) => Self {
                origin: Some(OriginText {
                    revision: oldest.clone(),
                    lines: text.split('\n').map(str::to_string).collect(),
                }),
                window,
            },
            Err(e) => {
                warn!(
                    path = %path,
                    revision = %oldest.short(),
                    error = %e,
                    "oldest content unavailable, lines are their own origin"
                );
                METRICS.inc_history_fallbacks();
                Self::without_history(window)
            }
        }
    }

    /// A tracer with no historical content: every line is its own origin.
    pub fn without_history(window: usize) -> Self {
        Self {
            origin: None,
            window,
        }
    }

    /// A tracer over already-known oldest content.
    pub fn with_origin(revision: Revision, text: &str, window: usize) -> Self {
        Self {
            origin: Some(OriginText {
                revision,
                lines: text.split('\n').map(str::to_string).collect(),
            }),
            window,
        }
    }

    pub fn has_history(&self) -> bool {
        self.origin.is_some()
    }

    /// Trace one current line (1-indexed `position`).
    pub fn trace(
        &self,
        current_text: &str,
        position: usize,
        attribution: &LineAttribution,
    ) -> LineProvenance {
        let (origin_text, origin_position, origin_revision, origin_timestamp) = match &self.origin {
            None => (
                current_text.to_string(),
                position,
                attribution.revision.clone(),
                attribution.timestamp,
            ),
            Some(origin) => {
                match find_similar_line(&origin.lines, position, current_text, self.window) {
                    Some((pos, text)) => (
                        text.to_string(),
                        pos,
                        origin.revision.id.clone(),
                        origin.revision.timestamp,
                    ),
                    None => (
                        String::new(),
                        0,
                        attribution.revision.clone(),
                        attribution.timestamp,
                    ),
                }
            }
        };

        let similarity = similarity(&origin_text, current_text);

        LineProvenance {
            current_text: current_text.to_string(),
            origin_text,
            current_position: position,
            origin_position,
            origin_revision,
            origin_timestamp,
            last_revision: attribution.revision.clone(),
            last_timestamp: attribution.timestamp,
            similarity,
        }
    }
}

/// Best match for `target` among `lines` within ±`window` of `position`.
///
/// Only candidates scoring at or above the originality threshold qualify;
/// ties go to the lowest index. Returns the 1-indexed position and the text.
pub fn find_similar_line<'a, S: AsRef<str>>(
    lines: &'a [S],
    position: usize,
    target: &str,
    window: usize,
) -> Option<(usize, &'a str)> {
    if lines.is_empty() {
        return None;
    }

    let idx = position.saturating_sub(1);
    let start = idx.saturating_sub(window);
    let end = idx.saturating_add(window).min(lines.len() - 1);
    if start > end {
        return None;
    }

    let mut best: Option<(usize, &'a str, f64)> = None;
    for (i, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        let line = line.as_ref();
        let score = similarity(target, line);
        if !is_original(score) {
            continue;
        }
        if best.map_or(true, |(_, _, best_score)| score > best_score) {
            best = Some((i + 1, line, score));
        }
    }

    best.map(|(pos, text, _)| (pos, text))
}
