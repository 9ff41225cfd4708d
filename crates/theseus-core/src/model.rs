//! Result types produced by an analysis run.
//!
//! Everything here is built once and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::similarity::is_original;

/// A revision (commit) with its committer timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl Revision {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }

    /// Abbreviated revision id for display.
    pub fn short(&self) -> &str {
        short_id(&self.id)
    }
}

/// First 8 characters of a revision id (or all of it if shorter).
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}

/// The revision that last modified one current line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAttribution {
    pub revision: String,
    /// 1-indexed line number in the current file.
    pub line_number: usize,
    pub timestamp: DateTime<Utc>,
}

/// Lines added and removed by one revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnStats {
    pub additions: u64,
    pub deletions: u64,
}

impl ChurnStats {
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Where one current line came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineProvenance {
    pub current_text: String,
    /// Empty when no similar line was found in the oldest revision.
    pub origin_text: String,
    /// 1-indexed.
    pub current_position: usize,
    /// 1-indexed; 0 when no origin was found.
    pub origin_position: usize,
    pub origin_revision: String,
    pub origin_timestamp: DateTime<Utc>,
    pub last_revision: String,
    pub last_timestamp: DateTime<Utc>,
    /// `similarity(origin_text, current_text)`.
    pub similarity: f64,
}

impl LineProvenance {
    pub fn is_original(&self) -> bool {
        is_original(self.similarity)
    }
}

/// Per-file analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub total_lines: usize,
    pub original_lines: usize,
    pub average_similarity: f64,
    pub lines: Vec<LineProvenance>,
}

impl FileResult {
    /// Build a result from traced lines; counts are derived, never supplied.
    pub fn from_lines(path: impl Into<String>, lines: Vec<LineProvenance>) -> Self {
        let total_lines = lines.len();
        let original_lines = lines.iter().filter(|l| l.is_original()).count();
        let average_similarity = if total_lines == 0 {
            0.0
        } else {
            lines.iter().map(|l| l.similarity).sum::<f64>() / total_lines as f64
        };

        Self {
            path: path.into(),
            total_lines,
            original_lines,
            average_similarity,
            lines,
        }
    }

    /// Share of original lines, as a percentage.
    pub fn original_pct(&self) -> f64 {
        percentage(self.original_lines, self.total_lines)
    }
}

/// Estimated originality at one sampled revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub revision_id: String,
    pub timestamp: DateTime<Utc>,
    pub estimated_original_pct: f64,
}

/// Repository-wide result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebaseResult {
    pub total_lines: usize,
    pub original_lines: usize,
    /// Line-weighted mean of per-file average similarity.
    pub average_similarity: f64,
    pub files: Vec<FileResult>,
    /// Oldest first; the last entry is pinned to [`CodebaseResult::original_pct`].
    pub snapshots: Vec<HistorySnapshot>,
}

impl CodebaseResult {
    /// Exact measured share of original lines, as a percentage.
    pub fn original_pct(&self) -> f64 {
        percentage(self.original_lines, self.total_lines)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
