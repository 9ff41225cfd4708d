//! Folding per-file results into repository totals.
//!
//! Files arrive from the scheduler in completion order. [`ResultAggregator`]
//! sorts them by path before computing the weighted mean, so the final
//! [`CodebaseResult`] is identical for any arrival order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{CodebaseResult, FileResult};

/// Incremental collector for [`FileResult`]s.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    files: Vec<FileResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: FileResult) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum line counts and take the line-weighted mean similarity.
    ///
    /// Snapshots are left empty; they are attached once aggregation is done.
    pub fn finish(mut self) -> CodebaseResult {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));

        let total_lines: usize = self.files.iter().map(|f| f.total_lines).sum();
        let original_lines: usize = self.files.iter().map(|f| f.original_lines).sum();
        let weighted: f64 = self
            .files
            .iter()
            .map(|f| f.average_similarity * f.total_lines as f64)
            .sum();

        let average_similarity = if total_lines == 0 {
            0.0
        } else {
            weighted / total_lines as f64
        };

        CodebaseResult {
            total_lines,
            original_lines,
            average_similarity,
            files: self.files,
            snapshots: Vec::new(),
        }
    }
}

/// Aggregate a complete set of file results.
pub fn aggregate(files: impl IntoIterator<Item = FileResult>) -> CodebaseResult {
    let mut aggregator = ResultAggregator::new();
    for file in files {
        aggregator.add(file);
    }
    aggregator.finish()
}

/// Coarse reading of an originality percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    /// ≥ 80%
    Stable,
    /// ≥ 60%
    Continuous,
    /// ≥ 40%
    Evolved,
    /// ≥ 20%
    Transformed,
    Reimagined,
}

impl Interpretation {
    pub fn from_pct(pct: f64) -> Self {
        match pct {
            p if p >= 80.0 => Interpretation::Stable,
            p if p >= 60.0 => Interpretation::Continuous,
            p if p >= 40.0 => Interpretation::Evolved,
            p if p >= 20.0 => Interpretation::Transformed,
            _ => Interpretation::Reimagined,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Interpretation::Stable => {
                "Remarkably stable: most code remains close to its original form."
            }
            Interpretation::Continuous => {
                "Strong continuity with its origins: core structures persist."
            }
            Interpretation::Evolved => {
                "Substantial evolution: many planks have been replaced."
            }
            Interpretation::Transformed => {
                "Heavily transformed: few traces of the original code remain."
            }
            Interpretation::Reimagined => {
                "Completely reimagined: little resemblance to its origins."
            }
        }
    }
}

impl CodebaseResult {
    pub fn interpretation(&self) -> Interpretation {
        Interpretation::from_pct(self.original_pct())
    }

    /// Files with the lowest original percentage first.
    pub fn most_transformed(&self, n: usize) -> Vec<&FileResult> {
        self.ranked(n, |a, b| a.original_pct().total_cmp(&b.original_pct()))
    }

    /// Files with the highest original percentage first.
    pub fn most_stable(&self, n: usize) -> Vec<&FileResult> {
        self.ranked(n, |a, b| b.original_pct().total_cmp(&a.original_pct()))
    }

    fn ranked<F>(&self, n: usize, by_pct: F) -> Vec<&FileResult>
    where
        F: Fn(&FileResult, &FileResult) -> Ordering,
    {
        let mut files: Vec<&FileResult> = self.files.iter().collect();
        files.sort_by(|a, b| by_pct(a, b).then_with(|| a.path.cmp(&b.path)));
        files.truncate(n);
        files
    }
}
