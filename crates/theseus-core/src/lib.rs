//! Theseus Core Library
//!
//! Measures how much of a codebase is still "original": every current line
//! is traced back to the oldest revision of its file and compared by
//! normalized edit distance. Results roll up per file and per repository,
//! with a heuristic originality timeline over sampled history.
//!
//! The entry point is [`analyze_repository`]; history comes from any
//! [`RevisionHistoryProvider`] ([`GitHistoryProvider`] in production,
//! [`MemoryHistoryProvider`] in tests).

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod config;
pub mod error;
pub mod fakes;
pub mod git;
pub mod history;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod provenance;
pub mod scheduler;
pub mod similarity;
pub mod telemetry;
pub mod timeline;

pub use aggregate::{aggregate, Interpretation, ResultAggregator};
pub use analyzer::{analyze_repository, attach_timeline, AnalysisReport};
pub use classify::{DefaultClassifier, LineClassifier};
pub use config::AnalysisConfig;
pub use error::{FileError, HistoryError, HistoryResult, Result, TheseusError};
pub use fakes::MemoryHistoryProvider;
pub use git::{is_git_repo, GitHistoryProvider};
pub use history::RevisionHistoryProvider;
pub use model::{
    ChurnStats, CodebaseResult, FileResult, HistorySnapshot, LineAttribution, LineProvenance,
    Revision,
};
pub use pipeline::FileAnalysisPipeline;
pub use provenance::ProvenanceTracer;
pub use scheduler::{ParallelScheduler, ScheduleReport};
pub use similarity::{similarity, ORIGINALITY_THRESHOLD};
pub use timeline::{churn_factor, TimelineEstimator};

pub use metrics::{MetricsSnapshot, METRICS};
pub use telemetry::init_tracing;

/// Theseus version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
