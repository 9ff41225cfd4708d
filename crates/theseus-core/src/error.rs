//! Error taxonomy for Theseus.
//!
//! Three layers, matching how far a failure is allowed to travel:
//! - [`HistoryError`] from a revision-history provider call,
//! - [`FileError`] for a single file (skipped with a warning),
//! - [`TheseusError`] for the whole run (only a few variants are fatal).

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by a [`crate::history::RevisionHistoryProvider`].
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The underlying command ran but reported failure.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The requested object (revision, path at revision, history) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Provider output could not be interpreted.
    #[error("could not parse provider output: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for provider calls.
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Recoverable failures scoped to one file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no line attribution for {path}: {source}")]
    Attribution {
        path: String,
        #[source]
        source: HistoryError,
    },

    /// Attribution covers more lines than the file has.
    #[error("attribution covers {attributed} lines but {path} has only {actual}")]
    LengthMismatch {
        path: String,
        attributed: usize,
        actual: usize,
    },

    /// Every line was blank or a comment.
    #[error("no code lines in {0} (all comments or blanks)")]
    NoCodeLines(String),

    /// Analysis of this file panicked; the worker survived.
    #[error("analysis of {0} panicked")]
    Panicked(String),
}

impl FileError {
    /// Path of the file the error belongs to.
    pub fn path(&self) -> &str {
        match self {
            FileError::Read { path, .. }
            | FileError::Attribution { path, .. }
            | FileError::LengthMismatch { path, .. } => path,
            FileError::NoCodeLines(path) | FileError::Panicked(path) => path,
        }
    }
}

/// Run-level errors.
#[derive(Debug, Error)]
pub enum TheseusError {
    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("no files to analyze after filtering")]
    NoFiles,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("history provider error: {0}")]
    History(#[from] HistoryError),

    #[error("worker task failed: {0}")]
    Join(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TheseusError {
    /// Whether this error must abort the run rather than be reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TheseusError::NotARepository(_) | TheseusError::NoFiles)
    }
}

/// Result type for run-level operations.
pub type Result<T> = std::result::Result<T, TheseusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_displays_counts_and_path() {
        let err = FileError::LengthMismatch {
            path: "src/lib.rs".to_string(),
            attributed: 12,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("src/lib.rs"));
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
        assert_eq!(err.path(), "src/lib.rs");
    }

    #[test]
    fn test_command_failed_displays_command() {
        let err = HistoryError::CommandFailed {
            command: "git blame".to_string(),
            stderr: "no such path".to_string(),
        };
        assert!(err.to_string().contains("git blame"));
        assert!(err.to_string().contains("no such path"));
    }

    #[test]
    fn test_only_repository_and_emptiness_are_fatal() {
        assert!(TheseusError::NotARepository(PathBuf::from("/tmp/x")).is_fatal());
        assert!(TheseusError::NoFiles.is_fatal());
        assert!(!TheseusError::InvalidConfig("workers".into()).is_fatal());
        assert!(!TheseusError::History(HistoryError::NotFound("x".into())).is_fatal());
    }
}
