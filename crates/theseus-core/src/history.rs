//! Revision-history provider seam.
//!
//! The analysis core never talks to git directly. It goes through
//! [`RevisionHistoryProvider`], which is implemented by
//! [`crate::git::GitHistoryProvider`] for real repositories and by
//! [`crate::fakes::MemoryHistoryProvider`] in tests.
//!
//! Every list returned by a provider is ordered newest first, so the oldest
//! known revision is the last element.

use async_trait::async_trait;

use crate::error::HistoryResult;
use crate::model::{ChurnStats, LineAttribution, Revision};

/// Injectable source of per-line attribution, file history and churn.
///
/// Implementations are shared across all scheduler workers through an
/// `Arc`, and must tolerate concurrent calls without shared mutable state.
#[async_trait]
pub trait RevisionHistoryProvider: Send + Sync {
    /// Whether the provider is backed by a valid repository.
    async fn is_repository(&self) -> bool;

    /// Paths (relative, `/`-separated) of every tracked file.
    async fn tracked_files(&self) -> HistoryResult<Vec<String>>;

    /// Current working-tree content of `path`.
    async fn current_content(&self, path: &str) -> std::io::Result<String>;

    /// The last-modifying revision of each current line, in line order.
    async fn line_attribution(&self, path: &str) -> HistoryResult<Vec<LineAttribution>>;

    /// Revisions that touched `path`, newest first, following renames when asked.
    async fn revision_list(&self, path: &str, follow_renames: bool)
        -> HistoryResult<Vec<Revision>>;

    /// Full text of `path` as of `revision`.
    async fn file_at(&self, revision: &str, path: &str) -> HistoryResult<String>;

    /// Lines added and removed by `revision`.
    async fn churn_stats(&self, revision: &str) -> HistoryResult<ChurnStats>;

    /// Every revision in the repository, newest first.
    async fn all_revisions(&self) -> HistoryResult<Vec<Revision>>;
}
