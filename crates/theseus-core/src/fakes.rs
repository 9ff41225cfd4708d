//! In-memory [`RevisionHistoryProvider`] (testing and embedding).
//!
//! Built up front with `with_*` calls and immutable afterwards, so it can be
//! shared across workers without locking. Anything not registered is
//! reported as not found, which exercises the same degradation paths as a
//! real repository with missing history.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::{HistoryError, HistoryResult};
use crate::history::RevisionHistoryProvider;
use crate::model::{ChurnStats, LineAttribution, Revision};

#[derive(Debug, Clone)]
pub struct MemoryHistoryProvider {
    is_repository: bool,
    current: BTreeMap<String, String>,
    attribution: HashMap<String, Vec<LineAttribution>>,
    revision_lists: HashMap<String, Vec<Revision>>,
    contents: HashMap<(String, String), String>,
    churn: HashMap<String, ChurnStats>,
    revisions: Vec<Revision>,
}

impl Default for MemoryHistoryProvider {
    fn default() -> Self {
        Self {
            is_repository: true,
            current: BTreeMap::new(),
            attribution: HashMap::new(),
            revision_lists: HashMap::new(),
            contents: HashMap::new(),
            churn: HashMap::new(),
            revisions: Vec::new(),
        }
    }
}

impl MemoryHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that reports it is not backed by a repository.
    pub fn not_a_repository() -> Self {
        Self {
            is_repository: false,
            ..Self::default()
        }
    }

    /// Register current content with every line attributed to `last`.
    ///
    /// Attribution covers `content.lines()`, as `git blame` would.
    pub fn with_file(mut self, path: &str, content: &str, last: &Revision) -> Self {
        let attribution = (1..=content.lines().count())
            .map(|line_number| LineAttribution {
                revision: last.id.clone(),
                line_number,
                timestamp: last.timestamp,
            })
            .collect();
        self.current.insert(path.to_string(), content.to_string());
        self.attribution.insert(path.to_string(), attribution);
        self
    }

    /// Register current content without any attribution.
    pub fn with_unattributed_file(mut self, path: &str, content: &str) -> Self {
        self.current.insert(path.to_string(), content.to_string());
        self
    }

    /// Override the attribution for `path`.
    pub fn with_attribution(mut self, path: &str, attribution: Vec<LineAttribution>) -> Self {
        self.attribution.insert(path.to_string(), attribution);
        self
    }

    /// Register the content of `path` at `revision`.
    pub fn with_content_at(mut self, revision: &Revision, path: &str, text: &str) -> Self {
        self.contents
            .insert((revision.id.clone(), path.to_string()), text.to_string());
        self
    }

    /// Register the revisions of `path`, newest first.
    pub fn with_revision_list(mut self, path: &str, revisions: Vec<Revision>) -> Self {
        self.revision_lists.insert(path.to_string(), revisions);
        self
    }

    /// Register a whole file history, oldest version first.
    ///
    /// Sets content at every revision, the newest-first revision list, and
    /// the current content (attributed to the newest revision).
    pub fn with_file_history(mut self, path: &str, versions: &[(Revision, &str)]) -> Self {
        for (revision, text) in versions {
            self = self.with_content_at(revision, path, text);
        }
        let newest_first = versions.iter().rev().map(|(r, _)| r.clone()).collect();
        self = self.with_revision_list(path, newest_first);
        match versions.last() {
            Some((last, text)) => self.with_file(path, text, last),
            None => self,
        }
    }

    /// Register the repository-wide revision list, newest first.
    pub fn with_revisions(mut self, revisions: Vec<Revision>) -> Self {
        self.revisions = revisions;
        self
    }

    pub fn with_churn(mut self, revision: &str, additions: u64, deletions: u64) -> Self {
        self.churn.insert(
            revision.to_string(),
            ChurnStats {
                additions,
                deletions,
            },
        );
        self
    }
}

#[async_trait]
impl RevisionHistoryProvider for MemoryHistoryProvider {
    async fn is_repository(&self) -> bool {
        self.is_repository
    }

    async fn tracked_files(&self) -> HistoryResult<Vec<String>> {
        Ok(self.current.keys().cloned().collect())
    }

    async fn current_content(&self, path: &str) -> std::io::Result<String> {
        self.current.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} not found"))
        })
    }

    async fn line_attribution(&self, path: &str) -> HistoryResult<Vec<LineAttribution>> {
        self.attribution
            .get(path)
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(format!("attribution for {path}")))
    }

    async fn revision_list(
        &self,
        path: &str,
        _follow_renames: bool,
    ) -> HistoryResult<Vec<Revision>> {
        self.revision_lists
            .get(path)
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(format!("no history for {path}")))
    }

    async fn file_at(&self, revision: &str, path: &str) -> HistoryResult<String> {
        self.contents
            .get(&(revision.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(format!("{revision}:{path}")))
    }

    async fn churn_stats(&self, revision: &str) -> HistoryResult<ChurnStats> {
        self.churn
            .get(revision)
            .copied()
            .ok_or_else(|| HistoryError::NotFound(format!("stats for {revision}")))
    }

    async fn all_revisions(&self) -> HistoryResult<Vec<Revision>> {
        Ok(self.revisions.clone())
    }
}
