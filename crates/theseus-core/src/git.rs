//! Git CLI adapter for [`RevisionHistoryProvider`].
//!
//! Shells out to `git` for every call. `git blame` and `git log --follow`
//! are considerably faster through the CLI than through a library binding,
//! and each invocation is an independent process, so concurrent workers
//! share nothing but the repository path.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{HistoryError, HistoryResult};
use crate::history::RevisionHistoryProvider;
use crate::model::{ChurnStats, LineAttribution, Revision};

static BLAME_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-f]{40,64}) (\d+) (\d+)(?: \d+)?$").expect("valid blame header regex")
});
static INSERTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?\(\+\)").expect("valid insertions regex"));
static DELETIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?\(-\)").expect("valid deletions regex"));

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// [`RevisionHistoryProvider`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitHistoryProvider {
    repo: PathBuf,
}

impl GitHistoryProvider {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    async fn run_git(&self, args: &[&str]) -> HistoryResult<String> {
        trace!(args = ?args, "running git");
        let output = tokio::process::Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .await?;

        if !output.status.success() {
            return Err(HistoryError::CommandFailed {
                command: format!("git {}", args.first().copied().unwrap_or_default()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl RevisionHistoryProvider for GitHistoryProvider {
    async fn is_repository(&self) -> bool {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || repo.is_dir() && is_git_repo(&repo))
            .await
            .unwrap_or(false)
    }

    async fn tracked_files(&self) -> HistoryResult<Vec<String>> {
        let out = self.run_git(&["ls-files", "-z"]).await?;
        Ok(out
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn current_content(&self, path: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(self.repo.join(path)).await
    }

    async fn line_attribution(&self, path: &str) -> HistoryResult<Vec<LineAttribution>> {
        let out = self
            .run_git(&["blame", "--line-porcelain", "--", path])
            .await?;
        parse_blame_porcelain(&out)
    }

    async fn revision_list(
        &self,
        path: &str,
        follow_renames: bool,
    ) -> HistoryResult<Vec<Revision>> {
        let mut args = vec!["log"];
        if follow_renames {
            args.push("--follow");
        }
        args.extend(["--pretty=format:%H|%ct", "--", path]);

        let revisions = parse_revision_log(&self.run_git(&args).await?);
        if revisions.is_empty() {
            return Err(HistoryError::NotFound(format!("no history for {path}")));
        }
        Ok(revisions)
    }

    /// `path` is relative to the provider's directory, which may be a
    /// subdirectory of the work tree.
    async fn file_at(&self, revision: &str, path: &str) -> HistoryResult<String> {
        let object = revision_object(revision, path);
        self.run_git(&["show", &object]).await.map_err(|e| match e {
            HistoryError::CommandFailed { .. } => {
                debug!(revision = %revision, path = %path, "path absent at revision");
                HistoryError::NotFound(object)
            }
            other => other,
        })
    }

    async fn churn_stats(&self, revision: &str) -> HistoryResult<ChurnStats> {
        let out = self
            .run_git(&["show", "--stat", "--pretty=format:", revision])
            .await?;
        Ok(parse_churn_stats(&out))
    }

    async fn all_revisions(&self) -> HistoryResult<Vec<Revision>> {
        let out = self.run_git(&["log", "--all", "--pretty=format:%H|%ct"]).await?;
        Ok(parse_revision_log(&out))
    }
}

/// Parse `git blame --line-porcelain` output into one attribution per line.
///
/// Each line block starts with `<hash> <orig-line> <final-line> [<count>]`,
/// carries a `committer-time` header, and ends with the tab-prefixed content.
pub fn parse_blame_porcelain(output: &str) -> HistoryResult<Vec<LineAttribution>> {
    let mut result = Vec::new();
    let mut revision: Option<String> = None;
    let mut line_number = 0usize;
    let mut timestamp = DateTime::<Utc>::default();

    for line in output.lines() {
        if line.starts_with('\t') {
            match &revision {
                Some(rev) if line_number > 0 => result.push(LineAttribution {
                    revision: rev.clone(),
                    line_number,
                    timestamp,
                }),
                _ => {
                    return Err(HistoryError::Parse(
                        "blame content line without a header".to_string(),
                    ))
                }
            }
            continue;
        }

        if let Some(caps) = BLAME_HEADER.captures(line) {
            revision = Some(caps[1].to_string());
            line_number = caps[3]
                .parse()
                .map_err(|e| HistoryError::Parse(format!("blame line number: {e}")))?;
            continue;
        }

        if let Some(ts) = line.strip_prefix("committer-time ") {
            timestamp = parse_unix_timestamp(ts).unwrap_or_default();
        }
    }

    Ok(result)
}

/// Parse `%H|%ct` log lines; malformed lines are skipped.
pub fn parse_revision_log(output: &str) -> Vec<Revision> {
    output
        .lines()
        .filter_map(|line| {
            let (id, ts) = line.trim().split_once('|')?;
            let timestamp = parse_unix_timestamp(ts)?;
            (!id.is_empty()).then(|| Revision::new(id, timestamp))
        })
        .collect()
}

/// Parse the `N insertions(+), M deletions(-)` summary of `git show --stat`.
///
/// Either count may be absent (pure additions or pure deletions).
pub fn parse_churn_stats(output: &str) -> ChurnStats {
    let mut stats = ChurnStats::default();

    for line in output.lines().filter(|l| l.contains("changed")) {
        if let Some(caps) = INSERTIONS.captures(line) {
            stats.additions = caps[1].parse().unwrap_or(0);
        }
        if let Some(caps) = DELETIONS.captures(line) {
            stats.deletions = caps[1].parse().unwrap_or(0);
        }
    }

    stats
}

/// `<rev>:./<path>`, resolved relative to the working directory.
pub fn revision_object(revision: &str, path: &str) -> String {
    format!("{revision}:./{}", path.trim_start_matches("./"))
}

fn parse_unix_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = raw.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0)
}
