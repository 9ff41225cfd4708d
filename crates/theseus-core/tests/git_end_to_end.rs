//! End-to-end analysis of a throwaway git repository.
//!
//! Skipped (with a note on stderr) when no `git` executable is available.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use theseus_core::{
    analyze_repository, AnalysisConfig, DefaultClassifier, GitHistoryProvider,
    RevisionHistoryProvider, TheseusError,
};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str], date: &str) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit(dir: &Path, files: &[(&str, &str)], message: &str, date: &str) {
    for (path, content) in files {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }
    git(dir, &["add", "-A"], date);
    git(dir, &["commit", "-q", "-m", message], date);
}

fn init_repo(dir: &Path) {
    let date = "2021-01-01T00:00:00+00:00";
    git(dir, &["init", "-q"], date);
    git(dir, &["config", "user.name", "Theseus Test"], date);
    git(dir, &["config", "user.email", "theseus@example.com"], date);
    git(dir, &["config", "commit.gpgsign", "false"], date);
}

#[tokio::test]
async fn e2e_git_repository_is_traced_to_first_commit() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let repo = tmp.path();
    init_repo(repo);

    commit(
        repo,
        &[
            (
                "src/main.rs",
                "fn main() {\n    let greeting = \"hello\";\n    println!(\"{greeting}\");\n}\n",
            ),
            ("vendor/dep.rs", "pub fn dep() {}\n"),
        ],
        "initial",
        "2021-01-01T00:00:00+00:00",
    );
    commit(
        repo,
        &[(
            "src/main.rs",
            "// entry point\nfn main() {\n    let greeting = \"hello\";\n    std::process::exit(0xA5);\n}\n",
        )],
        "rewrite output",
        "2021-06-01T00:00:00+00:00",
    );

    let provider = Arc::new(GitHistoryProvider::new(repo));
    let all = provider.all_revisions().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].timestamp > all[1].timestamp);

    let report = analyze_repository(
        repo,
        provider,
        Arc::new(DefaultClassifier::new()),
        &AnalysisConfig::default().with_workers(2),
    )
    .await
    .unwrap();

    let result = report.result;
    assert!(report.skipped.is_empty());
    assert_eq!(result.files.len(), 1, "vendor/ must be skipped");

    let main = &result.files[0];
    assert_eq!(main.path, "src/main.rs");
    // the comment line is skipped
    assert_eq!(main.total_lines, 4);
    assert!(main.original_lines >= 3);

    let first_line = &main.lines[0];
    assert_eq!(first_line.current_text, "fn main() {");
    assert_eq!(first_line.current_position, 2);
    assert_eq!(first_line.origin_position, 1);
    assert_eq!(first_line.origin_revision, all[1].id);
    assert_eq!(first_line.similarity, 1.0);

    let anchor = result.snapshots.last().unwrap();
    assert_eq!(anchor.revision_id, all[0].id);
    assert_eq!(anchor.estimated_original_pct, result.original_pct());
}

#[tokio::test]
async fn e2e_subdirectory_traces_same_history_as_root() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let repo = tmp.path();
    init_repo(repo);
    commit(
        repo,
        &[("src/lib.rs", "fn a() {}\nfoo\n")],
        "initial",
        "2021-01-01T00:00:00+00:00",
    );
    commit(
        repo,
        &[("src/lib.rs", "fn a() {}\nbar\n")],
        "rewrite",
        "2021-02-01T00:00:00+00:00",
    );

    let mut results = Vec::new();
    for dir in [repo.to_path_buf(), repo.join("src")] {
        let report = analyze_repository(
            &dir,
            Arc::new(GitHistoryProvider::new(&dir)),
            Arc::new(DefaultClassifier::new()),
            &AnalysisConfig::default().with_workers(1),
        )
        .await
        .unwrap();
        assert!(report.skipped.is_empty());
        results.push(report.result);
    }

    for result in &results {
        assert_eq!(result.total_lines, 2);
        assert_eq!(result.original_lines, 1);
        assert_eq!(result.original_pct(), 50.0);
    }
    let from_subdir = &results[1].files[0];
    assert_eq!(from_subdir.path, "lib.rs");
    assert_eq!(from_subdir.lines[1].origin_text, "");
    assert_eq!(from_subdir.lines[1].similarity, 0.0);
}

#[tokio::test]
async fn e2e_plain_directory_is_not_a_repository() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let err = analyze_repository(
        tmp.path(),
        Arc::new(GitHistoryProvider::new(tmp.path())),
        Arc::new(DefaultClassifier::new()),
        &AnalysisConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TheseusError::NotARepository(_)));
}
