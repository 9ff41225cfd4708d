//! Theseus - how much of this codebase is still original?
//!
//! The `theseus` command traces every current line of a git repository back
//! to the oldest revision of its file and reports the share of lines that
//! still resemble their origin, per file and overall, with an estimated
//! timeline over sampled history.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::Level;

use theseus_core::{
    analyze_repository, AnalysisConfig, AnalysisReport, CodebaseResult, DefaultClassifier,
    FileError, GitHistoryProvider, Interpretation,
};

const BAR_WIDTH: usize = 40;
const TIMELINE_BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "theseus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Measure how much of a git repository is still original code", long_about = None)]
struct Cli {
    /// Repository to analyze
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Number of concurrent file workers (default: available parallelism)
    #[arg(short, long, env = "THESEUS_WORKERS")]
    workers: Option<usize>,

    /// Sample every Nth revision for the timeline
    #[arg(short, long, env = "THESEUS_SAMPLE")]
    sample: Option<usize>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Keep per-line provenance in the JSON report
    #[arg(long, requires = "json")]
    with_lines: bool,

    /// Number of files in each ranked list
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    original_pct: f64,
    interpretation: Interpretation,
    result: &'a CodebaseResult,
    skipped: Vec<SkippedFile<'a>>,
}

#[derive(Serialize)]
struct SkippedFile<'a> {
    path: &'a str,
    reason: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    theseus_core::init_tracing(cli.log_json, level);

    let mut config = AnalysisConfig::from_env();
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    if let Some(sample) = cli.sample {
        config = config.with_sample_stride(sample);
    }

    let provider = Arc::new(GitHistoryProvider::new(cli.path.clone()));
    let classifier = Arc::new(DefaultClassifier::new());

    let mut report = analyze_repository(&cli.path, provider, classifier, &config)
        .await
        .with_context(|| format!("Failed to analyze {}", cli.path.display()))?;

    if cli.json {
        if !cli.with_lines {
            strip_lines(&mut report.result);
        }
        println!("{}", render_json(&report)?);
    } else {
        println!("{}", render_text(&report, cli.top));
    }

    Ok(())
}

fn strip_lines(result: &mut CodebaseResult) {
    for file in &mut result.files {
        file.lines.clear();
    }
}

fn render_json(report: &AnalysisReport) -> Result<String> {
    let doc = JsonReport {
        version: theseus_core::VERSION,
        original_pct: report.result.original_pct(),
        interpretation: report.result.interpretation(),
        result: &report.result,
        skipped: report.skipped.iter().map(skipped_file).collect(),
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize report")
}

fn skipped_file(error: &FileError) -> SkippedFile<'_> {
    SkippedFile {
        path: error.path(),
        reason: error.to_string(),
    }
}

/// Horizontal bar, `pct` clamped to 0..=100.
fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_text(report: &AnalysisReport, top: usize) -> String {
    let result = &report.result;
    let pct = result.original_pct();

    let mut out = String::new();
    out.push_str("Ship of Theseus Analysis\n");
    out.push_str("========================\n");
    out.push_str(&format!("files analyzed:      {}\n", result.files.len()));
    out.push_str(&format!("files skipped:       {}\n", report.skipped.len()));
    out.push_str(&format!("total lines:         {}\n", result.total_lines));
    out.push_str(&format!("original lines:      {}\n", result.original_lines));
    out.push_str(&format!(
        "average similarity:  {:.3}\n",
        result.average_similarity
    ));
    out.push_str(&format!("\nOriginal: {:>5.1}%  {}\n", pct, bar(pct, BAR_WIDTH)));
    out.push_str(&format!("{}\n", result.interpretation().describe()));

    out.push_str("\nTimeline (estimated):\n");
    if result.snapshots.is_empty() {
        out.push_str("  unavailable\n");
    }
    for snapshot in &result.snapshots {
        out.push_str(&format!(
            "  {}  {}  {:>5.1}%  {}\n",
            snapshot.timestamp.format("%Y-%m-%d"),
            theseus_core::model::short_id(&snapshot.revision_id),
            snapshot.estimated_original_pct,
            bar(snapshot.estimated_original_pct, TIMELINE_BAR_WIDTH)
        ));
    }

    if top > 0 && !result.files.is_empty() {
        out.push_str("\nMost transformed:\n");
        for file in result.most_transformed(top) {
            out.push_str(&format!(
                "  {:>5.1}%  {} ({} lines)\n",
                file.original_pct(),
                file.path,
                file.total_lines
            ));
        }
        out.push_str("\nMost stable:\n");
        for file in result.most_stable(top) {
            out.push_str(&format!(
                "  {:>5.1}%  {} ({} lines)\n",
                file.original_pct(),
                file.path,
                file.total_lines
            ));
        }
    }

    out.trim_end().to_string()
}
