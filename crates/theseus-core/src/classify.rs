//! Decides which paths and lines are worth tracing.

use std::path::Path;

/// Path and line filter applied before any history is consulted.
pub trait LineClassifier: Send + Sync {
    /// Lines that carry no code (blank, comment-only) are skipped.
    fn is_skippable_line(&self, text: &str, path: &str) -> bool;

    /// Binary, vendored, generated or build-output files are skipped.
    fn is_skippable_path(&self, path: &str) -> bool;
}

const SKIP_DIRECTORIES: &[&str] = &[
    "vendor",
    "node_modules",
    "dist",
    "build",
    "target",
    "__pycache__",
    ".git",
    ".svn",
    ".hg",
    "coverage",
    "tmp",
    "temp",
];

const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp", "tiff",
    // executables and objects
    "exe", "dll", "so", "dylib", "a", "o", "obj", "lib",
    // archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar",
    // media
    "mp3", "mp4", "avi", "mov", "wmv", "flv", "wav", "ogg",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // other
    "db", "sqlite", "dat", "bin", "pyc", "pyo", "class",
];

const GENERATED_PATTERNS: &[&str] = &[
    ".generated.",
    ".gen.",
    ".pb.go",
    ".pb.gw.go",
    "_generated.",
    "_gen.",
    ".g.go",
    "generated_",
    "gen_",
    "wire_gen.go",
    "mock_",
    "_mock.go",
];

/// Extension-driven classifier covering common languages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl LineClassifier for DefaultClassifier {
    fn is_skippable_line(&self, text: &str, path: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return true;
        }
        comment_prefixes(&extension(path))
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
    }

    fn is_skippable_path(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");

        if normalized
            .split('/')
            .any(|part| SKIP_DIRECTORIES.contains(&part))
        {
            return true;
        }

        if BINARY_EXTENSIONS.contains(&extension(&normalized).as_str()) {
            return true;
        }

        let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
        GENERATED_PATTERNS
            .iter()
            .any(|pattern| file_name.contains(pattern))
    }
}

fn extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Comment-line prefixes for a lowercase file extension.
fn comment_prefixes(ext: &str) -> &'static [&'static str] {
    match ext {
        "go" | "c" | "cpp" | "h" | "hpp" | "java" | "js" | "ts" | "jsx" | "tsx" | "cs"
        | "swift" | "kt" | "scala" | "rs" | "scss" | "less" => &["//", "/*"],
        "php" => &["//", "/*", "#"],
        "py" | "rb" | "sh" | "bash" | "zsh" | "fish" | "pl" | "pm" | "r" | "yaml" | "yml"
        | "toml" | "conf" | "ex" | "exs" => &["#"],
        "ini" => &["#", ";"],
        "sql" => &["--", "/*"],
        "lua" | "hs" | "elm" => &["--"],
        "el" | "lisp" | "clj" => &[";"],
        "html" | "xml" | "svg" => &["<!--"],
        "css" => &["/*"],
        "sass" => &["//"],
        "vim" => &["\""],
        "tex" | "m" | "erl" => &["%"],
        "ml" => &["(*"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_skipped_for_any_extension() {
        let c = DefaultClassifier::new();
        assert!(c.is_skippable_line("   \t", "main.rs"));
        assert!(c.is_skippable_line("", "README"));
    }

    #[test]
    fn test_comment_lines_follow_extension() {
        let c = DefaultClassifier::new();
        assert!(c.is_skippable_line("    // note", "src/lib.rs"));
        assert!(c.is_skippable_line("/* block */", "a.go"));
        assert!(c.is_skippable_line("# comment", "tool.py"));
        assert!(c.is_skippable_line("-- query", "schema.sql"));
        assert!(c.is_skippable_line("; key", "settings.ini"));
        assert!(!c.is_skippable_line("let x = 1; // trailing", "src/lib.rs"));
        assert!(!c.is_skippable_line("# heading", "notes.md"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let c = DefaultClassifier::new();
        assert!(c.is_skippable_line("// x", "Main.JAVA"));
    }

    #[test]
    fn test_vendor_and_build_dirs_skipped() {
        let c = DefaultClassifier::new();
        assert!(c.is_skippable_path("vendor/github.com/x/y.go"));
        assert!(c.is_skippable_path("web/node_modules/react/index.js"));
        assert!(c.is_skippable_path("target/debug/build.rs"));
        assert!(!c.is_skippable_path("src/vendored.rs"));
    }

    #[test]
    fn test_binary_and_generated_files_skipped() {
        let c = DefaultClassifier::new();
        assert!(c.is_skippable_path("assets/logo.PNG"));
        assert!(c.is_skippable_path("api/service.pb.go"));
        assert!(c.is_skippable_path("internal/wire_gen.go"));
        assert!(c.is_skippable_path("store/mock_store.go"));
        assert!(!c.is_skippable_path("src/main.rs"));
        assert!(!c.is_skippable_path("Makefile"));
    }
}
