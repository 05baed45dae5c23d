//! Workspace exclusion rules shared by the crawler and the filesystem watcher.

use std::borrow::Cow;
use std::path::Path;
use std::path::PathBuf;

/// A single exclusion rule: either a glob pattern or a concrete directory/file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion<'a> {
    Pattern(Cow<'a, str>),
    Path(Cow<'a, Path>),
}

/// The directory names skipped everywhere during a crawl, regardless of configuration.
///
/// The source project carried two divergent lists across revisions (one adding
/// `.gitlab`, `.run`, `.idea`, `.vscode`, one without); we take the superset.
pub const SKIPPED_DIRECTORIES: &[&str] = &[
    "vendor",
    "node_modules",
    "var",
    "cache",
    ".git",
    ".github",
    ".gitlab",
    ".run",
    ".idea",
    ".vscode",
    "tests",
    "public",
    "bin",
];

/// Returns `true` if `name` is one of the fixed skip-directories.
pub fn is_skipped_directory_name(name: &str) -> bool {
    SKIPPED_DIRECTORIES.contains(&name)
}

/// Returns `true` if any ancestor of `path` is a skipped directory, or the file itself
/// ends in `.phar.php` (spec: "Skip files ending `.phar.php`").
pub fn is_excluded_by_fixed_rules(path: &Path) -> bool {
    if path.to_string_lossy().ends_with(".phar.php") {
        return true;
    }

    path.ancestors().filter_map(|ancestor| ancestor.file_name()).any(|name| is_skipped_directory_name(&name.to_string_lossy()))
}

pub(crate) fn canonicalize_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
