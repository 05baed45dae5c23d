//! The file scanner: crawls a workspace root, decides which files changed
//! since the last scan, and fans changed files out to every indexer that
//! claims their extension.
//!
//! The crawl and parse step run on a bounded rayon pool, the same
//! `map_init`-per-worker shape the teacher's orchestrator pipelines use, so a
//! misbehaving parser on one thread cannot starve the others and the pool
//! never oversubscribes a small container.

use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::DatabaseError;
use crate::exclusion::is_excluded_by_fixed_rules;
use crate::hash::FileHash;
use crate::hash_store::FileHashStore;
use crate::indexer::Registry;
use crate::tree::AnyTree;

/// How long a single file is given to parse and ingest before the scanner
/// gives up on it and moves on, logging a warning rather than blocking the
/// whole crawl on one pathological file.
pub const PER_FILE_DEADLINE: Duration = Duration::from_secs(1);

/// A function able to parse a file's bytes into a tree the registry's
/// indexers can ingest. Supplied by the orchestrator, which owns the real
/// `shopware-lsp-syntax::ParseService`; the scanner itself has no idea what a
/// parser is, only that it produces `dyn AnyTree` or declines to.
pub type ParseFn = dyn Fn(&Path, &[u8]) -> Option<(String, Box<dyn AnyTree>)> + Send + Sync;

/// Outcome of a single full or incremental scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    pub discovered: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
}

pub struct FileScanner {
    worker_count: usize,
}

impl FileScanner {
    /// Builds a scanner sized `min(16, logical_cpus + 2)`, the same bound the
    /// spec's scanner component carries over from the source crawler.
    pub fn new() -> Self {
        let worker_count = (num_cpus::get() + 2).min(16).max(1);
        Self { worker_count }
    }

    /// Builds a scanner with an explicit worker count, for callers that
    /// honor a configured thread count instead of the `min(16, cpus + 2)`
    /// default.
    pub fn with_worker_count(worker_count: usize) -> Self {
        Self { worker_count: worker_count.max(1) }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Discovers every file under `root` not excluded by the fixed skip
    /// rules or `extra_excludes`, whose extension is claimed by at least one
    /// registered indexer.
    pub fn discover(&self, root: &Path, registry: &Registry, extra_excludes: &[String]) -> Result<Vec<PathBuf>, DatabaseError> {
        let claimed = registry.claimed_extensions();
        let glob_set = build_glob_set(extra_excludes)?;

        let mut paths = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_entry(|entry| !should_skip_dir(entry, &glob_set)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_excluded_by_fixed_rules(path) || glob_set.is_match(path) {
                continue;
            }

            let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
                continue;
            };

            if claimed.contains(extension) {
                paths.push(path.to_path_buf());
            }
        }

        Ok(paths)
    }

    /// Runs a full crawl of `root`: discovers candidate files, hashes each
    /// one, skips files whose hash is unchanged since the last scan, parses
    /// and ingests the rest, and forgets any previously-indexed file that no
    /// longer exists on disk.
    pub fn scan_all(
        &self,
        root: &Path,
        registry: &Registry,
        hash_store: &FileHashStore,
        parse: &ParseFn,
        extra_excludes: &[String],
    ) -> Result<ScanStats, DatabaseError> {
        let discovered = self.discover(root, registry, extra_excludes)?;
        let discovered_set: std::collections::HashSet<&PathBuf> = discovered.iter().collect();

        let stale: Vec<PathBuf> = hash_store
            .known_paths()
            .into_iter()
            .filter(|path| !discovered_set.contains(path))
            .collect();

        if !stale.is_empty() {
            registry.forget_files(&stale)?;
            hash_store.delete_paths(&stale)?;
        }

        let stats = self.scan_files(&discovered, root, registry, hash_store, parse)?;

        Ok(ScanStats { removed: stale.len(), ..stats })
    }

    /// Rescans exactly the given files (used by the watcher's debounced
    /// change batches and by `shopware/workspace/indexFiles`).
    pub fn scan_files(
        &self,
        paths: &[PathBuf],
        _root: &Path,
        registry: &Registry,
        hash_store: &FileHashStore,
        parse: &ParseFn,
    ) -> Result<ScanStats, DatabaseError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.worker_count).build().map_err(|error| {
            DatabaseError::CorruptStore { path: PathBuf::new(), reason: format!("failed to build worker pool: {error}") }
        })?;

        let changed = AtomicUsize::new(0);
        let unchanged = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        pool.install(|| {
            paths.par_iter().for_each(|path| {
                let started = Instant::now();

                let bytes = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "failed to read file during scan");
                        failed.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                };

                let hash = FileHash::of(&bytes);
                if hash_store.is_unchanged(path, hash) {
                    unchanged.fetch_add(1, Ordering::Relaxed);
                    return;
                }

                let Ok(source) = String::from_utf8(bytes) else {
                    tracing::warn!(path = %path.display(), "skipping non-UTF-8 file");
                    failed.fetch_add(1, Ordering::Relaxed);
                    return;
                };

                let Some((source, tree)) = parse(path, source.as_bytes()) else {
                    tracing::warn!(path = %path.display(), "parser declined file");
                    failed.fetch_add(1, Ordering::Relaxed);
                    return;
                };

                for indexer in registry.for_extension(path.extension().and_then(|e| e.to_str()).unwrap_or_default()) {
                    if let Err(error) = indexer.ingest(path, &source, tree.as_ref()) {
                        tracing::warn!(path = %path.display(), indexer = indexer.id(), %error, "indexer failed to ingest file");
                    }
                }

                if let Err(error) = hash_store.put_batch(&[(path.clone(), hash)]) {
                    tracing::warn!(path = %path.display(), %error, "failed to record file hash");
                }

                if started.elapsed() > PER_FILE_DEADLINE {
                    tracing::warn!(path = %path.display(), elapsed = ?started.elapsed(), "file took longer than the per-file deadline");
                }

                changed.fetch_add(1, Ordering::Relaxed);
            });
        });

        Ok(ScanStats {
            discovered: paths.len(),
            changed: changed.load(Ordering::Relaxed),
            unchanged: unchanged.load(Ordering::Relaxed),
            removed: 0,
            failed: failed.load(Ordering::Relaxed),
        })
    }

    /// Forgets a batch of deleted paths from both the registry and the hash store.
    pub fn remove_files(&self, paths: &[PathBuf], registry: &Registry, hash_store: &FileHashStore) -> Result<(), DatabaseError> {
        registry.forget_files(paths)?;
        hash_store.delete_paths(paths)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, DatabaseError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn should_skip_dir(entry: &walkdir::DirEntry, glob_set: &GlobSet) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if crate::exclusion::is_skipped_directory_name(&name) {
        return true;
    }

    glob_set.is_match(entry.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;

    struct RecordingIndexer {
        seen: std::sync::Mutex<Vec<PathBuf>>,
    }

    impl Indexer for RecordingIndexer {
        fn id(&self) -> &'static str {
            "recording"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["txt"]
        }

        fn ingest(&self, path: &Path, _source: &str, _tree: &dyn AnyTree) -> Result<(), DatabaseError> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
            self.seen.lock().unwrap().retain(|p| !paths.contains(p));
            Ok(())
        }

        fn clear(&self) -> Result<(), DatabaseError> {
            self.seen.lock().unwrap().clear();
            Ok(())
        }

        fn close(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    struct NullTree;
    impl AnyTree for NullTree {
        fn language(&self) -> &'static str {
            "txt"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn second_scan_of_unchanged_files_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let mut registry = Registry::new();
        registry.register(Box::new(RecordingIndexer { seen: std::sync::Mutex::new(Vec::new()) }));

        let hash_store = FileHashStore::open(&dir.path().join("file_scanner.db")).unwrap();
        let scanner = FileScanner::new();
        let parse: Box<ParseFn> = Box::new(|_path, bytes| Some((String::from_utf8_lossy(bytes).into_owned(), Box::new(NullTree) as Box<dyn AnyTree>)));

        let first = scanner.scan_all(dir.path(), &registry, &hash_store, &parse, &[]).unwrap();
        assert_eq!(first.changed, 1);

        let second = scanner.scan_all(dir.path(), &registry, &hash_store, &parse, &[]).unwrap();
        assert_eq!(second.changed, 0);
        assert_eq!(second.unchanged, 1);
    }

    #[test]
    fn vendor_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vendor/pkg")).unwrap();
        std::fs::write(dir.path().join("vendor/pkg/a.txt"), "hello").unwrap();

        let mut registry = Registry::new();
        registry.register(Box::new(RecordingIndexer { seen: std::sync::Mutex::new(Vec::new()) }));

        let discovered = FileScanner::new().discover(dir.path(), &registry, &[]).unwrap();
        assert!(discovered.is_empty());
    }
}
