//! The orchestrator: owns the scanner, the file hash store, the parse
//! service and the domain indexers, and drives the full lifecycle a
//! language server needs around them — initial crawl, targeted rescans,
//! forced reindexing, and the watcher loop that keeps the cache live while
//! the editor is open.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use shopware_lsp_database::DatabaseWatcher;
use shopware_lsp_database::FileHashStore;
use shopware_lsp_database::FileScanner;
use shopware_lsp_database::ParseFn;
use shopware_lsp_database::ScanStats;
use shopware_lsp_index::IndexerSet;
use shopware_lsp_syntax::ParseService;

use crate::cache_version::CacheVersionManager;
use crate::error::OrchestratorError;
use crate::notifier::IndexingNotifier;

/// Directories, relative to the workspace root, that the scanner should
/// skip in addition to its own fixed rules (the spec's skip-list is a
/// superset of the fixed rules, never a replacement for them).
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub extra_excludes: Vec<String>,

    /// Rayon worker count for the scanner's pool. `0` keeps the scanner's
    /// own `min(16, cpus + 2)` default.
    pub threads: usize,
}

/// Drives indexing for one workspace root. Constructed once per server
/// session; the scanner, hash store and indexer set all live for as long
/// as the orchestrator does.
pub struct Orchestrator {
    root: PathBuf,
    config: OrchestratorConfig,
    scanner: FileScanner,
    hash_store: FileHashStore,
    indexers: IndexerSet,
    notifier: Arc<dyn IndexingNotifier>,
}

impl Orchestrator {
    /// Validates the on-disk cache version (wiping it on mismatch), opens
    /// the hash store and every domain indexer under `cache_dir`, and
    /// returns an orchestrator ready to scan `root`.
    pub fn open(
        root: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        config: OrchestratorConfig,
        notifier: Arc<dyn IndexingNotifier>,
    ) -> Result<Self, OrchestratorError> {
        let cache_dir = cache_dir.into();
        let wiped = CacheVersionManager::new(cache_dir.clone()).check()?;
        if wiped {
            tracing::info!("index cache schema changed, starting from an empty cache");
        }

        let hash_store = FileHashStore::open(&cache_dir.join("file_scanner.db"))?;
        let indexers = IndexerSet::build(&cache_dir)?;
        let scanner = if config.threads > 0 { FileScanner::with_worker_count(config.threads) } else { FileScanner::new() };

        Ok(Self { root: root.into(), config, scanner, hash_store, indexers, notifier })
    }

    pub fn indexers(&self) -> &IndexerSet {
        &self.indexers
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn parse_fn(&self) -> Box<ParseFn> {
        Box::new(|path: &Path, bytes: &[u8]| {
            let source = String::from_utf8_lossy(bytes).into_owned();
            let tree = ParseService::new().parse(path, bytes).ok().flatten()?;
            Some((source, tree))
        })
    }

    /// Runs a full crawl of the workspace, indexing every changed file and
    /// forgetting every file that disappeared since the last run.
    pub async fn index_all(&self) -> Result<ScanStats, OrchestratorError> {
        self.notifier.indexing_started();
        let started = Instant::now();

        let root = self.root.clone();
        let extra_excludes = self.config.extra_excludes.clone();
        let stats = self.run_scan(move |scanner, registry, hash_store, parse| {
            scanner.scan_all(&root, registry, hash_store, parse, &extra_excludes)
        })?;

        self.notifier.indexing_completed(summarize(&stats), started.elapsed().as_secs_f64());
        Ok(stats)
    }

    /// Forces a full reindex by clearing every indexer and the hash store
    /// first, so every file is treated as changed (`shopware/forceReindex`).
    pub async fn force_reindex(&self) -> Result<ScanStats, OrchestratorError> {
        self.indexers.clear_all()?;
        self.hash_store.clear()?;
        self.index_all().await
    }

    /// Rescans exactly the given files, used for editor-driven
    /// `didSave`/`didChange` notifications and `shopware/workspace/indexFiles`.
    pub async fn index_files(&self, paths: Vec<PathBuf>) -> Result<ScanStats, OrchestratorError> {
        let root = self.root.clone();
        self.run_scan(move |scanner, registry, hash_store, parse| scanner.scan_files(&paths, &root, registry, hash_store, parse))
    }

    /// Forgets a batch of deleted files.
    pub fn remove_files(&self, paths: &[PathBuf]) -> Result<(), OrchestratorError> {
        self.scanner.remove_files(paths, &self.indexers.registry, &self.hash_store)?;
        Ok(())
    }

    fn run_scan(
        &self,
        scan: impl FnOnce(&FileScanner, &shopware_lsp_database::Registry, &FileHashStore, &ParseFn) -> Result<ScanStats, shopware_lsp_database::DatabaseError>,
    ) -> Result<ScanStats, OrchestratorError> {
        let parse = self.parse_fn();
        let stats = scan(&self.scanner, &self.indexers.registry, &self.hash_store, parse.as_ref())?;
        tracing::info!(
            discovered = stats.discovered,
            changed = stats.changed,
            unchanged = stats.unchanged,
            removed = stats.removed,
            failed = stats.failed,
            "scan complete"
        );
        Ok(stats)
    }

    /// Blocks on the filesystem watcher and applies its debounced batches
    /// forever. Meant to be driven from a dedicated `tokio::task::spawn_blocking`
    /// task; returns only on a watcher error.
    pub fn watch_forever(&self) -> Result<(), OrchestratorError> {
        let watcher = DatabaseWatcher::new(&self.root)?;

        loop {
            let batch = watcher.next_batch()?;
            if batch.is_empty() {
                continue;
            }

            if !batch.removed.is_empty() {
                if let Err(error) = self.remove_files(&batch.removed) {
                    tracing::warn!(%error, "failed to forget removed files");
                }
            }

            if !batch.changed.is_empty() {
                let parse = self.parse_fn();
                if let Err(error) = self.scanner.scan_files(&batch.changed, &self.root, &self.indexers.registry, &self.hash_store, parse.as_ref()) {
                    tracing::warn!(%error, "failed to rescan changed files");
                }
            }
        }
    }

    pub fn close(&self) -> Result<(), OrchestratorError> {
        self.indexers.close_all()?;
        self.hash_store.close()?;
        Ok(())
    }
}

fn summarize(stats: &ScanStats) -> String {
    format!(
        "indexed {} changed, {} unchanged, {} removed, {} failed (of {} discovered)",
        stats.changed, stats.unchanged, stats.removed, stats.failed, stats.discovered
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::RecordingNotifier;

    #[tokio::test]
    async fn full_index_then_incremental_rescan_sees_no_changes() {
        let workspace = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        std::fs::write(workspace.path().join("feature_flags.yaml"), "flags:\n  - name: FOO_FLAG\n").unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator =
            Orchestrator::open(workspace.path(), cache.path(), OrchestratorConfig::default(), notifier.clone()).unwrap();

        let first = orchestrator.index_all().await.unwrap();
        assert_eq!(first.changed, 1);

        let second = orchestrator.index_all().await.unwrap();
        assert_eq!(second.changed, 0);
        assert_eq!(second.unchanged, 1);

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], "started");
    }

    #[tokio::test]
    async fn force_reindex_clears_cache_before_rescanning() {
        let workspace = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        std::fs::write(workspace.path().join("feature_flags.yaml"), "flags:\n  - name: FOO_FLAG\n").unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator =
            Orchestrator::open(workspace.path(), cache.path(), OrchestratorConfig::default(), notifier).unwrap();

        orchestrator.index_all().await.unwrap();
        let reindexed = orchestrator.force_reindex().await.unwrap();
        assert_eq!(reindexed.changed, 1);
    }
}
