//! Indexing lifecycle orchestration: cache-version validation, full and
//! incremental scans, forced reindexing, and the filesystem watcher loop,
//! all reported back to the LSP client through an [`IndexingNotifier`].
//!
//! [`Orchestrator`] is the central coordinator: it owns the
//! `shopware-lsp-database` scanner and hash store, the `shopware-lsp-syntax`
//! parse service, and a `shopware-lsp-index::IndexerSet`, and is the only
//! place the LSP layer needs to reach for indexing.

pub mod cache_version;
pub mod error;
pub mod notifier;
#[allow(clippy::module_inception)]
pub mod orchestrator;

pub use cache_version::CURRENT_VERSION;
pub use cache_version::CacheVersionManager;
pub use error::OrchestratorError;
pub use notifier::IndexingNotifier;
pub use notifier::TowerLspNotifier;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorConfig;
