//! The `Indexer` abstraction domain indexers implement, and the `Registry`
//! the scanner fans a parsed file out to.
//!
//! "A tagged variant or interface abstraction, not a class hierarchy" (design
//! note carried from the original specification) — in Rust that is a trait
//! object, not an enum, since indexers are added and composed by the binary
//! crate rather than matched over exhaustively by the scanner.

use std::path::Path;

use crate::error::DatabaseError;

/// One domain indexer: service definitions, routes, Twig blocks, snippets,
/// feature flags, extensions, theme config, or admin components.
///
/// Implementors own whatever [`crate::store::FactStore`]s they need and are
/// responsible for their own on-disk layout under the cache directory handed
/// to them at construction time. The scanner and watcher only ever call back
/// through this trait; they hold no knowledge of what any indexer stores.
pub trait Indexer: Send + Sync {
    /// A short, stable identifier used in logs and in the cache directory
    /// layout (e.g. `"service"`, `"twig"`, `"snippet"`).
    fn id(&self) -> &'static str;

    /// The file extensions this indexer wants to see, e.g. `&["xml", "yaml", "yml"]`.
    /// The scanner only parses and dispatches files whose extension is claimed
    /// by at least one registered indexer.
    fn extensions(&self) -> &'static [&'static str];

    /// Ingests a single file's parsed syntax tree. `path` is workspace-relative.
    /// Implementations must first forget any rows previously recorded for
    /// `path` (re-ingestion of a changed file is delete-then-insert, never a merge).
    fn ingest(&self, path: &Path, source: &str, tree: &dyn crate::tree::AnyTree) -> Result<(), DatabaseError>;

    /// Removes every row recorded for the given paths, e.g. after a deletion
    /// or a rename detected by the watcher.
    fn forget_files(&self, paths: &[std::path::PathBuf]) -> Result<(), DatabaseError>;

    /// Drops every row this indexer has ever recorded, e.g. on a cache-version
    /// mismatch or an explicit `forceReindex`.
    fn clear(&self) -> Result<(), DatabaseError>;

    /// Checkpoints whatever on-disk state this indexer owns.
    fn close(&self) -> Result<(), DatabaseError>;
}

/// A registry of indexers the scanner fans parsed files out to.
#[derive(Default)]
pub struct Registry {
    indexers: Vec<Box<dyn Indexer>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, indexer: Box<dyn Indexer>) {
        self.indexers.push(indexer);
    }

    pub fn indexers(&self) -> &[Box<dyn Indexer>] {
        &self.indexers
    }

    /// Indexers that claim `extension`, in registration order.
    pub fn for_extension<'a>(&'a self, extension: &str) -> impl Iterator<Item = &'a Box<dyn Indexer>> {
        self.indexers.iter().filter(move |indexer| indexer.extensions().contains(&extension))
    }

    /// Every extension claimed by at least one registered indexer.
    pub fn claimed_extensions(&self) -> std::collections::HashSet<&'static str> {
        self.indexers.iter().flat_map(|indexer| indexer.extensions().iter().copied()).collect()
    }

    pub fn forget_files(&self, paths: &[std::path::PathBuf]) -> Result<(), DatabaseError> {
        for indexer in &self.indexers {
            indexer.forget_files(paths)?;
        }
        Ok(())
    }

    pub fn clear_all(&self) -> Result<(), DatabaseError> {
        for indexer in &self.indexers {
            indexer.clear()?;
        }
        Ok(())
    }

    pub fn close_all(&self) -> Result<(), DatabaseError> {
        for indexer in &self.indexers {
            indexer.close()?;
        }
        Ok(())
    }
}
