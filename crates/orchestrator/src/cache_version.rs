//! Validates the on-disk cache against a compile-time schema version, wiping
//! it on mismatch, absence, or corruption so every indexer opens a store
//! that actually matches the facts it knows how to read.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::OrchestratorError;

/// Bumped whenever a fact payload's encoding changes in a way that isn't
/// forward-compatible (spec's "breaking changes bump the global schema
/// version").
pub const CURRENT_VERSION: u32 = 1;

const VERSION_FILE: &str = "index_version";

pub struct CacheVersionManager {
    cache_dir: PathBuf,
}

impl CacheVersionManager {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into() }
    }

    /// Ensures the cache directory exists and matches [`CURRENT_VERSION`],
    /// wiping it first if it doesn't. Returns `true` if the cache was wiped
    /// (the caller must force a full reindex in that case).
    pub fn check(&self) -> Result<bool, OrchestratorError> {
        fs::create_dir_all(&self.cache_dir)?;

        let version_path = self.cache_dir.join(VERSION_FILE);
        let on_disk = fs::read_to_string(&version_path).ok().and_then(|contents| contents.trim().parse::<u32>().ok());

        if on_disk == Some(CURRENT_VERSION) {
            return Ok(false);
        }

        tracing::info!(on_disk = ?on_disk, current = CURRENT_VERSION, "cache version mismatch, wiping cache directory");
        self.wipe()?;
        fs::write(&version_path, CURRENT_VERSION.to_string())?;

        Ok(true)
    }

    fn wipe(&self) -> Result<(), OrchestratorError> {
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_version_file_triggers_wipe() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheVersionManager::new(dir.path().to_path_buf());

        assert!(manager.check().unwrap());
        assert_eq!(fs::read_to_string(dir.path().join(VERSION_FILE)).unwrap(), CURRENT_VERSION.to_string());
    }

    #[test]
    fn matching_version_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.db"), b"keep me").unwrap();
        fs::write(dir.path().join(VERSION_FILE), CURRENT_VERSION.to_string()).unwrap();

        let manager = CacheVersionManager::new(dir.path().to_path_buf());
        assert!(!manager.check().unwrap());
        assert!(dir.path().join("stale.db").exists());
    }

    #[test]
    fn mismatched_version_wipes_everything_but_the_new_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.db"), b"drop me").unwrap();
        fs::write(dir.path().join(VERSION_FILE), "0").unwrap();

        let manager = CacheVersionManager::new(dir.path().to_path_buf());
        assert!(manager.check().unwrap());

        let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from(VERSION_FILE)]);
    }
}
