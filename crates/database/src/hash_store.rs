//! `file_scanner.db` — the persistent `path -> FileHash` store the scanner
//! consults to decide which files changed since the last crawl.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use bincode::Decode;
use bincode::Encode;
use parking_lot::RwLock;

use crate::error::DatabaseError;
use crate::hash::FileHash;
use crate::wal::WalFile;

#[derive(Debug, Clone, Encode, Decode)]
enum HashFrame {
    Put { path: String, hash: u64 },
    Delete { path: String },
    Clear,
}

/// A single embedded key/value file mapping workspace-absolute paths to the
/// 64-bit digest of their contents as of the last successful parse.
///
/// Kept as a store distinct from the per-indexer [`crate::store::FactStore`]s
/// (spec's open question: "an implementation may unify them provided the
/// per-indexer isolation and atomicity contracts hold" — we keep them
/// separate so that hash lookups never contend with an indexer's write lock).
pub struct FileHashStore {
    wal: RwLock<WalFile>,
    hashes: RwLock<HashMap<PathBuf, FileHash>>,
}

impl FileHashStore {
    /// Opens (or creates) the hash store at `path`, replaying any existing log.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let mut hashes = HashMap::new();

        let wal = WalFile::open(path, |frame: HashFrame| match frame {
            HashFrame::Put { path, hash } => {
                hashes.insert(PathBuf::from(path), FileHash(hash));
            }
            HashFrame::Delete { path } => {
                hashes.remove(&PathBuf::from(path));
            }
            HashFrame::Clear => {
                hashes.clear();
            }
        })?;

        Ok(Self { wal: RwLock::new(wal), hashes: RwLock::new(hashes) })
    }

    /// Returns the stored digest for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<FileHash> {
        self.hashes.read().get(path).copied()
    }

    /// Returns `true` if `path` is recorded with exactly `hash`.
    pub fn is_unchanged(&self, path: &Path, hash: FileHash) -> bool {
        self.get(path) == Some(hash)
    }

    /// Records digests for a batch of paths in a single transaction.
    pub fn put_batch(&self, entries: &[(PathBuf, FileHash)]) -> Result<(), DatabaseError> {
        if entries.is_empty() {
            return Ok(());
        }

        let frames: Vec<HashFrame> =
            entries.iter().map(|(path, hash)| HashFrame::Put { path: path.to_string_lossy().into_owned(), hash: hash.0 }).collect();

        self.wal.write().append_batch(&frames)?;

        let mut hashes = self.hashes.write();
        for (path, hash) in entries {
            hashes.insert(path.clone(), *hash);
        }

        Ok(())
    }

    /// Deletes the stored digest for every path in `paths`. Missing paths are
    /// accepted silently.
    pub fn delete_paths(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        if paths.is_empty() {
            return Ok(());
        }

        let frames: Vec<HashFrame> =
            paths.iter().map(|path| HashFrame::Delete { path: path.to_string_lossy().into_owned() }).collect();

        self.wal.write().append_batch(&frames)?;

        let mut hashes = self.hashes.write();
        for path in paths {
            hashes.remove(path);
        }

        Ok(())
    }

    /// Drops every stored digest.
    pub fn clear(&self) -> Result<(), DatabaseError> {
        self.wal.write().clear()?;
        self.hashes.write().clear();
        Ok(())
    }

    /// Checkpoints the log: rewrites it from the current in-memory state,
    /// discarding superseded `Put`/`Delete` frames.
    pub fn close(&self) -> Result<(), DatabaseError> {
        let hashes = self.hashes.read();
        let frames: Vec<HashFrame> =
            hashes.iter().map(|(path, hash)| HashFrame::Put { path: path.to_string_lossy().into_owned(), hash: hash.0 }).collect();

        self.wal.write().compact(&frames)
    }

    /// Every path currently recorded, regardless of its digest.
    pub fn known_paths(&self) -> Vec<PathBuf> {
        self.hashes.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.hashes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("file_scanner.db");

        {
            let store = FileHashStore::open(&db_path).unwrap();
            store.put_batch(&[(PathBuf::from("a.php"), FileHash::of(b"a")), (PathBuf::from("b.php"), FileHash::of(b"b"))]).unwrap();
        }

        let reopened = FileHashStore::open(&db_path).unwrap();
        assert_eq!(reopened.get(&PathBuf::from("a.php")), Some(FileHash::of(b"a")));
        assert_eq!(reopened.get(&PathBuf::from("b.php")), Some(FileHash::of(b"b")));
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn delete_paths_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHashStore::open(&dir.path().join("file_scanner.db")).unwrap();

        store.put_batch(&[(PathBuf::from("a.php"), FileHash::of(b"a"))]).unwrap();
        store.delete_paths(&[PathBuf::from("a.php")]).unwrap();

        assert_eq!(store.get(&PathBuf::from("a.php")), None);
    }

    #[test]
    fn missing_paths_are_deleted_silently() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHashStore::open(&dir.path().join("file_scanner.db")).unwrap();

        assert!(store.delete_paths(&[PathBuf::from("never-existed.php")]).is_ok());
    }

    #[test]
    fn second_scan_of_unchanged_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHashStore::open(&dir.path().join("file_scanner.db")).unwrap();

        let hash = FileHash::of(b"contents");
        store.put_batch(&[(PathBuf::from("a.php"), hash)]).unwrap();

        assert!(store.is_unchanged(&PathBuf::from("a.php"), hash));
    }
}
