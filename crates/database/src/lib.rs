//! File scanning, content hashing, and the generic persistent key/value fact
//! store every domain indexer is built on.
//!
//! This crate knows nothing about PHP, Twig, or any other language — it
//! provides the mechanism (crawl, hash, watch, persist) that `shopware-lsp-index`
//! and `shopware-lsp-syntax` give domain meaning to.

pub mod error;
pub mod exclusion;
pub mod hash;
pub mod hash_store;
pub mod indexer;
pub mod scanner;
pub mod store;
pub mod tree;
pub mod wal;
pub mod watcher;

pub use error::DatabaseError;
pub use exclusion::Exclusion;
pub use hash::FileHash;
pub use hash_store::FileHashStore;
pub use indexer::Indexer;
pub use indexer::Registry;
pub use scanner::FileScanner;
pub use scanner::ParseFn;
pub use scanner::ScanStats;
pub use store::FactPayload;
pub use store::FactStore;
pub use tree::AnyTree;
pub use watcher::ChangeBatch;
pub use watcher::DatabaseWatcher;
