//! Error types for the database crate.

use std::path::PathBuf;

/// Errors produced while scanning the filesystem, hashing files, or reading
/// and writing a [`crate::store::FactStore`] / [`crate::hash_store::FileHashStore`].
#[derive(Debug)]
pub enum DatabaseError {
    Io(std::io::Error),
    ReadingFile(PathBuf, std::io::Error),
    Glob(globset::Error),
    WatcherInit(notify::Error),
    WatcherWatch(notify::Error),
    WatcherNotActive,
    Encoding(bincode::error::EncodeError),
    Decoding(bincode::error::DecodeError),
    CorruptStore { path: PathBuf, reason: String },
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "{error}"),
            Self::ReadingFile(path, error) => write!(f, "failed to read {}: {error}", path.display()),
            Self::Glob(error) => write!(f, "{error}"),
            Self::WatcherInit(error) => write!(f, "failed to initialize file watcher: {error}"),
            Self::WatcherWatch(error) => write!(f, "failed to watch path: {error}"),
            Self::WatcherNotActive => write!(f, "the watcher is not currently active"),
            Self::Encoding(error) => write!(f, "failed to encode fact payload: {error}"),
            Self::Decoding(error) => write!(f, "failed to decode fact payload: {error}"),
            Self::CorruptStore { path, reason } => write!(f, "fact store at {} is corrupt: {reason}", path.display()),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::ReadingFile(_, error) => Some(error),
            Self::Glob(error) => Some(error),
            Self::WatcherInit(error) | Self::WatcherWatch(error) => Some(error),
            Self::Encoding(error) => Some(error),
            Self::Decoding(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<globset::Error> for DatabaseError {
    fn from(error: globset::Error) -> Self {
        Self::Glob(error)
    }
}
