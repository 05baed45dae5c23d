//! Error type for the index crate.

#[derive(Debug)]
pub enum IndexError {
    Database(shopware_lsp_database::DatabaseError),
    UnrecognizedTree { indexer: &'static str },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(error) => write!(f, "{error}"),
            Self::UnrecognizedTree { indexer } => write!(f, "{indexer} received a tree it cannot downcast"),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(error) => Some(error),
            Self::UnrecognizedTree { .. } => None,
        }
    }
}

impl From<shopware_lsp_database::DatabaseError> for IndexError {
    fn from(error: shopware_lsp_database::DatabaseError) -> Self {
        Self::Database(error)
    }
}
