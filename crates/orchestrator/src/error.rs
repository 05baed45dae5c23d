//! Error type for the orchestrator crate.

#[derive(Debug)]
pub enum OrchestratorError {
    Database(shopware_lsp_database::DatabaseError),
    Index(shopware_lsp_index::IndexError),
    Io(std::io::Error),
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(error) => write!(f, "{error}"),
            Self::Index(error) => write!(f, "{error}"),
            Self::Io(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(error) => Some(error),
            Self::Index(error) => Some(error),
            Self::Io(error) => Some(error),
        }
    }
}

impl From<shopware_lsp_database::DatabaseError> for OrchestratorError {
    fn from(error: shopware_lsp_database::DatabaseError) -> Self {
        Self::Database(error)
    }
}

impl From<shopware_lsp_index::IndexError> for OrchestratorError {
    fn from(error: shopware_lsp_index::IndexError) -> Self {
        Self::Index(error)
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
