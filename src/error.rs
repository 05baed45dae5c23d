//! The CLI's top-level error type. Every fallible operation in the binary
//! crate ultimately converts into one of these variants so `main` has a
//! single place to log and map to a process exit code.

#[derive(Debug)]
pub enum Error {
    Database(shopware_lsp_database::DatabaseError),
    Syntax(shopware_lsp_syntax::SyntaxError),
    Index(shopware_lsp_index::IndexError),
    Orchestrator(shopware_lsp_orchestrator::OrchestratorError),
    BuildingRuntime(std::io::Error),
    BuildingConfiguration(config::ConfigError),
    DeserializingToml(toml::de::Error),
    SerializingToml(toml::ser::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Http(ureq::Error),
    NotAGitRepository,
    WorkspaceRootNotAFileUri(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(error) => write!(f, "{error}"),
            Self::Syntax(error) => write!(f, "{error}"),
            Self::Index(error) => write!(f, "{error}"),
            Self::Orchestrator(error) => write!(f, "{error}"),
            Self::BuildingRuntime(error) => write!(f, "failed to start the async runtime: {error}"),
            Self::BuildingConfiguration(error) => write!(f, "{error}"),
            Self::DeserializingToml(error) => write!(f, "{error}"),
            Self::SerializingToml(error) => write!(f, "{error}"),
            Self::Json(error) => write!(f, "{error}"),
            Self::Io(error) => write!(f, "{error}"),
            Self::Http(error) => write!(f, "{error}"),
            Self::NotAGitRepository => write!(f, "not inside a git repository"),
            Self::WorkspaceRootNotAFileUri(uri) => write!(f, "workspace root URI is not a file URI: {uri}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(error) => Some(error),
            Self::Syntax(error) => Some(error),
            Self::Index(error) => Some(error),
            Self::Orchestrator(error) => Some(error),
            Self::BuildingRuntime(error) => Some(error),
            Self::BuildingConfiguration(error) => Some(error),
            Self::DeserializingToml(error) => Some(error),
            Self::SerializingToml(error) => Some(error),
            Self::Json(error) => Some(error),
            Self::Io(error) => Some(error),
            Self::Http(error) => Some(error),
            _ => None,
        }
    }
}

impl From<shopware_lsp_database::DatabaseError> for Error {
    fn from(error: shopware_lsp_database::DatabaseError) -> Self {
        Self::Database(error)
    }
}

impl From<shopware_lsp_syntax::SyntaxError> for Error {
    fn from(error: shopware_lsp_syntax::SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl From<shopware_lsp_index::IndexError> for Error {
    fn from(error: shopware_lsp_index::IndexError) -> Self {
        Self::Index(error)
    }
}

impl From<shopware_lsp_orchestrator::OrchestratorError> for Error {
    fn from(error: shopware_lsp_orchestrator::OrchestratorError) -> Self {
        Self::Orchestrator(error)
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::BuildingConfiguration(error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializingToml(error)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(error: toml::ser::Error) -> Self {
        Self::SerializingToml(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<ureq::Error> for Error {
    fn from(error: ureq::Error) -> Self {
        Self::Http(error)
    }
}
