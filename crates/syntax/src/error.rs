//! Error type for the syntax crate.

#[derive(Debug)]
pub enum SyntaxError {
    UnsupportedExtension(String),
    LanguageInit(String),
    Twig(crate::twig::TwigParseError),
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedExtension(ext) => write!(f, "no parser registered for extension '{ext}'"),
            Self::LanguageInit(message) => write!(f, "failed to initialize grammar: {message}"),
            Self::Twig(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Twig(error) => Some(error),
            _ => None,
        }
    }
}

impl From<crate::twig::TwigParseError> for SyntaxError {
    fn from(error: crate::twig::TwigParseError) -> Self {
        Self::Twig(error)
    }
}
