//! The parse service: one `tree_sitter::Parser` per grammar, instantiated
//! lazily per scanner worker thread, plus the hand-rolled Twig scanner for
//! the one language the workspace has no tree-sitter grammar for.
//!
//! Grounded on `kota-db`'s optional tree-sitter grammar features
//! (`tree-sitter-rust`/`tree-sitter-typescript`/`tree-sitter-javascript`/`tree-sitter-python`
//! gated per `Cargo.toml` feature) — the same per-extension parser table idea,
//! generalized to the five grammars this workspace actually needs plus one
//! bespoke Twig parser.

use std::cell::RefCell;
use std::path::Path;

use shopware_lsp_database::AnyTree;

use crate::error::SyntaxError;
use crate::tree::GrammarTree;
use crate::twig::TwigTree;

/// How long a single file is allowed to spend inside `tree_sitter::Parser::parse`
/// before the service gives up and returns a partial (possibly `None`) tree.
/// Set via `tree_sitter::Parser::set_timeout_micros`.
pub const PARSE_TIMEOUT_MICROS: u64 = 750_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    Php,
    Xml,
    Json,
    Yaml,
    Css,
    JavaScript,
    TypeScript,
}

impl Grammar {
    fn for_extension(extension: &str) -> Option<Self> {
        match extension {
            "php" => Some(Self::Php),
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            "scss" | "css" => Some(Self::Css),
            "js" | "mjs" | "vue" => Some(Self::JavaScript),
            "ts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    fn language(self) -> tree_sitter::Language {
        match self {
            Self::Php => tree_sitter_php::LANGUAGE_PHP.into(),
            Self::Xml => tree_sitter_xml::LANGUAGE_XML.into(),
            Self::Json => tree_sitter_json::LANGUAGE.into(),
            Self::Yaml => tree_sitter_yaml::LANGUAGE.into(),
            Self::Css => tree_sitter_css::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Php => "php",
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Css => "css",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
        }
    }
}

thread_local! {
    static PARSERS: RefCell<std::collections::HashMap<&'static str, tree_sitter::Parser>> =
        RefCell::new(std::collections::HashMap::new());
}

/// Parses files into syntax trees, dispatching by extension to the right
/// tree-sitter grammar or, for `.twig` files, to the bespoke Twig scanner.
///
/// One instance is shared across the rayon worker pool; each worker lazily
/// builds and caches its own `tree_sitter::Parser` per grammar in thread-local
/// storage, since `tree_sitter::Parser` is not `Sync`.
#[derive(Default)]
pub struct ParseService;

impl ParseService {
    pub fn new() -> Self {
        Self
    }

    /// The extensions this service knows how to parse.
    pub fn supported_extensions(&self) -> &'static [&'static str] {
        &["php", "xml", "json", "yml", "yaml", "scss", "css", "js", "mjs", "vue", "ts", "twig"]
    }

    /// Parses `source` (already read from `path`), returning the tree-sitter
    /// or Twig tree an indexer can ingest. Returns `Ok(None)` for extensions
    /// nobody claims.
    pub fn parse(&self, path: &Path, source: &[u8]) -> Result<Option<Box<dyn AnyTree>>, SyntaxError> {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return Ok(None);
        };

        if extension == "twig" {
            let text = String::from_utf8_lossy(source);
            let tree: TwigTree = crate::twig::parse(&text)?;
            return Ok(Some(Box::new(tree)));
        }

        let Some(grammar) = Grammar::for_extension(extension) else {
            return Ok(None);
        };

        let tree = PARSERS.with(|parsers| {
            let mut parsers = parsers.borrow_mut();
            let parser = parsers.entry(grammar.name()).or_insert_with(|| {
                let mut parser = tree_sitter::Parser::new();
                parser.set_language(&grammar.language()).expect("grammar language version mismatch");
                parser.set_timeout_micros(PARSE_TIMEOUT_MICROS);
                parser
            });

            parser.parse(source, None)
        });

        let Some(tree) = tree else {
            tracing::warn!(path = %path.display(), grammar = grammar.name(), "parser timed out or produced no tree");
            return Ok(None);
        };

        Ok(Some(Box::new(GrammarTree { language: grammar.name(), tree })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json() {
        let service = ParseService::new();
        let result = service.parse(Path::new("theme.json"), br#"{"a": 1}"#).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().language(), "json");
    }

    #[test]
    fn declines_unknown_extensions() {
        let service = ParseService::new();
        assert!(service.parse(Path::new("readme.md"), b"# hi").unwrap().is_none());
    }
}
