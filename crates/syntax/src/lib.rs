//! Parsing for every language the framework's file tree mixes together: PHP,
//! XML, JSON, YAML, SCSS, JavaScript and TypeScript through tree-sitter, and
//! Twig through a bespoke scanner. Sits between `shopware-lsp-database`
//! (which owns the generic `AnyTree` abstraction these trees implement) and
//! `shopware-lsp-index` (which owns what to do with a parsed tree).

pub mod error;
pub mod js;
pub mod parse_service;
pub mod patterns;
pub mod query;
pub mod tree;
pub mod twig;
pub mod xml;
pub mod yaml;

pub use error::SyntaxError;
pub use parse_service::ParseService;
pub use tree::GrammarTree;
pub use twig::{TwigParseError, TwigTree};
