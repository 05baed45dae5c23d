//! A bespoke Twig scanner: the workspace's tree-sitter dependency set has no
//! maintained Twig grammar, so block/extends/call/version-comment/icon
//! extraction is done with a small lexer over `{% %}`/`{{ }}`/`{# #}`
//! delimiters instead of a full parser.

mod lexer;
mod node;
mod parser;

pub use node::{
    ByteSpan, TwigBlockNode, TwigCallKind, TwigCallNode, TwigExtendsNode, TwigIconArgument, TwigTree,
    TwigVersionComment,
};

/// Twig scanning never fails on malformed input — an unterminated tag or a
/// dangling block just degrades what gets extracted. This type exists so the
/// crate's error plumbing (`SyntaxError::Twig`) has something concrete to
/// wrap, and so a future stricter mode (e.g. surfacing unterminated tags as
/// diagnostics) has a home to grow into.
#[derive(Debug)]
pub struct TwigParseError(String);

impl std::fmt::Display for TwigParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to scan twig template: {}", self.0)
    }
}

impl std::error::Error for TwigParseError {}

/// Scans `source`, a `.twig` template, into its [`TwigTree`].
pub fn parse(source: &str) -> Result<TwigTree, TwigParseError> {
    Ok(parser::parse(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_template() {
        let tree = parse("").unwrap();
        assert!(tree.blocks.is_empty());
        assert!(tree.extends.is_none());
    }
}
