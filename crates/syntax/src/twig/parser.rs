//! Turns the flat token stream from [`crate::twig::lexer`] into a
//! [`crate::twig::node::TwigTree`]. We don't build an AST for expressions:
//! every extraction here is a regex or substring match against a tag/output/
//! comment's raw content, which is enough to recover the handful of shapes
//! indexing cares about.

use std::sync::LazyLock;

use regex::Regex;

use crate::twig::lexer::{tokenize, Token, TokenKind};
use crate::twig::node::{
    ByteSpan, TwigBlockNode, TwigCallKind, TwigCallNode, TwigExtendsNode, TwigIconArgument, TwigTree,
    TwigVersionComment,
};

static VERSION_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"shopware-block:\s*([a-f0-9]+)@([\w.\-]+)").expect("valid regex"));

static CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"));

static SW_ICON_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sw_icon\s*\(\s*['"]([^'"]+)['"]"#).expect("valid regex"));

struct BlockFrame {
    name: String,
    name_span: ByteSpan,
    start_line: usize,
    body_start: usize,
}

/// Walks `source` once, producing the tree an indexer ingests.
///
/// Unbalanced `{% block %}`/`{% endblock %}` pairs are tolerated: any block
/// left open at end-of-file is simply dropped, since a malformed template
/// should degrade the index rather than abort indexing.
pub fn parse(source: &str) -> TwigTree {
    let tokens = tokenize(source);
    let mut tree = TwigTree::default();
    let mut open_blocks: Vec<BlockFrame> = Vec::new();

    for token in &tokens {
        match token.kind {
            TokenKind::Tag => parse_tag(source, token, &mut tree, &mut open_blocks),
            TokenKind::Output => parse_output(source, token, &mut tree),
            TokenKind::Comment => parse_comment(source, token, &mut tree),
            TokenKind::Text => {}
        }
    }

    tree
}

fn parse_tag(source: &str, token: &Token, tree: &mut TwigTree, open_blocks: &mut Vec<BlockFrame>) {
    let raw = content_of(source, token);
    let leading_trim = raw.len() - raw.trim_start().len();
    let content = raw.trim();

    if let Some(rest) = content.strip_prefix("block") {
        let name = rest.trim();
        if !name.is_empty() {
            // Offset of `name` within `raw`: past "block" plus the whitespace
            // separating it from the tag name.
            let name_offset = leading_trim + (content.len() - rest.len()) + (rest.len() - rest.trim_start().len());
            let name_start = token.content_span.start + name_offset;
            open_blocks.push(BlockFrame {
                name: name.to_string(),
                name_span: ByteSpan { start: name_start, end: name_start + name.len() },
                start_line: token.line,
                body_start: token.full_span.end,
            });
        }
        return;
    }

    if content.trim_start() == "endblock" || content.trim_start().starts_with("endblock ") {
        if let Some(frame) = open_blocks.pop() {
            tree.blocks.push(TwigBlockNode {
                name: frame.name,
                name_span: frame.name_span,
                body_span: ByteSpan { start: frame.body_start, end: token.full_span.start },
                start_line: frame.start_line,
            });
        }
        return;
    }

    if let Some(rest) = content.strip_prefix("sw_extends") {
        tree.extends = Some(TwigExtendsNode {
            target: extract_quoted(rest).unwrap_or_default(),
            is_sw_extends: true,
            span: token.content_span,
        });
        return;
    }

    if let Some(rest) = content.strip_prefix("extends") {
        tree.extends = Some(TwigExtendsNode {
            target: extract_quoted(rest).unwrap_or_default(),
            is_sw_extends: false,
            span: token.content_span,
        });
        return;
    }

    collect_calls(source, token, tree);
}

fn parse_output(source: &str, token: &Token, tree: &mut TwigTree) {
    collect_calls(source, token, tree);

    let content = content_of(source, token);
    for capture in SW_ICON_ARG.captures_iter(content) {
        let name = capture.get(1).unwrap();
        tree.icon_arguments.push(TwigIconArgument {
            name: name.as_str().to_string(),
            span: ByteSpan {
                start: token.content_span.start + name.start(),
                end: token.content_span.start + name.end(),
            },
        });
    }
}

fn parse_comment(source: &str, token: &Token, tree: &mut TwigTree) {
    let content = content_of(source, token);
    if let Some(captures) = VERSION_COMMENT.captures(content) {
        let whole = captures.get(0).unwrap();
        tree.version_comments.push(TwigVersionComment {
            hash: captures[1].to_string(),
            version: captures[2].to_string(),
            span: ByteSpan {
                start: token.content_span.start + whole.start(),
                end: token.content_span.start + whole.end(),
            },
            line: token.line,
        });
    }
}

/// `name(`-shaped occurrences are call-like whether they're a function
/// (`render('...')`) or a filter applied after `|` (`value|trans`, which
/// never parenthesizes, so filters are only recovered from the `|name(`
/// shape when the filter itself takes arguments, e.g. `value|format('%s')`).
fn collect_calls(source: &str, token: &Token, tree: &mut TwigTree) {
    let content = content_of(source, token);

    for capture in CALL.captures_iter(content) {
        let name_match = capture.get(1).unwrap();
        let name = name_match.as_str();
        if is_keyword(name) {
            continue;
        }

        let preceding = &content[..name_match.start()];
        let kind = if preceding.trim_end().ends_with('|') { TwigCallKind::Filter } else { TwigCallKind::Function };

        tree.calls.push(TwigCallNode {
            name: name.to_string(),
            kind,
            span: ByteSpan {
                start: token.content_span.start + name_match.start(),
                end: token.content_span.start + name_match.end(),
            },
            line: token.line,
        });
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "if" | "elseif" | "for" | "in" | "not" | "and" | "or" | "is")
}

fn extract_quoted(text: &str) -> Option<String> {
    let text = text.trim();
    let quote = text.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let rest = &text[quote.len_utf8()..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

fn content_of<'a>(source: &'a str, token: &Token) -> &'a str {
    &source[token.content_span.start..token.content_span.end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_block() {
        let tree = parse("{% block content %}hello{% endblock %}");
        assert_eq!(tree.blocks.len(), 1);
        assert_eq!(tree.blocks[0].name, "content");
    }

    #[test]
    fn parses_nested_blocks_independently() {
        let tree = parse("{% block outer %}a{% block inner %}b{% endblock %}c{% endblock %}");
        assert_eq!(tree.blocks.len(), 2);
        assert_eq!(tree.blocks[0].name, "inner");
        assert_eq!(tree.blocks[1].name, "outer");
    }

    #[test]
    fn parses_sw_extends_target() {
        let tree = parse("{% sw_extends '@Storefront/storefront/page/content/index.html.twig' %}");
        let extends = tree.extends.unwrap();
        assert!(extends.is_sw_extends);
        assert_eq!(extends.target, "@Storefront/storefront/page/content/index.html.twig");
    }

    #[test]
    fn parses_version_comment() {
        let tree = parse("{# shopware-block: a1b2c3d4e5@6.5.0.0 #}");
        assert_eq!(tree.version_comments.len(), 1);
        assert_eq!(tree.version_comments[0].hash, "a1b2c3d4e5");
        assert_eq!(tree.version_comments[0].version, "6.5.0.0");
    }

    #[test]
    fn collects_function_and_filter_calls() {
        let tree = parse("{{ price|currency }} {{ render('foo') }} {{ value|format('%s') }}");
        let functions: Vec<_> = tree.functions().map(|call| call.name.as_str()).collect();
        let filters: Vec<_> = tree.filters().map(|call| call.name.as_str()).collect();
        assert_eq!(functions, vec!["render"]);
        assert_eq!(filters, vec!["format"]);
    }

    #[test]
    fn collects_sw_icon_argument() {
        let tree = parse("{{ sw_icon('regular-chevron-right') }}");
        assert_eq!(tree.icon_arguments.len(), 1);
        assert_eq!(tree.icon_arguments[0].name, "regular-chevron-right");
    }
}
