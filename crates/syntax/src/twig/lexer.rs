//! A minimal Twig tokenizer: just enough to find the boundaries of `{% %}`
//! tag, `{{ }}` output, and `{# #}` comment regions. Everything inside a
//! region is handed to [`crate::twig::parser`] as raw text; we never build a
//! full expression grammar since indexing only needs tag names, string
//! literals, and call-like `name(` shapes.

use memchr::memchr;

use crate::twig::node::ByteSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Tag,
    Output,
    Comment,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The span of the inner content, excluding the delimiters themselves.
    pub content_span: ByteSpan,
    /// The span including delimiters, used when a caller needs the whole region.
    pub full_span: ByteSpan,
    pub line: usize,
}

struct Delimiter {
    open: &'static str,
    close: &'static str,
    kind: TokenKind,
}

const DELIMITERS: &[Delimiter] = &[
    Delimiter { open: "{%", close: "%}", kind: TokenKind::Tag },
    Delimiter { open: "{{", close: "}}", kind: TokenKind::Output },
    Delimiter { open: "{#", close: "#}", kind: TokenKind::Comment },
];

/// Tokenizes `source` into a flat sequence of text and Twig-region tokens, in
/// source order.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut cursor = 0;

    while cursor < bytes.len() {
        let next_open = DELIMITERS
            .iter()
            .filter_map(|delimiter| find(bytes, cursor, delimiter.open.as_bytes()).map(|pos| (pos, delimiter)))
            .min_by_key(|(pos, _)| *pos);

        let Some((open_pos, delimiter)) = next_open else {
            line += count_newlines(&source[cursor..]);
            tokens.push(Token {
                kind: TokenKind::Text,
                content_span: ByteSpan { start: cursor, end: bytes.len() },
                full_span: ByteSpan { start: cursor, end: bytes.len() },
                line,
            });
            break;
        };

        if open_pos > cursor {
            line += count_newlines(&source[cursor..open_pos]);
            tokens.push(Token {
                kind: TokenKind::Text,
                content_span: ByteSpan { start: cursor, end: open_pos },
                full_span: ByteSpan { start: cursor, end: open_pos },
                line,
            });
        }

        let content_start = open_pos + delimiter.open.len();
        let token_line = line + count_newlines(&source[cursor.max(open_pos)..open_pos]);

        let Some(close_relative) = find(bytes, content_start, delimiter.close.as_bytes()) else {
            // Unterminated tag: treat the rest of the file as text so a
            // malformed template never causes the scanner to hang.
            tokens.push(Token {
                kind: TokenKind::Text,
                content_span: ByteSpan { start: open_pos, end: bytes.len() },
                full_span: ByteSpan { start: open_pos, end: bytes.len() },
                line: token_line,
            });
            break;
        };

        let content_end = close_relative;
        let full_end = close_relative + delimiter.close.len();

        line = token_line + count_newlines(&source[content_start..full_end]);

        tokens.push(Token {
            kind: delimiter.kind,
            content_span: ByteSpan { start: content_start, end: content_end },
            full_span: ByteSpan { start: open_pos, end: full_end },
            line: token_line,
        });

        cursor = full_end;
    }

    tokens
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.len() == 1 {
        return memchr(needle[0], &haystack[from..]).map(|pos| from + pos);
    }

    haystack[from..].windows(needle.len()).position(|window| window == needle).map(|pos| from + pos)
}

fn count_newlines(text: &str) -> usize {
    memchr::memchr_iter(b'\n', text.as_bytes()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_block_tag() {
        let tokens = tokenize("before {% block content %}inside{% endblock %} after");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Text, TokenKind::Tag, TokenKind::Text, TokenKind::Tag, TokenKind::Text]);
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("line1\nline2 {% block x %}{% endblock %}");
        let tag = tokens.iter().find(|t| t.kind == TokenKind::Tag).unwrap();
        assert_eq!(tag.line, 2);
    }
}
