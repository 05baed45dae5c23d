//! tree-sitter-json node-shape helpers shared by the JSON-backed domain
//! indexers (snippet, theme-config): flattening an object's leaves into
//! dotted keys paired with the node whose span anchors their line, and
//! decoding a string node's literal text via `serde_json` (the same decoder
//! used for the surrounding document, so escapes stay consistent).

use shopware_lsp_syntax::query;
use tree_sitter::Node;

/// Decodes a JSON `string` node's literal text (handling escapes). Falls
/// back to a quote-stripped copy of the raw text if the node somehow isn't
/// valid JSON (should not happen for anything tree-sitter accepted as a
/// `string` node).
pub fn string_text(node: &Node, source: &[u8]) -> String {
    let raw = query::text(node, source);
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim_matches('"').to_string())
}

/// The node's literal value as text: decoded for strings, the node's own
/// source span otherwise (numbers, `true`/`false`).
pub fn leaf_text(node: &Node, source: &[u8]) -> String {
    if node.kind() == "string" {
        string_text(node, source)
    } else {
        query::text(node, source).to_string()
    }
}

/// The object node's direct `pair` children, each as `(key node, value node)`.
pub fn pairs<'a>(object: Node<'a>) -> Vec<(Node<'a>, Node<'a>)> {
    let mut cursor = object.walk();
    object
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "pair")
        .filter_map(|pair| Some((pair.child_by_field_name("key")?, pair.child_by_field_name("value")?)))
        .collect()
}

/// Walks `value` depth-first, emitting `(dotted.key, leaf_node)` for every
/// string/number/boolean leaf (`null` leaves are dropped, matching the
/// snippet/theme-config semantics of "absent" translations or fields).
pub fn flatten<'a>(value: Node<'a>, source: &[u8], prefix: String, out: &mut Vec<(String, Node<'a>)>) {
    if value.kind() != "object" {
        if value.kind() != "null" {
            out.push((prefix, value));
        }
        return;
    }

    for (key_node, value_node) in pairs(value) {
        let key = string_text(&key_node, source);
        let dotted = if prefix.is_empty() { key } else { format!("{prefix}.{key}") };
        flatten(value_node, source, dotted, out);
    }
}

/// The `value` field of the first direct `pair` child of `object` whose key
/// equals `key`, or `None` if absent or `object` isn't an `object` node.
pub fn direct_value<'a>(object: Node<'a>, source: &[u8], key: &str) -> Option<Node<'a>> {
    if object.kind() != "object" {
        return None;
    }
    pairs(object).into_iter().find(|(key_node, _)| string_text(key_node, source) == key).map(|(_, value)| value)
}

/// Walks `path` (dot-separated keys) from `root`, the JSON-tree equivalent
/// of `serde_json::Value::pointer`.
pub fn walk_path<'a>(root: Node<'a>, source: &[u8], path: &[&str]) -> Option<Node<'a>> {
    path.iter().try_fold(root, |node, segment| direct_value(node, source, segment))
}

/// The document's top-level `object` node, regardless of whatever wrapper
/// node tree-sitter-json's root rule puts around it.
pub fn root_object(tree: &tree_sitter::Tree) -> Option<Node> {
    query::find_all(tree.root_node(), |node| node.kind() == "object").into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_json::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn flattens_nested_object() {
        let source = r#"{"foo":{"bar":"Hallo"}}"#;
        let tree = parse(source);
        let bytes = source.as_bytes();
        let root = root_object(&tree).unwrap();

        let mut out = Vec::new();
        flatten(root, bytes, String::new(), &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "foo.bar");
        assert_eq!(leaf_text(&out[0].1, bytes), "Hallo");
    }

    #[test]
    fn walks_a_dotted_path() {
        let source = r#"{"config":{"fields":{"a":1}}}"#;
        let tree = parse(source);
        let bytes = source.as_bytes();
        let root = root_object(&tree).unwrap();

        let fields = walk_path(root, bytes, &["config", "fields"]).unwrap();
        assert_eq!(fields.kind(), "object");
    }
}
