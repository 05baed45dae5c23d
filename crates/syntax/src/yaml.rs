//! tree-sitter-yaml node-shape helpers shared by every YAML-backed domain
//! indexer (service, route, feature-flag): locating mapping pairs by key,
//! either anywhere in a subtree or as a direct child of a known mapping, and
//! reading a scalar node's decoded text. Centralizes the one bit of grammar
//! knowledge that differs between block style (`- name: x`) and flow style
//! (`- { name: x }`): both end up as the same `block_mapping_pair`/`flow_pair`
//! node shape with `key`/`value` fields, so callers never branch on style.

use tree_sitter::Node;

use crate::query;

/// Every `key: value` pair directly inside a block or flow mapping node.
pub fn mapping_pairs<'a>(mapping: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = mapping.walk();
    mapping.children(&mut cursor).filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair")).collect()
}

pub fn pair_key<'a>(pair: &Node<'a>) -> Option<Node<'a>> {
    pair.child_by_field_name("key")
}

pub fn pair_value<'a>(pair: &Node<'a>) -> Option<Node<'a>> {
    pair.child_by_field_name("value")
}

/// Decodes a scalar node's text, stripping quotes from quoted scalars and
/// unescaping YAML's single-quote doubling (`''` -> `'`).
pub fn scalar_text(node: &Node, source: &[u8]) -> String {
    let text = query::text(node, source);
    match node.kind() {
        "single_quote_scalar" => text.trim_matches('\'').replace("''", "'"),
        "double_quote_scalar" => text.trim_matches('"').to_string(),
        _ => text.trim().to_string(),
    }
}

/// Unwraps a `block_node`/`flow_node` wrapper down to the mapping, sequence,
/// scalar, or alias it carries. tree-sitter-yaml wraps every value in one of
/// these node kinds, so callers would otherwise have to special-case the
/// wrapper at every call site.
pub fn unwrap_node(mut node: Node) -> Node {
    for _ in 0..4 {
        if !matches!(node.kind(), "block_node" | "flow_node") {
            break;
        }
        let mut cursor = node.walk();
        let Some(inner) = node.children(&mut cursor).find(|child| {
            matches!(
                child.kind(),
                "block_mapping"
                    | "block_sequence"
                    | "flow_mapping"
                    | "flow_sequence"
                    | "plain_scalar"
                    | "single_quote_scalar"
                    | "double_quote_scalar"
                    | "block_scalar"
                    | "alias"
            )
        }) else {
            break;
        };
        node = inner;
    }
    node
}

/// The first top-level `block_mapping`/`flow_mapping` in a document, i.e. the
/// root of a `key: value` YAML file as opposed to a top-level sequence or
/// scalar document.
pub fn root_mapping(root: Node) -> Option<Node> {
    query::find_all(root, |node| matches!(node.kind(), "block_mapping" | "flow_mapping")).into_iter().next()
}

/// The value of the pair directly inside `mapping` (not recursive) whose key
/// equals `key`, already unwrapped past its `block_node`/`flow_node` wrapper.
pub fn direct_value(mapping: Node, source: &[u8], key: &str) -> Option<Node> {
    mapping_pairs(mapping).into_iter().find_map(|pair| {
        let key_node = pair_key(&pair)?;
        if scalar_text(&key_node, source) != key {
            return None;
        }
        pair_value(&pair).map(unwrap_node)
    })
}

/// Every mapping pair anywhere under `root` whose key's scalar text equals
/// `key`, covering both block and flow mapping style in one pass — the
/// shape a "find every occurrence of this key, regardless of nesting" scan
/// needs (e.g. feature-flag names, DI tag names).
pub fn find_pairs_by_key<'a>(root: Node<'a>, source: &[u8], key: &str) -> Vec<Node<'a>> {
    query::find_all(root, |node| {
        matches!(node.kind(), "block_mapping_pair" | "flow_pair")
            && pair_key(node).is_some_and(|key_node| scalar_text(&key_node, source) == key)
    })
}

/// A flow or block sequence's scalar entries, each unwrapped past its node
/// wrapper (e.g. `methods: [GET, POST]`, `methods:\n  - GET\n  - POST`), or a
/// single-element list if `node` is itself already a scalar.
pub fn flow_scalars(node: Node, source: &[u8]) -> Vec<String> {
    if matches!(node.kind(), "plain_scalar" | "single_quote_scalar" | "double_quote_scalar") {
        return vec![scalar_text(&node, source)];
    }

    let mut cursor = node.walk();
    node.named_children(&mut cursor).map(|child| scalar_text(&unwrap_node(child), source)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_yaml::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn finds_name_pairs_in_block_and_flow_style() {
        let source = "flags:\n  - name: a\n  - { name: b }\n";
        let tree = parse(source);
        let bytes = source.as_bytes();

        let matches = find_pairs_by_key(tree.root_node(), bytes, "name");
        let names: Vec<String> =
            matches.iter().filter_map(|pair| pair_value(pair)).map(|value| scalar_text(&unwrap_node(value), bytes)).collect();

        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn direct_value_does_not_cross_into_nested_mappings() {
        let source = "a:\n  name: inner\nname: outer\n";
        let tree = parse(source);
        let bytes = source.as_bytes();
        let root = root_mapping(tree.root_node()).unwrap();

        let value = direct_value(root, bytes, "name").unwrap();
        assert_eq!(scalar_text(&value, bytes), "outer");
    }
}
