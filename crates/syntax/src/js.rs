//! tree-sitter-javascript node-shape helpers for walking Vue Options-API
//! object literals (`props`/`emits`/`methods`/`computed`/`slots`), shared by
//! the admin-component indexer. An object literal's entries show up as two
//! different node shapes depending on how they were written — `key: value`
//! pairs and `name() { ... }` shorthand methods — so callers go through
//! [`object_entries`] rather than assuming one shape.

use tree_sitter::Node;

use crate::query;

/// One `key: value` or `key() {}` entry of an object literal, as `(key text,
/// value node)`. For a shorthand method the "value" is the method's own body
/// node, which callers only use to confirm a key exists, not to read a value.
pub fn object_entries<'a>(object: Node<'a>, source: &[u8]) -> Vec<(String, Node<'a>)> {
    let mut cursor = object.walk();
    object
        .named_children(&mut cursor)
        .filter_map(|child| match child.kind() {
            "pair" => {
                let key = child.child_by_field_name("key")?;
                let value = child.child_by_field_name("value")?;
                Some((property_key_text(&key, source), value))
            }
            "method_definition" => {
                let name = child.child_by_field_name("name")?;
                Some((property_key_text(&name, source), child))
            }
            _ => None,
        })
        .collect()
}

/// The text of a property key node, unquoting string keys (`"foo"` and `foo`
/// both yield `foo`).
pub fn property_key_text(key: &Node, source: &[u8]) -> String {
    let text = query::text(key, source);
    if key.kind() == "string" { text.trim_matches(['\'', '"']).to_string() } else { text.to_string() }
}

/// The value node of the first `key: value` or shorthand-method entry of
/// `object` whose key equals `key`.
pub fn direct_value<'a>(object: Node<'a>, source: &[u8], key: &str) -> Option<Node<'a>> {
    object_entries(object, source).into_iter().find(|(entry_key, _)| entry_key == key).map(|(_, value)| value)
}

/// Every entry key of an object literal — used for `methods: { ... }` and
/// `computed: { ... }` sections, where only the names matter.
pub fn entry_keys(object: Node, source: &[u8]) -> Vec<String> {
    object_entries(object, source).into_iter().map(|(key, _)| key).collect()
}

/// Every string-literal element of an `array` node, used for
/// `emits: ['a', 'b']` and `slots: ['default']`.
pub fn string_array_elements(array: Node, source: &[u8]) -> Vec<String> {
    let mut cursor = array.walk();
    array
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "string")
        .map(|child| property_key_text(&child, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    fn first_object(tree: &tree_sitter::Tree) -> Node {
        query::find_all(tree.root_node(), |node| node.kind() == "object").into_iter().next().unwrap()
    }

    #[test]
    fn reads_pairs_and_shorthand_methods() {
        let source = "const x = { title: 'Title', onClick() {} };";
        let tree = parse(source);
        let bytes = source.as_bytes();
        let object = first_object(&tree);

        assert_eq!(direct_value(object, bytes, "title").map(|node| query::text(&node, bytes).to_string()), Some("'Title'".to_string()));
        assert!(entry_keys(object, bytes).contains(&"onClick".to_string()));
    }

    #[test]
    fn reads_string_array_elements() {
        let source = "const x = { emits: ['change', 'close'] };";
        let tree = parse(source);
        let bytes = source.as_bytes();
        let object = first_object(&tree);

        let emits = direct_value(object, bytes, "emits").unwrap();
        assert_eq!(string_array_elements(emits, bytes), vec!["change".to_string(), "close".to_string()]);
    }
}
