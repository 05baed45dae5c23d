//! Small composable predicates and a depth-first walk over `tree_sitter::Node`,
//! the common vocabulary [`crate::patterns`] builds the framework-specific
//! patterns from.

use tree_sitter::Node;

/// `true` if `node`'s grammar kind is exactly `kind`.
pub fn kind(node: &Node, kind_name: &str) -> bool {
    node.kind() == kind_name
}

/// The UTF-8 text a node spans, given the original source bytes.
pub fn text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

/// `true` if any direct child of `node` has grammar kind `kind_name`.
pub fn has_child(node: &Node, kind_name: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind_name)
}

/// The first direct child with grammar kind `kind_name`, if any.
pub fn child_of_kind<'a>(node: &Node<'a>, kind_name: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind_name)
}

/// The nearest ancestor (not including `node` itself) with grammar kind `kind_name`.
pub fn ancestor<'a>(node: &Node<'a>, kind_name: &str) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if candidate.kind() == kind_name {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Depth-first pre-order walk over every descendant of `root` (`root` itself included)
/// satisfying `predicate`.
pub fn find_all<'a>(root: Node<'a>, predicate: impl Fn(&Node<'a>) -> bool) -> Vec<Node<'a>> {
    let mut matches = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if predicate(&node) {
            matches.push(node);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor).collect::<Vec<_>>().into_iter().rev() {
            stack.push(child);
        }
    }

    matches
}

/// Combines two predicates with logical AND.
pub fn and<'a>(a: impl Fn(&Node<'a>) -> bool, b: impl Fn(&Node<'a>) -> bool) -> impl Fn(&Node<'a>) -> bool {
    move |node| a(node) && b(node)
}

/// Combines two predicates with logical OR.
pub fn or<'a>(a: impl Fn(&Node<'a>) -> bool, b: impl Fn(&Node<'a>) -> bool) -> impl Fn(&Node<'a>) -> bool {
    move |node| a(node) || b(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_php(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn find_all_collects_every_matching_node() {
        let source = "<?php $a = 1; $b = 2;";
        let tree = parse_php(source);
        let matches = find_all(tree.root_node(), |node| kind(node, "variable_name"));
        assert_eq!(matches.len(), 2);
    }
}
