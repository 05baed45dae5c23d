//! The handful of framework-specific shapes every consumer of a parsed tree
//! needs to recognize, expressed once here in terms of [`crate::query`] (and,
//! for XML, [`crate::xml`]) so indexers and LSP providers never duplicate a
//! grammar-kind string.
//!
//! Twig's own patterns (blocks, `extends`, the version-comment marker,
//! `sw_icon` arguments) live in [`crate::twig`] instead, since they operate
//! on the bespoke Twig tree rather than a `tree_sitter::Node`.

use tree_sitter::Node;

use crate::query;
use crate::xml;

/// A PHP `$this->$method(...)` call. Returns the literal text of the first
/// argument when it's a plain string, e.g. `$this->trans('snippet.key')` or
/// `$this->redirectToRoute('frontend.home')`.
pub fn find_php_method_calls<'a>(root: Node<'a>, source: &'a [u8], method: &str) -> Vec<(Node<'a>, Option<String>)> {
    let is_member_call = |node: &Node<'a>| query::kind(node, "member_call_expression");
    let calls_method = |node: &Node<'a>| {
        query::has_child(node, "name")
            && query::child_of_kind(node, "name").map(|name| query::text(&name, source) == method).unwrap_or(false)
    };
    let predicate = query::and(is_member_call, calls_method);

    query::find_all(root, predicate)
        .into_iter()
        .map(|call| {
            let argument = query::child_of_kind(&call, "arguments")
                .and_then(|args| query::child_of_kind(&args, "argument"))
                .and_then(|arg| query::child_of_kind(&arg, "string"))
                .map(|literal| strip_php_string_quotes(query::text(&literal, source)));

            (call, argument)
        })
        .collect()
}

/// A PHP `$this->trans('snippet.key', ...)` call (or `$this->trans($key)`).
pub fn find_php_trans_calls<'a>(root: Node<'a>, source: &'a [u8]) -> Vec<(Node<'a>, Option<String>)> {
    find_php_method_calls(root, source, "trans")
}

/// A PHP `$this->redirectToRoute('route.name', ...)` call.
pub fn find_php_redirect_to_route_calls<'a>(root: Node<'a>, source: &'a [u8]) -> Vec<(Node<'a>, Option<String>)> {
    find_php_method_calls(root, source, "redirectToRoute")
}

/// An XML `<argument type="service" id="..."/>` element used to wire service
/// dependencies in `services.xml`. Returns the referenced service id.
pub fn find_xml_service_arguments<'a>(root: Node<'a>, source: &'a [u8]) -> Vec<(Node<'a>, String)> {
    xml::elements_by_name(root, "argument", source)
        .into_iter()
        .filter(|element| xml::attribute_value(element, source, "type").as_deref() == Some("service"))
        .filter_map(|element| xml::attribute_value(&element, source, "id").map(|id| (element, id)))
        .collect()
}

/// A `Shopware.Component.register('name', {...})` or
/// `Shopware.Component.extend('name', 'parent', {...})` call in an admin
/// module's entry-point JavaScript. Returns the call, its method name, every
/// string literal passed positionally (component name, then parent name for
/// `extend`), and the trailing object literal defining the component, if any.
pub fn find_js_component_registrations<'a>(
    root: Node<'a>,
    source: &'a [u8],
) -> Vec<(Node<'a>, &'static str, Vec<String>, Option<Node<'a>>)> {
    let is_register = |node: &Node<'a>| is_component_method_call(node, source, "register");
    let is_extend = |node: &Node<'a>| is_component_method_call(node, source, "extend");
    let is_candidate = query::and(|node: &Node<'a>| query::kind(node, "call_expression"), query::or(is_register, is_extend));
    // A registration call is a statement, never itself an argument to another
    // call (e.g. a nested helper invocation that happens to share this shape).
    let is_statement_level = |node: &Node<'a>| query::has_child(node, "arguments") && query::ancestor(node, "call_expression").is_none();
    let predicate = query::and(is_candidate, is_statement_level);

    query::find_all(root, predicate)
        .into_iter()
        .filter_map(|call| {
            let callee = call.child_by_field_name("function")?;
            let property = callee.child_by_field_name("property")?;
            let method: &'static str = match query::text(&property, source) {
                "register" => "register",
                "extend" => "extend",
                _ => return None,
            };

            let arguments = call.child_by_field_name("arguments")?;
            let mut cursor = arguments.walk();
            let children: Vec<_> = arguments.named_children(&mut cursor).collect();

            let names = children
                .iter()
                .filter(|child| query::kind(child, "string"))
                .map(|child| strip_js_string_quotes(query::text(child, source)))
                .collect();

            let definition = children.into_iter().filter(|child| query::kind(child, "object")).next_back();

            Some((call, method, names, definition))
        })
        .collect()
}

fn is_component_method_call(call: &Node, source: &[u8], method: &str) -> bool {
    let Some(callee) = call.child_by_field_name("function").filter(|node| query::kind(node, "member_expression")) else {
        return false;
    };
    let Some(property) = callee.child_by_field_name("property") else { return false };
    let Some(object) = callee.child_by_field_name("object") else { return false };

    query::text(&property, source) == method && query::text(&object, source).starts_with("Shopware.Component")
}

/// A JS/Vue `this.$t('snippet.key')` or `this.$tc('snippet.key', ...)` call,
/// the admin-side equivalent of [`find_php_trans_calls`].
pub fn find_admin_translation_calls<'a>(root: Node<'a>, source: &'a [u8]) -> Vec<(Node<'a>, Option<String>)> {
    let calls_t = |node: &Node<'a>| member_property_text(node, source).as_deref() == Some("$t");
    let calls_tc = |node: &Node<'a>| member_property_text(node, source).as_deref() == Some("$tc");
    let predicate = query::and(|node: &Node<'a>| query::kind(node, "call_expression"), query::or(calls_t, calls_tc));

    query::find_all(root, predicate)
        .into_iter()
        .map(|call| {
            let key = call
                .child_by_field_name("arguments")
                .and_then(|args| query::child_of_kind(&args, "string"))
                .map(|literal| strip_js_string_quotes(query::text(&literal, source)));

            (call, key)
        })
        .collect()
}

fn member_property_text(call: &Node, source: &[u8]) -> Option<String> {
    let callee = call.child_by_field_name("function").filter(|node| query::kind(node, "member_expression"))?;
    let property = callee.child_by_field_name("property")?;
    Some(query::text(&property, source).to_string())
}

fn strip_php_string_quotes(literal: &str) -> String {
    literal.trim_matches(|c| c == '\'' || c == '"').to_string()
}

fn strip_js_string_quotes(literal: &str) -> String {
    literal.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_php(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    fn parse_js(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    fn parse_xml(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_xml::LANGUAGE_XML.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn finds_php_trans_call_key() {
        let source = "<?php $this->trans('checkout.confirm');";
        let tree = parse_php(source);
        let matches = find_php_trans_calls(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1.as_deref(), Some("checkout.confirm"));
    }

    #[test]
    fn finds_redirect_to_route_call() {
        let source = "<?php $this->redirectToRoute('frontend.home');";
        let tree = parse_php(source);
        let matches = find_php_redirect_to_route_calls(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1.as_deref(), Some("frontend.home"));
    }

    #[test]
    fn finds_xml_service_arguments() {
        let source = r#"<service id="x"><argument type="service" id="Foo"/></service>"#;
        let tree = parse_xml(source);
        let matches = find_xml_service_arguments(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, "Foo");
    }

    #[test]
    fn finds_component_registration_with_definition() {
        let source = "Shopware.Component.register('sw-foo', { props: {} });";
        let tree = parse_js(source);
        let matches = find_js_component_registrations(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, "register");
        assert_eq!(matches[0].2, vec!["sw-foo".to_string()]);
        assert!(matches[0].3.is_some());
    }

    #[test]
    fn finds_component_extension_with_two_names() {
        let source = "Shopware.Component.extend('sw-foo-child', 'sw-foo', {});";
        let tree = parse_js(source);
        let matches = find_js_component_registrations(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, "extend");
        assert_eq!(matches[0].2, vec!["sw-foo-child".to_string(), "sw-foo".to_string()]);
    }

    #[test]
    fn finds_admin_translation_call() {
        let source = "this.$tc('sw-foo.title', 2);";
        let tree = parse_js(source);
        let matches = find_admin_translation_calls(tree.root_node(), source.as_bytes());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1.as_deref(), Some("sw-foo.title"));
    }
}
