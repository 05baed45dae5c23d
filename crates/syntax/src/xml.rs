//! tree-sitter-xml node-shape helpers shared by the XML-backed domain
//! indexers (service, extension): locating elements by tag name, reading an
//! attribute's decoded value, and reading an element's direct children or
//! text content. Node kinds follow the grammar's XML-spec-production naming
//! (`STag`, `ETag`, `EmptyElemTag`, `Attribute`, `AttValue`, `Name`,
//! `CharData`) alongside the grammar's own lower-case rule names (`element`,
//! `content`).

use tree_sitter::Node;

use crate::query;

fn start_tag<'a>(element: &Node<'a>) -> Option<Node<'a>> {
    let mut cursor = element.walk();
    element.children(&mut cursor).find(|child| matches!(child.kind(), "STag" | "EmptyElemTag"))
}

/// The tag name of an `element` node, e.g. `"service"` for `<service .../>`.
pub fn element_name(element: &Node, source: &[u8]) -> Option<String> {
    let tag = start_tag(element)?;
    let mut cursor = tag.walk();
    tag.children(&mut cursor).find(|child| child.kind() == "Name").map(|name| query::text(&name, source).to_string())
}

/// The decoded value of `element`'s attribute named `attribute_name`, or
/// `None` if the attribute is absent.
pub fn attribute_value(element: &Node, source: &[u8], attribute_name: &str) -> Option<String> {
    let tag = start_tag(element)?;
    let mut cursor = tag.walk();
    tag.children(&mut cursor).filter(|child| child.kind() == "Attribute").find_map(|attribute| {
        let mut attr_cursor = attribute.walk();
        let children: Vec<_> = attribute.children(&mut attr_cursor).collect();
        let name = children.iter().find(|child| child.kind() == "Name")?;
        if query::text(name, source) != attribute_name {
            return None;
        }
        let value = children.iter().find(|child| child.kind() == "AttValue")?;
        Some(query::text(value, source).trim_matches(|c| c == '\'' || c == '"').to_string())
    })
}

/// The direct child elements of `element` (i.e. inside its `content`, not
/// nested any deeper) whose tag name matches `tag_name`.
pub fn child_elements<'a>(element: &Node<'a>, tag_name: &str, source: &[u8]) -> Vec<Node<'a>> {
    let mut cursor = element.walk();
    let Some(content) = element.children(&mut cursor).find(|child| child.kind() == "content") else {
        return Vec::new();
    };

    let mut content_cursor = content.walk();
    content
        .children(&mut content_cursor)
        .filter(|child| child.kind() == "element" && element_name(child, source).as_deref() == Some(tag_name))
        .collect()
}

/// The concatenated `CharData` text content directly inside `element`,
/// trimmed — the text of a leaf element like `<name>MyApp</name>`.
pub fn text_content(element: &Node, source: &[u8]) -> String {
    let mut cursor = element.walk();
    let Some(content) = element.children(&mut cursor).find(|child| child.kind() == "content") else {
        return String::new();
    };

    let mut content_cursor = content.walk();
    content
        .children(&mut content_cursor)
        .filter(|child| child.kind() == "CharData")
        .map(|child| query::text(&child, source))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Every descendant `element` node with tag name `tag_name`, regardless of
/// nesting depth.
pub fn elements_by_name<'a>(root: Node<'a>, tag_name: &str, source: &[u8]) -> Vec<Node<'a>> {
    query::find_all(root, |node| node.kind() == "element" && element_name(node, source).as_deref() == Some(tag_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_xml::LANGUAGE_XML.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn reads_attribute_values_and_nested_tags() {
        let source = r#"<container>
    <service id="Foo" class="FooImpl">
        <tag name="foo.tag"/>
    </service>
</container>"#;
        let tree = parse(source);
        let bytes = source.as_bytes();

        let services = elements_by_name(tree.root_node(), "service", bytes);
        assert_eq!(services.len(), 1);
        assert_eq!(attribute_value(&services[0], bytes, "id").as_deref(), Some("Foo"));
        assert_eq!(attribute_value(&services[0], bytes, "class").as_deref(), Some("FooImpl"));

        let tags = child_elements(&services[0], "tag", bytes);
        assert_eq!(tags.len(), 1);
        assert_eq!(attribute_value(&tags[0], bytes, "name").as_deref(), Some("foo.tag"));
    }

    #[test]
    fn reads_text_content() {
        let source = "<meta><name>MyApp</name></meta>";
        let tree = parse(source);
        let bytes = source.as_bytes();

        let meta = elements_by_name(tree.root_node(), "meta", bytes);
        let name = child_elements(&meta[0], "name", bytes);
        assert_eq!(text_content(&name[0], bytes), "MyApp");
    }
}
