//! Route indexer: route definitions from PHP `#[Route(...)]` attributes and
//! YAML route files, plus the separate route-usage indexer recording call
//! sites (`redirectToRoute`, Twig `path`/`url`/`seoUrl`).

use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::patterns;
use shopware_lsp_syntax::query;
use shopware_lsp_syntax::tree::GrammarTree;
use shopware_lsp_syntax::twig::TwigTree;
use shopware_lsp_syntax::yaml;
use tree_sitter::Node;

use crate::model::Route;
use crate::model::RouteUsage;

pub struct RouteIndexer {
    routes: FactStore<Route>,
}

impl RouteIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { routes: FactStore::open(&cache_dir.join("routes.db"))? })
    }

    pub fn routes(&self) -> &FactStore<Route> {
        &self.routes
    }

    /// Walks every `class_declaration`'s `method_declaration`s looking for a
    /// `#[Route(...)]` attribute, reading its named arguments off the
    /// attribute's `arguments` node rather than regexing the attribute text.
    fn ingest_php(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut rows = Vec::new();

        for class in query::find_all(tree.root_node(), |node| query::kind(node, "class_declaration")) {
            let class_name =
                class.child_by_field_name("name").map(|node| query::text(&node, bytes).to_string()).unwrap_or_default();
            let Some(body) = class.child_by_field_name("body") else { continue };

            for method in query::find_all(body, |node| query::kind(node, "method_declaration")) {
                let method_name = method.child_by_field_name("name").map(|node| query::text(&node, bytes)).unwrap_or_default();

                for attribute_list in query::find_all(method, |node| query::kind(node, "attribute_list")) {
                    for attribute in query::find_all(attribute_list, |node| query::kind(node, "attribute")) {
                        let Some(name_node) = attribute.child_by_field_name("name") else { continue };
                        if query::text(&name_node, bytes) != "Route" {
                            continue;
                        }

                        let Some(mut route) = route_from_attribute(&attribute, bytes, &class_name, method_name) else { continue };
                        route.source_path = path.to_string_lossy().into_owned();
                        rows.push((route.name.clone(), route));
                    }
                }
            }
        }

        self.routes.put_batch(path, rows)
    }

    /// Each top-level mapping pair is a route name mapping to a `path`/
    /// `controller`/`methods` mapping, read as direct children so a nested
    /// `path:`-like key belonging to some unrelated structure never leaks in.
    fn ingest_yaml(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut rows = Vec::new();

        let Some(root_mapping) = yaml::root_mapping(tree.root_node()) else {
            return self.routes.put_batch(path, rows);
        };

        for pair in yaml::mapping_pairs(root_mapping) {
            let Some(key_node) = yaml::pair_key(&pair) else { continue };
            let name = yaml::scalar_text(&key_node, bytes);
            let Some(value) = yaml::pair_value(&pair).map(yaml::unwrap_node) else { continue };
            if !matches!(value.kind(), "block_mapping" | "flow_mapping") {
                continue;
            }

            let route_path = yaml::direct_value(value, bytes, "path").map(|node| yaml::scalar_text(&node, bytes)).unwrap_or_default();
            if route_path.is_empty() {
                continue;
            }

            let controller =
                yaml::direct_value(value, bytes, "controller").map(|node| yaml::scalar_text(&node, bytes)).unwrap_or_default();
            let methods = yaml::direct_value(value, bytes, "methods").map(|node| yaml::flow_scalars(node, bytes)).unwrap_or_default();

            let line = key_node.start_position().row as u32 + 1;
            rows.push((
                name.clone(),
                Route {
                    name,
                    methods,
                    parameters: extract_path_parameters(&route_path),
                    path: route_path,
                    controller,
                    source_path: path.to_string_lossy().into_owned(),
                    line,
                },
            ));
        }

        self.routes.put_batch(path, rows)
    }
}

/// Reads a `#[Route(...)]` attribute's `path`, `name`, and `methods` named
/// arguments (falling back to the first positional string for `path`, PHP's
/// shorthand `#[Route('/foo', name: '...')]` form).
fn route_from_attribute(attribute: &Node, source: &[u8], class_name: &str, method_name: &str) -> Option<Route> {
    let arguments = attribute.child_by_field_name("arguments")?;

    let mut route_name = String::new();
    let mut route_path = String::new();
    let mut methods = Vec::new();
    let mut positional = Vec::new();

    for argument in query::find_all(arguments, |node| query::kind(node, "argument")) {
        let Some(value_node) = argument.child_by_field_name("value") else { continue };
        let argument_name = argument.child_by_field_name("name").map(|node| query::text(&node, source));

        match argument_name.as_deref() {
            Some("name") => route_name = string_literal_text(&value_node, source),
            Some("path") => route_path = string_literal_text(&value_node, source),
            Some("methods") => {
                methods = query::find_all(value_node, |node| query::kind(node, "string"))
                    .iter()
                    .map(|node| string_literal_text(node, source))
                    .collect();
            }
            None => positional.push(string_literal_text(&value_node, source)),
            _ => {}
        }
    }

    if route_path.is_empty() {
        route_path = positional.into_iter().next().unwrap_or_default();
    }
    if route_name.is_empty() {
        return None;
    }

    Some(Route {
        name: route_name,
        methods,
        parameters: extract_path_parameters(&route_path),
        path: route_path,
        controller: format!("{class_name}::{method_name}"),
        source_path: String::new(),
        line: attribute.start_position().row as u32 + 1,
    })
}

fn string_literal_text(node: &Node, source: &[u8]) -> String {
    query::text(node, source).trim_matches(|c| c == '\'' || c == '"').to_string()
}

fn extract_path_parameters(path_template: &str) -> Vec<String> {
    static PARAMETER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));
    PARAMETER.captures_iter(path_template).map(|c| c[1].to_string()).collect()
}

impl Indexer for RouteIndexer {
    fn id(&self) -> &'static str {
        "route"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php", "yml", "yaml"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.routes.delete_path(path)?;

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("php") => self.ingest_php(path, source, &grammar_tree.tree),
            Some("yml" | "yaml") => self.ingest_yaml(path, source, &grammar_tree.tree),
            _ => Ok(()),
        }
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.routes.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.routes.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.routes.close()
    }
}

/// Records call sites of `redirectToRoute(...)` in PHP and `path`/`url`/
/// `seoUrl` function calls in Twig.
pub struct RouteUsageIndexer {
    usages: FactStore<RouteUsage>,
}

impl RouteUsageIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { usages: FactStore::open(&cache_dir.join("route_usage.db"))? })
    }

    pub fn usages(&self) -> &FactStore<RouteUsage> {
        &self.usages
    }
}

impl Indexer for RouteUsageIndexer {
    fn id(&self) -> &'static str {
        "route_usage"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php", "twig"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.usages.delete_path(path)?;

        let mut rows = Vec::new();

        if let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() {
            for (call, route_name) in patterns::find_php_redirect_to_route_calls(grammar_tree.tree.root_node(), source.as_bytes()) {
                let Some(route_name) = route_name else { continue };
                let line = call.start_position().row as u32 + 1;
                rows.push((route_name.clone(), RouteUsage { route_name, file: path.to_string_lossy().into_owned(), line }));
            }
        } else if let Some(twig_tree) = tree.as_any().downcast_ref::<TwigTree>() {
            for call in twig_tree.functions() {
                if matches!(call.name.as_str(), "path" | "url" | "seoUrl") {
                    // The route name is the call's first string argument; since we
                    // only tokenize call names (not full argument lists), we recover
                    // it from the raw output tag text around the call's span.
                    if let Some(name) = first_string_argument_after(source, call.span.end) {
                        rows.push((name.clone(), RouteUsage { route_name: name, file: path.to_string_lossy().into_owned(), line: call.line }));
                    }
                }
            }
        }

        self.usages.put_batch(path, rows)
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.usages.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.usages.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.usages.close()
    }
}

fn first_string_argument_after(source: &str, offset: usize) -> Option<String> {
    static STRING_ARG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\s*\(\s*['"]([^'"]+)['"]"#).expect("valid regex"));
    let tail = source.get(offset..offset + 200.min(source.len() - offset))?;
    STRING_ARG.captures(tail).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "php", tree }
    }

    fn yaml_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_yaml::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "yaml", tree }
    }

    #[test]
    fn indexes_php_route_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = RouteIndexer::open(dir.path()).unwrap();

        let source = r#"<?php
class FooController {
    #[Route(path: '/foo/{id}', name: 'frontend.foo', methods: ['GET'])]
    public function fooAction() {}
}
"#;
        let tree = php_tree(source);
        indexer.ingest(Path::new("FooController.php"), source, &tree).unwrap();

        let routes = indexer.routes.values("frontend.foo");
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/foo/{id}");
        assert_eq!(routes[0].parameters, vec!["id"]);
        assert_eq!(routes[0].methods, vec!["GET"]);
        assert_eq!(routes[0].controller, "FooController::fooAction");
    }

    #[test]
    fn indexes_yaml_route() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = RouteIndexer::open(dir.path()).unwrap();

        let source = "frontend.checkout.confirm.page:\n    path: /checkout/confirm\n    controller: Shopware\\Storefront\\Controller\\CheckoutController::confirmPage\n    methods: [GET]\n";
        let tree = yaml_tree(source);
        indexer.ingest(Path::new("routes.yaml"), source, &tree).unwrap();

        let routes = indexer.routes.values("frontend.checkout.confirm.page");
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/checkout/confirm");
        assert_eq!(routes[0].methods, vec!["GET"]);
    }

    #[test]
    fn indexes_redirect_to_route_usage() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = RouteUsageIndexer::open(dir.path()).unwrap();

        let source = "<?php\nclass C { public function a() { $this->redirectToRoute('frontend.home'); } }\n";
        let tree = php_tree(source);
        indexer.ingest(Path::new("C.php"), source, &tree).unwrap();

        let usages = indexer.usages.values("frontend.home");
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].line, 2);
    }
}
