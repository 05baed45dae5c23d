//! Admin-component indexer: `Shopware.Component.register`/`.extend` calls in
//! the administration bundle's JS/TS entry points, recovering parent
//! relations and the component definition object's shape
//! (props/emits/methods/computed/slots) from the parsed tree.

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::js;
use shopware_lsp_syntax::patterns;
use shopware_lsp_syntax::tree::GrammarTree;
use tree_sitter::Node;

use crate::model::VueComponent;
use crate::model::VueComponentProp;

pub struct AdminComponentIndexer {
    components: FactStore<VueComponent>,
}

impl AdminComponentIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { components: FactStore::open(&cache_dir.join("admin_components.db"))? })
    }

    pub fn components(&self) -> &FactStore<VueComponent> {
        &self.components
    }

    fn ingest_js(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut rows = Vec::new();

        for (_call, method, names, definition) in patterns::find_js_component_registrations(tree.root_node(), bytes) {
            let Some(name) = names.first().cloned() else { continue };
            let parent = if method == "extend" { names.get(1).cloned() } else { None };
            rows.push((name.clone(), component_from_definition(name, parent, definition, bytes, path)));
        }

        self.components.put_batch(path, rows)
    }
}

fn component_from_definition(name: String, parent: Option<String>, definition: Option<Node>, source: &[u8], path: &Path) -> VueComponent {
    let props = definition.and_then(|object| js::direct_value(object, source, "props")).map(|props| extract_props(props, source)).unwrap_or_default();
    let emits = definition
        .and_then(|object| js::direct_value(object, source, "emits"))
        .filter(|value| value.kind() == "array")
        .map(|array| js::string_array_elements(array, source))
        .unwrap_or_default();
    let methods = definition
        .and_then(|object| js::direct_value(object, source, "methods"))
        .filter(|value| value.kind() == "object")
        .map(|object| js::entry_keys(object, source))
        .unwrap_or_default();
    let computed = definition
        .and_then(|object| js::direct_value(object, source, "computed"))
        .filter(|value| value.kind() == "object")
        .map(|object| js::entry_keys(object, source))
        .unwrap_or_default();
    let slots = definition
        .and_then(|object| js::direct_value(object, source, "slots"))
        .filter(|value| value.kind() == "array")
        .map(|array| js::string_array_elements(array, source))
        .unwrap_or_default();

    VueComponent {
        name,
        parent,
        props,
        emits,
        methods,
        computed,
        slots,
        defining_path: path.to_string_lossy().into_owned(),
        registration_path: path.to_string_lossy().into_owned(),
    }
}

/// `props: { title: { type: String, required: true, default: 'x' } }`, or
/// the shorthand `props: { title: String }`.
fn extract_props(props: Node, source: &[u8]) -> Vec<VueComponentProp> {
    if props.kind() != "object" {
        return Vec::new();
    }

    js::object_entries(props, source)
        .into_iter()
        .map(|(name, value)| {
            if value.kind() == "object" {
                let r#type = js::direct_value(value, source, "type").map(|node| js::property_key_text(&node, source));
                let required = js::direct_value(value, source, "required").is_some_and(|node| node.kind() == "true");
                let default = js::direct_value(value, source, "default").map(|node| js::property_key_text(&node, source));
                VueComponentProp { name, r#type, required, default }
            } else {
                VueComponentProp { name, r#type: Some(js::property_key_text(&value, source)), required: false, default: None }
            }
        })
        .collect()
}

impl Indexer for AdminComponentIndexer {
    fn id(&self) -> &'static str {
        "admin_component"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "ts"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.components.delete_path(path)?;

        if !path.to_string_lossy().contains("Resources/app/administration") {
            return Ok(());
        }

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };
        self.ingest_js(path, source, &grammar_tree.tree)
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.components.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.components.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.components.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "javascript", tree }
    }

    #[test]
    fn indexes_registered_component_with_props() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = AdminComponentIndexer::open(dir.path()).unwrap();

        let source = r#"
Shopware.Component.register('sw-foo', {
    template,
    props: {
        title: {
            type: String,
            required: true,
        },
    },
    emits: ['change'],
    methods: {
        onClick() {},
    },
});
"#;
        let tree = js_tree(source);
        indexer.ingest(Path::new("Resources/app/administration/src/module/sw-foo/index.js"), source, &tree).unwrap();

        let components = indexer.components.values("sw-foo");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].props.len(), 1);
        assert_eq!(components[0].props[0].name, "title");
        assert!(components[0].props[0].required);
        assert_eq!(components[0].emits, vec!["change".to_string()]);
        assert_eq!(components[0].methods, vec!["onClick".to_string()]);
    }

    #[test]
    fn indexes_shorthand_prop_type() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = AdminComponentIndexer::open(dir.path()).unwrap();

        let source = "Shopware.Component.register('sw-foo', { props: { title: String } });";
        let tree = js_tree(source);
        indexer.ingest(Path::new("Resources/app/administration/src/module/sw-foo/index.js"), source, &tree).unwrap();

        let components = indexer.components.values("sw-foo");
        assert_eq!(components[0].props[0].r#type.as_deref(), Some("String"));
        assert!(!components[0].props[0].required);
    }

    #[test]
    fn indexes_extended_component_with_parent() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = AdminComponentIndexer::open(dir.path()).unwrap();

        let source = "Shopware.Component.extend('sw-foo-child', 'sw-foo', {});";
        let tree = js_tree(source);
        indexer.ingest(Path::new("Resources/app/administration/src/module/sw-foo/index.js"), source, &tree).unwrap();

        let components = indexer.components.values("sw-foo-child");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].parent, Some("sw-foo".to_string()));
    }

    #[test]
    fn ignores_js_outside_administration() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = AdminComponentIndexer::open(dir.path()).unwrap();

        let source = "Shopware.Component.register('x', {});";
        let tree = js_tree(source);
        indexer.ingest(Path::new("Resources/app/storefront/src/plugin.js"), source, &tree).unwrap();

        assert!(indexer.components.values("x").is_empty());
    }
}
