//! Extension indexer: PHP classes extending the framework's bundle base
//! class (plugins) and `manifest.xml` apps, both recorded as [`Extension`].

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::query;
use shopware_lsp_syntax::tree::GrammarTree;
use shopware_lsp_syntax::xml;

use crate::model::Extension;
use crate::model::ExtensionKind;
use crate::model::ExtensionMeta;

pub struct ExtensionIndexer {
    extensions: FactStore<Extension>,
}

impl ExtensionIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { extensions: FactStore::open(&cache_dir.join("extension.db"))? })
    }

    pub fn extensions(&self) -> &FactStore<Extension> {
        &self.extensions
    }

    /// Walks every `class_declaration`'s `base_clause` looking for a parent
    /// class named (possibly fully qualified) `Plugin`.
    fn ingest_php(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();

        for class in query::find_all(tree.root_node(), |node| query::kind(node, "class_declaration")) {
            let Some(base_clause) = class.child_by_field_name("base_clause") else { continue };
            let Some(parent) = base_clause.named_child(0) else { continue };
            if query::text(&parent, bytes).rsplit('\\').next() != Some("Plugin") {
                continue;
            }

            let Some(name_node) = class.child_by_field_name("name") else { continue };
            let name = query::text(&name_node, bytes).to_string();
            let root_path = path.parent().map(|parent| parent.to_string_lossy().into_owned()).unwrap_or_default();

            return self.extensions.put(path, name.clone(), Extension { name, kind: ExtensionKind::Bundle, root_path, meta: None });
        }

        Ok(())
    }

    /// Reads the `<meta>` element's child elements (`<name>`, `<label>`, ...)
    /// by tag name rather than a whole-document regex.
    fn ingest_manifest(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();

        let Some(meta) = xml::elements_by_name(tree.root_node(), "meta", bytes).into_iter().next() else {
            return Ok(());
        };

        let field = |tag: &str| xml::child_elements(&meta, tag, bytes).into_iter().next().map(|node| xml::text_content(&node, bytes)).unwrap_or_default();

        let name = field("name");
        if name.is_empty() {
            return Ok(());
        }

        let root_path = path.parent().map(|parent| parent.to_string_lossy().into_owned()).unwrap_or_default();
        let meta_record = ExtensionMeta {
            label: field("label"),
            description: field("description"),
            author: field("author"),
            copyright: field("copyright"),
            version: field("version"),
            license: field("license"),
        };

        self.extensions.put(path, name.clone(), Extension { name, kind: ExtensionKind::App, root_path, meta: Some(meta_record) })
    }
}

impl Indexer for ExtensionIndexer {
    fn id(&self) -> &'static str {
        "extension"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php", "xml"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.extensions.delete_path(path)?;

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("php") => self.ingest_php(path, source, &grammar_tree.tree),
            Some("xml") if path.file_name().and_then(|name| name.to_str()) == Some("manifest.xml") => {
                self.ingest_manifest(path, source, &grammar_tree.tree)
            }
            _ => Ok(()),
        }
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.extensions.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.extensions.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.extensions.close()
    }
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

    fn xml_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_xml::LANGUAGE_XML.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "xml", tree }
    }

    #[test]
    fn indexes_plugin_bundle_class() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ExtensionIndexer::open(dir.path()).unwrap();

        let source = "<?php\nclass MyPlugin extends Plugin {}\n";
        let tree = php_tree(source);
        indexer.ingest(Path::new("plugins/MyPlugin/src/MyPlugin.php"), source, &tree).unwrap();

        let extensions = indexer.extensions.values("MyPlugin");
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].kind, ExtensionKind::Bundle);
    }

    #[test]
    fn indexes_plugin_bundle_class_with_qualified_parent() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ExtensionIndexer::open(dir.path()).unwrap();

        let source = "<?php\nclass MyPlugin extends \\Shopware\\Core\\Framework\\Plugin {}\n";
        let tree = php_tree(source);
        indexer.ingest(Path::new("plugins/MyPlugin/src/MyPlugin.php"), source, &tree).unwrap();

        assert_eq!(indexer.extensions.values("MyPlugin").len(), 1);
    }

    #[test]
    fn indexes_manifest_meta() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ExtensionIndexer::open(dir.path()).unwrap();

        let source = r#"<manifest>
    <meta>
        <name>MyApp</name>
        <label>My App</label>
        <version>1.0.0</version>
    </meta>
</manifest>"#;
        let tree = xml_tree(source);
        indexer.ingest(Path::new("apps/MyApp/manifest.xml"), source, &tree).unwrap();

        let extensions = indexer.extensions.values("MyApp");
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].kind, ExtensionKind::App);
        assert_eq!(extensions[0].meta.as_ref().unwrap().label, "My App");
    }
}
