//! Theme-config indexer: `theme.json`'s `config.fields` object, one fact per
//! field (type, default, localized labels, block, order, SCSS-compiled flag).

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::tree::GrammarTree;
use tree_sitter::Node;

use crate::json_tree;
use crate::model::ThemeConfigField;

pub struct ThemeConfigIndexer {
    fields: FactStore<ThemeConfigField>,
}

impl ThemeConfigIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { fields: FactStore::open(&cache_dir.join("theme_config.db"))? })
    }

    pub fn fields(&self) -> &FactStore<ThemeConfigField> {
        &self.fields
    }

    fn ingest_theme_json(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();

        let Some(root) = json_tree::root_object(tree) else { return Ok(()) };
        let Some(fields) = json_tree::walk_path(root, bytes, &["config", "fields"]) else {
            return Ok(());
        };

        let mut rows = Vec::new();

        for (key_node, field) in json_tree::pairs(fields) {
            let key = json_tree::string_text(&key_node, bytes);
            let line = key_node.start_position().row as u32 + 1;

            let labels = json_tree::direct_value(field, bytes, "label")
                .map(|labels_node| {
                    json_tree::pairs(labels_node)
                        .into_iter()
                        .map(|(locale, text)| (json_tree::string_text(&locale, bytes), json_tree::leaf_text(&text, bytes)))
                        .collect()
                })
                .unwrap_or_default();

            let r#type = json_tree::direct_value(field, bytes, "type")
                .map(|node| json_tree::string_text(&node, bytes))
                .unwrap_or_else(|| "unknown".to_string());
            let default = json_tree::direct_value(field, bytes, "value").map(|node| json_tree::leaf_text(&node, bytes));
            let block = json_tree::direct_value(field, bytes, "block").map(|node| json_tree::string_text(&node, bytes));
            let order = json_tree::direct_value(field, bytes, "order")
                .and_then(|node| json_tree::leaf_text(&node, bytes).parse::<i64>().ok());
            let scss = json_tree::direct_value(field, bytes, "scss").is_some_and(|node| is_true(&node));

            rows.push((
                key.clone(),
                ThemeConfigField { key, labels, r#type, default, block, order, scss, source_path: path.to_string_lossy().into_owned(), line },
            ));
        }

        self.fields.put_batch(path, rows)
    }
}

fn is_true(node: &Node) -> bool {
    node.kind() == "true"
}

impl Indexer for ThemeConfigIndexer {
    fn id(&self) -> &'static str {
        "theme_config"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.fields.delete_path(path)?;

        if path.file_name().and_then(|name| name.to_str()) != Some("theme.json") {
            return Ok(());
        }

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };
        self.ingest_theme_json(path, source, &grammar_tree.tree)
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.fields.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.fields.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.fields.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_tree_of(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_json::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "json", tree }
    }

    #[test]
    fn indexes_theme_config_fields() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ThemeConfigIndexer::open(dir.path()).unwrap();

        let source = r#"{
    "config": {
        "fields": {
            "sw-color-brand-primary": {
                "label": { "en-GB": "Primary colour", "de-DE": "Primärfarbe" },
                "type": "color",
                "value": "#008490",
                "block": "themeColors",
                "order": 100,
                "scss": true
            }
        }
    }
}"#;
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("theme.json"), source, &tree).unwrap();

        let fields = indexer.fields.values("sw-color-brand-primary");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].r#type, "color");
        assert!(fields[0].scss);
        assert_eq!(fields[0].order, Some(100));
        assert!(fields[0].labels.iter().any(|(locale, _)| locale == "en-GB"));
    }

    #[test]
    fn ignores_non_theme_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = ThemeConfigIndexer::open(dir.path()).unwrap();

        let source = r#"{"a":1}"#;
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("other.json"), source, &tree).unwrap();
        assert!(indexer.fields.all_values().is_empty());
    }
}
