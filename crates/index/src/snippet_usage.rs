//! Snippet-usage indexer: records every call site that references a snippet
//! key — PHP `$this->trans('key')` and admin `this.$t('key')`/`this.$tc('key')`
//! — the snippet equivalent of [`crate::route::RouteUsageIndexer`].

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::patterns;
use shopware_lsp_syntax::tree::GrammarTree;

use crate::model::SnippetUsage;

pub struct SnippetUsageIndexer {
    usages: FactStore<SnippetUsage>,
}

impl SnippetUsageIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { usages: FactStore::open(&cache_dir.join("snippet_usage.db"))? })
    }

    pub fn usages(&self) -> &FactStore<SnippetUsage> {
        &self.usages
    }
}

impl Indexer for SnippetUsageIndexer {
    fn id(&self) -> &'static str {
        "snippet_usage"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php", "js", "ts"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.usages.delete_path(path)?;

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };
        let bytes = source.as_bytes();

        let calls = match grammar_tree.language {
            "php" => patterns::find_php_trans_calls(grammar_tree.tree.root_node(), bytes),
            "javascript" | "typescript" => patterns::find_admin_translation_calls(grammar_tree.tree.root_node(), bytes),
            _ => return Ok(()),
        };

        let rows = calls
            .into_iter()
            .filter_map(|(call, key)| {
                let key = key?;
                let line = call.start_position().row as u32 + 1;
                Some((key.clone(), SnippetUsage { key, file: path.to_string_lossy().into_owned(), line }))
            })
            .collect();

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

#[cfg(test)]
mod tests {
    use super::*;

    fn php_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "php", tree }
    }

    fn js_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "javascript", tree }
    }

    #[test]
    fn indexes_php_trans_usage() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetUsageIndexer::open(dir.path()).unwrap();

        let source = "<?php\n$this->trans('checkout.confirm');\n";
        let tree = php_tree(source);
        indexer.ingest(Path::new("src/Controller/CheckoutController.php"), source, &tree).unwrap();

        let usages = indexer.usages.values("checkout.confirm");
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].line, 2);
    }

    #[test]
    fn indexes_admin_translation_usage() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetUsageIndexer::open(dir.path()).unwrap();

        let source = "this.$tc('sw-foo.title', 2);";
        let tree = js_tree(source);
        indexer.ingest(Path::new("Resources/app/administration/src/module/sw-foo/index.js"), source, &tree).unwrap();

        assert_eq!(indexer.usages.values("sw-foo.title").len(), 1);
    }
}
