//! Feature flag indexer: YAML files under a `feature` path recording a list
//! of flag names, e.g. `config/feature_flags.yaml`'s `flags: - name: ...`.

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::tree::GrammarTree;
use shopware_lsp_syntax::yaml;

use crate::model::FeatureFlag;

pub struct FeatureFlagIndexer {
    flags: FactStore<FeatureFlag>,
}

impl FeatureFlagIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { flags: FactStore::open(&cache_dir.join("feature_flags.db"))? })
    }

    pub fn flags(&self) -> &FactStore<FeatureFlag> {
        &self.flags
    }

    /// Walks every mapping pair in the document whose key is `name`,
    /// regardless of block or flow style or nesting depth, so `- name: x`
    /// and `- { name: x }` are both recognized.
    fn ingest_yaml(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let bytes = source.as_bytes();
        let mut rows = Vec::new();

        for pair in yaml::find_pairs_by_key(tree.root_node(), bytes, "name") {
            let Some(value) = yaml::pair_value(&pair).map(yaml::unwrap_node) else { continue };
            if !matches!(value.kind(), "plain_scalar" | "single_quote_scalar" | "double_quote_scalar") {
                continue;
            }

            let name = yaml::scalar_text(&value, bytes);
            let line = value.start_position().row as u32 + 1;
            rows.push((name.clone(), FeatureFlag { name, file: path.to_string_lossy().into_owned(), line }));
        }

        self.flags.put_batch(path, rows)
    }
}

impl Indexer for FeatureFlagIndexer {
    fn id(&self) -> &'static str {
        "feature_flag"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.flags.delete_path(path)?;

        if !path.to_string_lossy().contains("feature") {
            return Ok(());
        }

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };
        self.ingest_yaml(path, source, &grammar_tree.tree)
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.flags.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.flags.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.flags.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml_tree(source: &str) -> GrammarTree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_yaml::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        GrammarTree { language: "yaml", tree }
    }

    #[test]
    fn indexes_feature_flags_with_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = FeatureFlagIndexer::open(dir.path()).unwrap();

        let source = "flags:\n  - name: v6.5.0.0\n  - name: DISABLE_VUE_COMPAT\n";
        let tree = yaml_tree(source);
        indexer.ingest(Path::new("config/feature_flags.yaml"), source, &tree).unwrap();

        let v65 = indexer.flags.values("v6.5.0.0");
        assert_eq!(v65.len(), 1);
        assert_eq!(v65[0].line, 2);

        let disable_vue = indexer.flags.values("DISABLE_VUE_COMPAT");
        assert_eq!(disable_vue.len(), 1);
        assert_eq!(disable_vue[0].line, 3);
    }

    #[test]
    fn indexes_flow_style_flags() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = FeatureFlagIndexer::open(dir.path()).unwrap();

        let source = "flags: [{ name: FOO }, { name: BAR }]\n";
        let tree = yaml_tree(source);
        indexer.ingest(Path::new("config/feature_flags.yaml"), source, &tree).unwrap();

        assert_eq!(indexer.flags.values("FOO").len(), 1);
        assert_eq!(indexer.flags.values("BAR").len(), 1);
    }

    #[test]
    fn ignores_yaml_files_outside_a_feature_path() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = FeatureFlagIndexer::open(dir.path()).unwrap();

        let source = "flags:\n  - name: x\n";
        let tree = yaml_tree(source);
        indexer.ingest(Path::new("config/services.yaml"), source, &tree).unwrap();

        assert!(indexer.flags.values("x").is_empty());
    }
}
