//! Snippet indexer: flattens locale-scoped JSON translation files into
//! dotted-key facts, keeping storefront and administration snippets in
//! separate stores since every command in spec §4.7 is scoped to one or the
//! other.

use std::path::Path;
use std::path::PathBuf;

use shopware_lsp_database::AnyTree;
use shopware_lsp_database::DatabaseError;
use shopware_lsp_database::FactStore;
use shopware_lsp_database::Indexer;
use shopware_lsp_syntax::tree::GrammarTree;

use crate::json_tree;
use crate::locale::extract_locale;
use crate::model::Snippet;

/// Administration snippets live under an `app/administration` tree;
/// everything else locale-shaped is a storefront snippet.
fn is_administration_snippet(path: &str) -> bool {
    path.contains("Resources/app/administration")
}

pub struct SnippetIndexer {
    storefront: FactStore<Snippet>,
    administration: FactStore<Snippet>,
}

impl SnippetIndexer {
    pub fn open(cache_dir: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            storefront: FactStore::open(&cache_dir.join("snippets_storefront.db"))?,
            administration: FactStore::open(&cache_dir.join("snippets_administration.db"))?,
        })
    }

    pub fn storefront(&self) -> &FactStore<Snippet> {
        &self.storefront
    }

    pub fn administration(&self) -> &FactStore<Snippet> {
        &self.administration
    }

    fn ingest_json(&self, path: &Path, source: &str, tree: &tree_sitter::Tree) -> Result<(), DatabaseError> {
        let path_string = path.to_string_lossy().into_owned();
        let locale = extract_locale(&path_string);
        if locale == "unknown" {
            return Ok(());
        }

        let bytes = source.as_bytes();
        let Some(root) = json_tree::root_object(tree) else { return Ok(()) };

        let mut flattened = Vec::new();
        json_tree::flatten(root, bytes, String::new(), &mut flattened);

        let rows = flattened
            .into_iter()
            .map(|(key, node)| {
                let text = json_tree::leaf_text(&node, bytes);
                let line = node.start_position().row as u32 + 1;
                (key.clone(), Snippet { key, text, locale: locale.clone(), file: path_string.clone(), line })
            })
            .collect();

        let store = if is_administration_snippet(&path_string) { &self.administration } else { &self.storefront };
        store.put_batch(path, rows)
    }
}

impl Indexer for SnippetIndexer {
    fn id(&self) -> &'static str {
        "snippet"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn ingest(&self, path: &Path, source: &str, tree: &dyn AnyTree) -> Result<(), DatabaseError> {
        self.storefront.delete_path(path)?;
        self.administration.delete_path(path)?;

        let Some(grammar_tree) = tree.as_any().downcast_ref::<GrammarTree>() else { return Ok(()) };
        self.ingest_json(path, source, &grammar_tree.tree)
    }

    fn forget_files(&self, paths: &[PathBuf]) -> Result<(), DatabaseError> {
        self.storefront.delete_paths(paths)?;
        self.administration.delete_paths(paths)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.storefront.clear()?;
        self.administration.clear()
    }

    fn close(&self) -> Result<(), DatabaseError> {
        self.storefront.close()?;
        self.administration.close()
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
    fn flattens_nested_keys_and_records_locale() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetIndexer::open(dir.path()).unwrap();

        let source = r#"{"foo":{"bar":"Hallo"}}"#;
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("Resources/snippet/de_DE/storefront.de-DE.json"), source, &tree).unwrap();

        let snippets = indexer.storefront.values("foo.bar");
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "Hallo");
        assert_eq!(snippets[0].locale, "de-DE");
        assert_eq!(snippets[0].line, 1);
    }

    #[test]
    fn uses_the_node_line_not_just_the_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetIndexer::open(dir.path()).unwrap();

        let source = "{\n  \"a\": {\n    \"x\": \"one\"\n  },\n  \"b\": {\n    \"x\": \"two\"\n  }\n}\n";
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("Resources/snippet/en-GB.json"), source, &tree).unwrap();

        let first = &indexer.storefront.values("a.x")[0];
        let second = &indexer.storefront.values("b.x")[0];
        assert_eq!(first.line, 3);
        assert_eq!(second.line, 6);
    }

    #[test]
    fn administration_snippets_go_to_their_own_store() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetIndexer::open(dir.path()).unwrap();

        let source = r#"{"a":"b"}"#;
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("Resources/app/administration/snippet/en-GB.json"), source, &tree).unwrap();

        assert_eq!(indexer.administration.values("a").len(), 1);
        assert!(indexer.storefront.values("a").is_empty());
    }

    #[test]
    fn non_locale_json_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = SnippetIndexer::open(dir.path()).unwrap();

        let source = r#"{"a":"b"}"#;
        let tree = json_tree_of(source);
        indexer.ingest(Path::new("Resources/config/theme.json"), source, &tree).unwrap();

        assert!(indexer.storefront.values("a").is_empty());
        assert!(indexer.administration.values("a").is_empty());
    }
}
