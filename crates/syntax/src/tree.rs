//! Concrete syntax tree wrappers and their [`shopware_lsp_database::AnyTree`] implementations.

use shopware_lsp_database::AnyTree;

/// A tree-sitter-backed tree, tagged with the grammar it was parsed with.
pub struct GrammarTree {
    pub language: &'static str,
    pub tree: tree_sitter::Tree,
}

impl AnyTree for GrammarTree {
    fn language(&self) -> &'static str {
        self.language
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl AnyTree for crate::twig::TwigTree {
    fn language(&self) -> &'static str {
        "twig"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
