//! The minimal vocabulary the scanner needs to hand a parsed file to an
//! [`crate::indexer::Indexer`] without depending on any particular parser.
//!
//! `shopware-lsp-syntax` owns the real tree types (a `tree-sitter::Tree`
//! wrapper for every grammar-backed language, plus the hand-rolled Twig
//! tree) and implements this trait for each of them. Keeping the trait here,
//! in `database`, rather than in `syntax`, is what lets `database` describe
//! "an indexer ingests a tree" without depending on `syntax` — `syntax`
//! depends on `database` for [`crate::error::DatabaseError`] conversions, not
//! the other way around, and `index` is the crate that ties both together.

/// A parsed syntax tree, opaque to everything except the indexer that knows
/// how to downcast it back to its concrete type via [`AnyTree::as_any`].
pub trait AnyTree: Send + Sync {
    /// The grammar or file kind this tree was parsed as, e.g. `"twig"`, `"xml"`, `"php"`.
    fn language(&self) -> &'static str;

    /// Downcasts to the concrete tree type. Indexers that only ever ingest
    /// one language (the common case) use this to get back the real
    /// `tree_sitter::Tree` or Twig AST handed to them by the parse service.
    fn as_any(&self) -> &dyn std::any::Any;
}
