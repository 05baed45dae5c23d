//! One module per LSP feature, each exposing a single entry point that takes
//! a [`ProviderContext`] and the method's request type and returns the
//! method's response. Kept as free functions rather than methods on
//! [`crate::lsp::ShopwareLanguageServer`] so each feature can be read, and
//! tested, in isolation from the JSON-RPC plumbing.

pub mod code_actions;
pub mod code_lens;
pub mod commands;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod references;

use std::sync::Arc;

use shopware_lsp_index::IndexerSet;
use shopware_lsp_orchestrator::Orchestrator;
use tower_lsp::Client;

use crate::lsp::document_manager::DocumentManager;

/// Everything a feature provider needs: the live fact stores (through the
/// orchestrator's indexer set), the editor's in-flight document state, and
/// the client handle commands use to publish diagnostics back out-of-band.
pub struct ProviderContext {
    pub client: Client,
    pub orchestrator: Arc<Orchestrator>,
    pub documents: Arc<DocumentManager>,
}

impl ProviderContext {
    pub fn indexers(&self) -> &IndexerSet {
        self.orchestrator.indexers()
    }
}

/// Extracts the identifier-like token (word characters, `.`, `-`, `_`)
/// touching `offset` in `text` — the word a cursor is "on" for hover,
/// definition and references.
pub fn word_at(text: &str, offset: usize) -> Option<String> {
    let is_word_byte = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'@' | b'/');
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    let mut start = offset;
    while start > 0 && is_word_byte(bytes[start - 1]) {
        start -= 1;
    }

    let mut end = offset;
    while end < bytes.len() && is_word_byte(bytes[end]) {
        end += 1;
    }

    if start == end { None } else { Some(text[start..end].to_string()) }
}

/// Converts a 0-based byte offset in `text` back into an LSP line/character
/// position (UTF-16 code units, per the LSP spec).
pub fn position_of(text: &str, offset: usize) -> tower_lsp::lsp_types::Position {
    let offset = offset.min(text.len());
    let prefix = &text[..offset];
    let line = prefix.matches('\n').count() as u32;
    let character = prefix.rsplit('\n').next().unwrap_or("").encode_utf16().count() as u32;
    tower_lsp::lsp_types::Position { line, character }
}

pub fn path_to_uri(path: &std::path::Path) -> Option<tower_lsp::lsp_types::Url> {
    tower_lsp::lsp_types::Url::from_file_path(path).ok()
}
