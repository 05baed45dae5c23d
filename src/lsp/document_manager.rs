//! Tracks the editor's in-flight view of open documents: text, version, and
//! latest parse tree, keyed by URI. Reparses the whole document on every
//! `didOpen`/`didChange`, since the workspace's files are small enough that
//! incremental reparsing isn't worth the complexity.
//!
//! The fact store only ever reflects saved state; this is the only place
//! that knows about unsaved edits.

use std::collections::HashMap;
use std::sync::Arc;

use shopware_lsp_database::AnyTree;
use shopware_lsp_syntax::ParseService;
use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;

/// One open document: its latest text, the LSP version stamp the editor
/// last sent, and the tree the text currently parses to (`None` if the
/// extension has no parser or the parse failed outright).
pub struct Document {
    pub text: String,
    pub version: i32,
    pub tree: Option<Arc<dyn AnyTree>>,
}

pub struct DocumentManager {
    parser: ParseService,
    documents: RwLock<HashMap<Url, Document>>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self { parser: ParseService::new(), documents: RwLock::new(HashMap::new()) }
    }

    pub async fn open(&self, uri: Url, version: i32, text: String) {
        let document = self.parse(&uri, version, text);
        self.documents.write().await.insert(uri, document);
    }

    pub async fn change(&self, uri: &Url, version: i32, text: String) {
        let document = self.parse(uri, version, text);
        self.documents.write().await.insert(uri.clone(), document);
    }

    pub async fn close(&self, uri: &Url) {
        self.documents.write().await.remove(uri);
    }

    fn parse(&self, uri: &Url, version: i32, text: String) -> Document {
        let path = uri.to_file_path().unwrap_or_default();
        let tree = self.parser.parse(&path, text.as_bytes()).ok().flatten().map(Arc::from);
        Document { text, version, tree }
    }

    /// A read-only snapshot of the document's text and tree, if it is open.
    pub async fn get(&self, uri: &Url) -> Option<(String, Option<Arc<dyn AnyTree>>)> {
        self.documents.read().await.get(uri).map(|document| (document.text.clone(), document.tree.clone()))
    }

    /// The node at `line`/`character` in `uri`'s current tree, alongside the
    /// document's text, for providers that need both the AST position and
    /// the surrounding source.
    pub async fn node_at(&self, uri: &Url, line: u32, character: u32) -> Option<(String, Arc<dyn AnyTree>, usize)> {
        let documents = self.documents.read().await;
        let document = documents.get(uri)?;
        let tree = document.tree.clone()?;
        let offset = byte_offset_of(&document.text, line, character);
        Some((document.text.clone(), tree, offset))
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_offset_of(text: &str, line: u32, character: u32) -> usize {
    let mut offset = 0;
    for (index, text_line) in text.split('\n').enumerate() {
        if index as u32 == line {
            let chars: String = text_line.chars().take(character as usize).collect();
            return offset + chars.len();
        }
        offset += text_line.len() + 1;
    }
    offset
}
