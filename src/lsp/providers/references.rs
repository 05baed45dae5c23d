//! `textDocument/references`: finds every usage site of a route name
//! (backed by [`shopware_lsp_index::RouteUsageIndexer`]) or a snippet key
//! (backed by `shopware_lsp_index::SnippetUsageIndexer`), falling back to
//! every file that defines the word under the cursor.

use tower_lsp::lsp_types::Location;
use tower_lsp::lsp_types::Position;
use tower_lsp::lsp_types::Range;
use tower_lsp::lsp_types::ReferenceParams;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::path_to_uri;
use crate::lsp::providers::word_at;

pub async fn references(ctx: &ProviderContext, params: ReferenceParams) -> Result<Option<Vec<Location>>, Error> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let Some((text, _tree)) = ctx.documents.get(uri).await else {
        return Ok(None);
    };
    let Some(line) = text.lines().nth(position.line as usize) else {
        return Ok(None);
    };
    let Some(word) = word_at(line, position.character as usize) else {
        return Ok(None);
    };

    let indexers = ctx.indexers();

    let mut locations: Vec<Location> = indexers
        .route_usage
        .usages()
        .values(&word)
        .into_iter()
        .filter_map(|usage| {
            let uri = path_to_uri(std::path::Path::new(&usage.file))?;
            let line = usage.line.saturating_sub(1);
            Some(Location { uri, range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } } })
        })
        .collect();

    if locations.is_empty() {
        locations = indexers
            .snippet_usage
            .usages()
            .values(&word)
            .into_iter()
            .filter_map(|usage| {
                let uri = path_to_uri(std::path::Path::new(&usage.file))?;
                let line = usage.line.saturating_sub(1);
                Some(Location { uri, range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } } })
            })
            .collect();
    }

    if locations.is_empty() {
        locations = indexers
            .service
            .services()
            .entries(&word)
            .into_iter()
            .filter_map(|(path, _key, service)| {
                let uri = path_to_uri(&path)?;
                let line = service.line.saturating_sub(1);
                Some(Location { uri, range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } } })
            })
            .collect();
    }

    if locations.is_empty() { Ok(None) } else { Ok(Some(locations)) }
}
