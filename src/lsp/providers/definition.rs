//! `textDocument/definition`: jumps from a route name, service id, snippet
//! key or Twig function/filter reference to where it is declared.

use tower_lsp::lsp_types::GotoDefinitionParams;
use tower_lsp::lsp_types::GotoDefinitionResponse;
use tower_lsp::lsp_types::Location;
use tower_lsp::lsp_types::Position;
use tower_lsp::lsp_types::Range;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::path_to_uri;
use crate::lsp::providers::word_at;

pub async fn definition(ctx: &ProviderContext, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>, Error> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

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

    let locations: Vec<Location> = indexers
        .route
        .routes()
        .entries(&word)
        .into_iter()
        .map(|(path, _key, route)| location_at(&path, route.line))
        .chain(indexers.service.services().entries(&word).into_iter().map(|(path, _key, service)| location_at(&path, service.line)))
        .chain(indexers.snippet.storefront().entries(&word).into_iter().map(|(path, _key, snippet)| location_at(&path, snippet.line)))
        .chain(indexers.twig.functions().entries(&word).into_iter().map(|(path, _key, function)| location_at(&path, function.line)))
        .chain(indexers.twig.filters().entries(&word).into_iter().map(|(path, _key, filter)| location_at(&path, filter.line)))
        .flatten()
        .collect();

    if locations.is_empty() {
        return Ok(None);
    }

    Ok(Some(GotoDefinitionResponse::Array(locations)))
}

fn location_at(path: &std::path::Path, line: u32) -> Option<Location> {
    let uri = path_to_uri(path)?;
    let line = line.saturating_sub(1);
    Some(Location { uri, range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } } })
}
