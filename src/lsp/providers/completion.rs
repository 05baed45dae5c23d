//! `textDocument/completion`: suggests route names, service ids, snippet
//! keys and feature flag names when the cursor sits right after one of the
//! call patterns those domains are referenced through.

use tower_lsp::lsp_types::CompletionItem;
use tower_lsp::lsp_types::CompletionItemKind;
use tower_lsp::lsp_types::CompletionParams;
use tower_lsp::lsp_types::CompletionResponse;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;

pub async fn completion(ctx: &ProviderContext, params: CompletionParams) -> Result<Option<CompletionResponse>, Error> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let Some((text, _tree)) = ctx.documents.get(uri).await else {
        return Ok(None);
    };

    let Some(line) = text.lines().nth(position.line as usize) else {
        return Ok(None);
    };
    let prefix: String = line.chars().take(position.character as usize).collect();

    let items = if ends_with_any(&prefix, &["path(\"", "path('", "route(\"", "route('"]) {
        ctx.indexers()
            .route
            .routes()
            .all_values()
            .into_iter()
            .map(|route| CompletionItem {
                label: route.name,
                kind: Some(CompletionItemKind::VALUE),
                detail: Some(route.path),
                ..CompletionItem::default()
            })
            .collect()
    } else if ends_with_any(&prefix, &["trans(\"", "trans('", "trans(\"", "|trans"]) {
        ctx.indexers()
            .snippet
            .storefront()
            .all_keys()
            .into_iter()
            .map(|key| CompletionItem { label: key, kind: Some(CompletionItemKind::TEXT), ..CompletionItem::default() })
            .collect()
    } else if ends_with_any(&prefix, &["type=\"service\" id=\"", "get(\"", "get('"]) {
        ctx.indexers()
            .service
            .services()
            .all_values()
            .into_iter()
            .map(|service| CompletionItem {
                label: service.id,
                kind: Some(CompletionItemKind::CLASS),
                detail: Some(service.class),
                ..CompletionItem::default()
            })
            .collect()
    } else if ends_with_any(&prefix, &["::isActive(\"", "::isActive('", "feature.active.name=\""]) {
        ctx.indexers()
            .feature_flag
            .flags()
            .all_keys()
            .into_iter()
            .map(|name| CompletionItem { label: name, kind: Some(CompletionItemKind::CONSTANT), ..CompletionItem::default() })
            .collect()
    } else {
        return Ok(None);
    };

    Ok(Some(CompletionResponse::Array(items)))
}

fn ends_with_any(prefix: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| prefix.ends_with(suffix))
}
