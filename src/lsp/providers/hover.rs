//! `textDocument/hover`: looks the token under the cursor up across every
//! domain's fact store (routes, services, snippets, feature flags, Twig
//! functions/filters) and renders whichever one matches first.

use tower_lsp::lsp_types::Hover;
use tower_lsp::lsp_types::HoverContents;
use tower_lsp::lsp_types::HoverParams;
use tower_lsp::lsp_types::MarkupContent;
use tower_lsp::lsp_types::MarkupKind;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::word_at;

pub async fn hover(ctx: &ProviderContext, params: HoverParams) -> Result<Option<Hover>, Error> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let Some((text, _tree)) = ctx.documents.get(uri).await else {
        return Ok(None);
    };

    let Some(line) = text.lines().nth(position.line as usize) else {
        return Ok(None);
    };

    let byte_offset = position.character as usize;
    let Some(word) = word_at(line, byte_offset) else {
        return Ok(None);
    };

    let markdown = render(ctx, &word);
    Ok(markdown.map(|value| Hover {
        contents: HoverContents::Markup(MarkupContent { kind: MarkupKind::Markdown, value }),
        range: None,
    }))
}

fn render(ctx: &ProviderContext, word: &str) -> Option<String> {
    let indexers = ctx.indexers();

    if let Some(route) = indexers.route.routes().values(word).into_iter().next() {
        return Some(format!("**route** `{}`\n\n`{}` {}\n\ncontroller: `{}`", route.name, route.methods.join("|"), route.path, route.controller));
    }

    if let Some(service) = indexers.service.services().values(word).into_iter().next() {
        return Some(format!("**service** `{}`\n\nclass: `{}`\n\ntags: {}", service.id, service.class, service.tags.join(", ")));
    }

    let snippets = indexers.snippet.storefront().values(word);
    if let Some(snippet) = snippets.into_iter().next() {
        return Some(format!("**snippet** `{}` ({})\n\n{}", snippet.key, snippet.locale, snippet.text));
    }

    if indexers.feature_flag.flags().values(word).into_iter().next().is_some() {
        return Some(format!("**feature flag** `{word}`"));
    }

    if let Some(function) = indexers.twig.functions().values(word).into_iter().next() {
        return Some(format!("**twig function** `{}`\n\nusage: `{}`", function.name, function.usage));
    }

    if let Some(filter) = indexers.twig.filters().values(word).into_iter().next() {
        return Some(format!("**twig filter** `{}`\n\nusage: `{}`", filter.name, filter.usage));
    }

    None
}
