//! Computes the diagnostics for a single open document: unresolved Twig
//! function/filter calls (anything neither a Twig builtin nor indexed from
//! an `AbstractExtension`) and Twig `{% sw_extends %}` targets that don't
//! resolve to a known logical path.

use shopware_lsp_database::AnyTree;
use shopware_lsp_syntax::twig::TwigTree;
use tower_lsp::lsp_types::Diagnostic;
use tower_lsp::lsp_types::DiagnosticSeverity;
use tower_lsp::lsp_types::Position;
use tower_lsp::lsp_types::Range;
use tower_lsp::lsp_types::Url;

use crate::lsp::providers::ProviderContext;

/// Twig ships these without any extension registering them; the indexer
/// only ever records `AbstractExtension`-defined callables, so these must be
/// allow-listed by hand.
const BUILTIN_FUNCTIONS: &[&str] =
    &["path", "url", "asset", "block", "parent", "constant", "trans", "include", "source", "dump", "sw_icon"];
const BUILTIN_FILTERS: &[&str] =
    &["upper", "lower", "trim", "default", "length", "join", "escape", "raw", "date", "number_format", "trans", "json_encode"];

pub async fn diagnostics(ctx: &ProviderContext, uri: &Url) -> Vec<Diagnostic> {
    let Some((text, tree)) = ctx.documents.get(uri).await else {
        return Vec::new();
    };
    let Some(tree) = tree else {
        return Vec::new();
    };
    let Some(twig) = tree.as_any().downcast_ref::<TwigTree>() else {
        return Vec::new();
    };

    let indexers = ctx.indexers();
    let mut diagnostics = Vec::new();

    for call in twig.functions() {
        if BUILTIN_FUNCTIONS.contains(&call.name.as_str()) {
            continue;
        }
        if !indexers.twig.functions().values(&call.name).is_empty() {
            continue;
        }
        diagnostics.push(unresolved(&text, call.span.start, &format!("unknown Twig function `{}`", call.name)));
    }

    for call in twig.filters() {
        if BUILTIN_FILTERS.contains(&call.name.as_str()) {
            continue;
        }
        if !indexers.twig.filters().values(&call.name).is_empty() {
            continue;
        }
        diagnostics.push(unresolved(&text, call.span.start, &format!("unknown Twig filter `{}`", call.name)));
    }

    if let Some(extends) = &twig.extends {
        if indexers.twig.files().values(&extends.target).is_empty() {
            diagnostics.push(unresolved(
                &text,
                extends.span.start,
                &format!("`{}` does not resolve to a known template", extends.target),
            ));
        }
    }

    diagnostics
}

fn unresolved(text: &str, offset: usize, message: &str) -> Diagnostic {
    let position = crate::lsp::providers::position_of(text, offset);
    Diagnostic {
        range: Range { start: position, end: position },
        severity: Some(DiagnosticSeverity::WARNING),
        source: Some("shopware-lsp".to_string()),
        message: message.to_string(),
        ..Diagnostic::default()
    }
}
