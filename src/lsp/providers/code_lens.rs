//! `textDocument/codeLens`: shows a usage count above each route definition
//! and, above each Twig block, how many overrides exist for it (driven off
//! [`shopware_lsp_index::TwigIndexer::block_hashes`]).

use tower_lsp::lsp_types::CodeLens;
use tower_lsp::lsp_types::CodeLensParams;
use tower_lsp::lsp_types::Command;
use tower_lsp::lsp_types::Position;
use tower_lsp::lsp_types::Range;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;

pub async fn code_lens(ctx: &ProviderContext, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>, Error> {
    let uri = params.text_document.uri;
    let Ok(path) = uri.to_file_path() else {
        return Ok(None);
    };

    let indexers = ctx.indexers();
    let mut lenses = Vec::new();

    for route in indexers.route.routes().values_for_path(&path) {
        let usages = indexers.route_usage.usages().values(&route.name).len();
        let line = route.line.saturating_sub(1);
        lenses.push(CodeLens {
            range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } },
            command: Some(Command { title: format!("{usages} usage(s)"), command: String::new(), arguments: None }),
            data: None,
        });
    }

    for block in indexers.twig.blocks().values_for_path(&path) {
        let overrides = indexers.twig.block_hashes().values(&block.name).len();
        if overrides == 0 {
            continue;
        }
        let line = block.line.saturating_sub(1);
        lenses.push(CodeLens {
            range: Range { start: Position { line, character: 0 }, end: Position { line, character: 0 } },
            command: Some(Command {
                title: format!("{overrides} storefront override(s)"),
                command: "shopware/twig/getBlockDiff".to_string(),
                arguments: Some(vec![serde_json::json!({ "textUri": uri, "blockName": block.name })]),
            }),
            data: None,
        });
    }

    Ok(Some(lenses))
}
