//! `textDocument/codeAction`: offers to extend the storefront block under
//! the cursor into an override template, when a block open tag touches the
//! requested range.

use shopware_lsp_database::AnyTree;
use shopware_lsp_syntax::twig::TwigTree;
use tower_lsp::lsp_types::CodeAction;
use tower_lsp::lsp_types::CodeActionKind;
use tower_lsp::lsp_types::CodeActionOrCommand;
use tower_lsp::lsp_types::CodeActionParams;
use tower_lsp::lsp_types::CodeActionResponse;
use tower_lsp::lsp_types::Command;

use crate::error::Error;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::position_of;

pub async fn code_actions(ctx: &ProviderContext, params: CodeActionParams) -> Result<Option<CodeActionResponse>, Error> {
    let uri = params.text_document.uri;
    let range = params.range;

    let Some((text, tree)) = ctx.documents.get(&uri).await else {
        return Ok(None);
    };
    let Some(tree) = tree else {
        return Ok(None);
    };
    let Some(twig) = tree.as_any().downcast_ref::<TwigTree>() else {
        return Ok(None);
    };

    let mut actions = Vec::new();

    for block in &twig.blocks {
        let start = position_of(&text, block.name_span.start);
        if start.line != range.start.line {
            continue;
        }

        actions.push(CodeActionOrCommand::CodeAction(CodeAction {
            title: format!("Extend block `{}` into a plugin override", block.name),
            kind: Some(CodeActionKind::REFACTOR),
            command: Some(Command {
                title: "Extend block".to_string(),
                command: "shopware/twig/extendBlock".to_string(),
                arguments: Some(vec![serde_json::json!({ "textUri": uri, "blockName": block.name })]),
            }),
            ..CodeAction::default()
        }));
    }

    if actions.is_empty() { Ok(None) } else { Ok(Some(actions)) }
}
