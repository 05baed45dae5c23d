//! The language server: owns the orchestrator and the open-document state,
//! builds a [`ProviderContext`] once at construction, and dispatches every
//! JSON-RPC method to the matching `lsp::providers` function. Kept thin on
//! purpose — this is the JSON-RPC plumbing, not where any domain logic
//! lives.

pub mod document_manager;
pub mod providers;

use std::sync::Arc;

use shopware_lsp_orchestrator::Orchestrator;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result as ServerResult;
use tower_lsp::lsp_types::CodeActionParams;
use tower_lsp::lsp_types::CodeActionProviderCapability;
use tower_lsp::lsp_types::CodeActionResponse;
use tower_lsp::lsp_types::CodeLens;
use tower_lsp::lsp_types::CodeLensOptions;
use tower_lsp::lsp_types::CodeLensParams;
use tower_lsp::lsp_types::CompletionOptions;
use tower_lsp::lsp_types::CompletionParams;
use tower_lsp::lsp_types::CompletionResponse;
use tower_lsp::lsp_types::DidChangeTextDocumentParams;
use tower_lsp::lsp_types::DidCloseTextDocumentParams;
use tower_lsp::lsp_types::DidOpenTextDocumentParams;
use tower_lsp::lsp_types::ExecuteCommandOptions;
use tower_lsp::lsp_types::ExecuteCommandParams;
use tower_lsp::lsp_types::GotoDefinitionParams;
use tower_lsp::lsp_types::GotoDefinitionResponse;
use tower_lsp::lsp_types::Hover;
use tower_lsp::lsp_types::HoverParams;
use tower_lsp::lsp_types::HoverProviderCapability;
use tower_lsp::lsp_types::InitializeParams;
use tower_lsp::lsp_types::InitializeResult;
use tower_lsp::lsp_types::InitializedParams;
use tower_lsp::lsp_types::Location;
use tower_lsp::lsp_types::OneOf;
use tower_lsp::lsp_types::ReferenceParams;
use tower_lsp::lsp_types::ServerCapabilities;
use tower_lsp::lsp_types::ServerInfo;
use tower_lsp::lsp_types::TextDocumentSyncCapability;
use tower_lsp::lsp_types::TextDocumentSyncKind;

use crate::consts::BIN;
use crate::consts::VERSION;
use crate::lsp::document_manager::DocumentManager;
use crate::lsp::providers::ProviderContext;
use crate::lsp::providers::code_actions::code_actions;
use crate::lsp::providers::code_lens::code_lens;
use crate::lsp::providers::commands::execute_command;
use crate::lsp::providers::completion::completion;
use crate::lsp::providers::definition::definition;
use crate::lsp::providers::diagnostics::diagnostics;
use crate::lsp::providers::hover::hover;
use crate::lsp::providers::references::references;

/// The custom `workspace/executeCommand` commands this server advertises
/// (spec §4.7).
const CUSTOM_COMMANDS: &[&str] = &[
    "shopware/forceReindex",
    "shopware/extension/all",
    "shopware/snippet/storefront/getPossibleSnippetFiles",
    "shopware/snippet/administration/getPossibleSnippetFiles",
    "shopware/snippet/storefront/create",
    "shopware/snippet/administration/create",
    "shopware/snippet/storefront/all",
    "shopware/snippet/administration/all",
    "shopware/twig/extendBlock",
    "shopware/twig/getBlockDiff",
];

/// Completion is offered right after the quote characters every completable
/// call pattern in `providers::completion` is keyed on.
const COMPLETION_TRIGGER_CHARACTERS: &[&str] = &["\"", "'"];

pub struct ShopwareLanguageServer {
    client: Client,
    orchestrator: Arc<Orchestrator>,
    documents: Arc<DocumentManager>,
}

impl ShopwareLanguageServer {
    pub fn new(client: Client, orchestrator: Arc<Orchestrator>) -> Self {
        Self { client, orchestrator, documents: Arc::new(DocumentManager::new()) }
    }

    fn ctx(&self) -> ProviderContext {
        ProviderContext { client: self.client.clone(), orchestrator: self.orchestrator.clone(), documents: self.documents.clone() }
    }

    /// Recomputes and pushes diagnostics for a single open document.
    async fn publish_diagnostics(&self, uri: tower_lsp::lsp_types::Url) {
        let ctx = self.ctx();
        let report = diagnostics(&ctx, &uri).await;
        self.client.publish_diagnostics(uri, report, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for ShopwareLanguageServer {
    async fn initialize(&self, _params: InitializeParams) -> ServerResult<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(COMPLETION_TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect()),
                    ..CompletionOptions::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                code_lens_provider: Some(CodeLensOptions { resolve_provider: Some(false) }),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: CUSTOM_COMMANDS.iter().map(|c| c.to_string()).collect(),
                    ..ExecuteCommandOptions::default()
                }),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo { name: BIN.to_string(), version: Some(VERSION.to_string()) }),
        })
    }

    /// Kicks off the initial full index and the filesystem watcher loop.
    /// Neither blocks `initialized` itself — the editor gets control back
    /// immediately, and `shopware/indexingStarted`/`shopware/indexingCompleted`
    /// report the crawl's progress out of band.
    async fn initialized(&self, _: InitializedParams) {
        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move {
            if let Err(error) = orchestrator.index_all().await {
                tracing::error!(%error, "initial index failed");
            }
        });

        let orchestrator = self.orchestrator.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(error) = orchestrator.watch_forever() {
                tracing::error!(%error, "filesystem watcher stopped");
            }
        });
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.open(uri.clone(), params.text_document.version, params.text_document.text).await;
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.pop() else { return };
        self.documents.change(&uri, params.text_document.version, change.text).await;
        self.publish_diagnostics(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri).await;
    }

    async fn completion(&self, params: CompletionParams) -> ServerResult<Option<CompletionResponse>> {
        Ok(completion(&self.ctx(), params).await?)
    }

    async fn hover(&self, params: HoverParams) -> ServerResult<Option<Hover>> {
        Ok(hover(&self.ctx(), params).await?)
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> ServerResult<Option<GotoDefinitionResponse>> {
        Ok(definition(&self.ctx(), params).await?)
    }

    async fn references(&self, params: ReferenceParams) -> ServerResult<Option<Vec<Location>>> {
        Ok(references(&self.ctx(), params).await?)
    }

    async fn code_lens(&self, params: CodeLensParams) -> ServerResult<Option<Vec<CodeLens>>> {
        Ok(code_lens(&self.ctx(), params).await?)
    }

    async fn code_action(&self, params: CodeActionParams) -> ServerResult<Option<CodeActionResponse>> {
        Ok(code_actions(&self.ctx(), params).await?)
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> ServerResult<Option<serde_json::Value>> {
        Ok(execute_command(&self.ctx(), params).await?)
    }

    async fn shutdown(&self) -> ServerResult<()> {
        if let Err(error) = self.orchestrator.close() {
            tracing::error!(%error, "failed to close the orchestrator cleanly");
        }
        Ok(())
    }
}

/// Converts the binary crate's [`crate::error::Error`] into a JSON-RPC
/// internal error, since [`LanguageServer`] methods must return
/// `tower_lsp::jsonrpc::Error`.
impl From<crate::error::Error> for tower_lsp::jsonrpc::Error {
    fn from(error: crate::error::Error) -> Self {
        tower_lsp::jsonrpc::Error { code: tower_lsp::jsonrpc::ErrorCode::InternalError, message: error.to_string().into(), data: None }
    }
}
