use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use shopware_lsp_orchestrator::Orchestrator;
use shopware_lsp_orchestrator::OrchestratorConfig;
use shopware_lsp_orchestrator::TowerLspNotifier;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::config::Configuration;
use crate::error::Error;
use crate::lsp::ShopwareLanguageServer;

/// Starts the language server over stdio.
#[derive(Parser, Debug)]
#[command(
    name = "lsp",
    about = "Starts the Language Server Protocol (LSP) server.",
    long_about = r#"
The `lsp` command starts the Language Server Protocol (LSP) server, which provides editor
support for Shopware's PHP, XML, YAML, JSON, Twig and SCSS surface. The server listens for
incoming JSON-RPC requests on stdin and stdout.
"#
)]
pub struct LspCommand {}

impl LspCommand {
    pub async fn execute(self, configuration: Configuration) -> Result<ExitCode, Error> {
        let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());

        let orchestrator_config = OrchestratorConfig { extra_excludes: configuration.extra_excludes, threads: configuration.threads };

        let (service, socket) = LspService::new(move |client| {
            let notifier = Arc::new(TowerLspNotifier::new(client.clone()));
            let orchestrator = Arc::new(
                Orchestrator::open(configuration.workspace, configuration.cache_dir, orchestrator_config, notifier)
                    .expect("failed to open the orchestrator"),
            );

            ShopwareLanguageServer::new(client, orchestrator)
        });

        Server::new(stdin, stdout, socket).serve(service).await;

        Ok(ExitCode::SUCCESS)
    }
}
