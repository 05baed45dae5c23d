use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use shopware_lsp_orchestrator::Orchestrator;
use shopware_lsp_orchestrator::OrchestratorConfig;
use shopware_lsp_orchestrator::notifier::IndexingNotifier;

use crate::config::Configuration;
use crate::error::Error;

/// Runs a full crawl of the workspace once and exits, without opening a
/// JSON-RPC connection. Useful for CI warming a cache ahead of time, or for
/// exercising the indexing pipeline without an editor attached.
#[derive(Parser, Debug)]
#[command(
    name = "index",
    about = "Runs a headless one-shot full index.",
    long_about = r#"
The `index` command runs the same crawl the language server runs on `initialized`, then exits.
It writes to the same on-disk cache the `lsp` command reads from, so running it ahead of time
(in CI, for example) lets the editor start with a warm cache.
"#
)]
pub struct IndexCommand {
    /// Wipe the cache and reindex everything, instead of only changed files.
    #[arg(long, default_value_t = false)]
    force: bool,
}

/// Reports indexing progress to the terminal instead of a JSON-RPC client.
struct LoggingNotifier;

impl IndexingNotifier for LoggingNotifier {
    fn indexing_started(&self) {
        tracing::info!("indexing started");
    }

    fn indexing_completed(&self, message: String, time_in_seconds: f64) {
        tracing::info!(time_in_seconds, "{message}");
    }
}

impl IndexCommand {
    pub async fn execute(self, configuration: Configuration) -> Result<ExitCode, Error> {
        let orchestrator_config = OrchestratorConfig { extra_excludes: configuration.extra_excludes, threads: configuration.threads };

        let orchestrator =
            Orchestrator::open(configuration.workspace, configuration.cache_dir, orchestrator_config, Arc::new(LoggingNotifier))?;

        let stats = if self.force { orchestrator.force_reindex().await? } else { orchestrator.index_all().await? };

        println!(
            "indexed {} changed, {} unchanged, {} removed, {} failed (of {} discovered)",
            stats.changed, stats.unchanged, stats.removed, stats.failed, stats.discovered
        );

        orchestrator.close()?;

        Ok(ExitCode::SUCCESS)
    }
}
