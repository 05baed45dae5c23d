//! shopware-lsp: a language server for Shopware's PHP, XML, YAML, JSON,
//! Twig and SCSS surface.
//!
//! # Architecture
//!
//! - **Command layer** ([`commands`]): command-line interface and argument parsing.
//! - **Configuration layer** ([`config`]): loading and merging configuration from files,
//!   environment variables and command-line overrides.
//! - **LSP layer** ([`lsp`]): the JSON-RPC server and its feature providers.
//! - **Indexing**: delegated entirely to the `shopware-lsp-orchestrator`,
//!   `shopware-lsp-index`, `shopware-lsp-syntax` and `shopware-lsp-database`
//!   library crates.
//!
//! # Commands
//!
//! - `shopware-lsp lsp`: start the language server over stdio
//! - `shopware-lsp index`: run a headless one-shot full index
//! - `shopware-lsp config`: print the merged configuration
//! - `shopware-lsp completions`: generate shell completions

use std::process::ExitCode;

use clap::ColorChoice;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::commands::CliArguments;
use crate::commands::ShopwareLspCommand;
use crate::config::Configuration;
use crate::error::Error;
use crate::utils::logger::initialize_logger;

mod commands;
mod config;
mod consts;
mod error;
mod lsp;
mod utils;

#[cfg(any(target_os = "macos", target_os = "windows", target_env = "musl", target_env = "gnu"))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start the async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run()).unwrap_or_else(|error| {
        tracing::error!("{error}");
        tracing::trace!("exiting with error code due to: {error:#?}");

        ExitCode::FAILURE
    })
}

/// Core application logic:
///
/// 1. Parse command-line arguments.
/// 2. Initialize the `tracing` subscriber.
/// 3. Load the layered [`Configuration`] (skipped for `completions`, which
///    needs no workspace).
/// 4. Dispatch to the selected subcommand.
async fn run() -> Result<ExitCode, Error> {
    let arguments = CliArguments::parse();
    let color_choice = if arguments.no_color { ColorChoice::Never } else { ColorChoice::Auto };

    initialize_logger(
        if cfg!(debug_assertions) { LevelFilter::DEBUG } else { LevelFilter::INFO },
        crate::consts::LOG_ENVIRONMENT_VARIABLE,
        color_choice,
    );

    let CliArguments { workspace, threads, command, .. } = arguments;

    if let ShopwareLspCommand::Completions(cmd) = command {
        return cmd.execute();
    }

    let configuration = Configuration::load(workspace, threads)?;

    match command {
        ShopwareLspCommand::Lsp(cmd) => cmd.execute(configuration).await,
        ShopwareLspCommand::Index(cmd) => cmd.execute(configuration).await,
        ShopwareLspCommand::Config(cmd) => cmd.execute(configuration),
        ShopwareLspCommand::Completions(_) => {
            unreachable!("the completions command is handled before configuration is loaded")
        }
    }
}
