use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::builder::styling::Effects;

use crate::commands::completions::CompletionsCommand;
use crate::commands::config::ConfigCommand;
use crate::commands::index::IndexCommand;
use crate::commands::lsp::LspCommand;

pub mod completions;
pub mod config;
pub mod index;
pub mod lsp;

/// Styling for the `shopware-lsp` CLI.
pub const CLAP_STYLING: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default())
    .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
    .valid(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD));

#[derive(Parser, Debug)]
pub enum ShopwareLspCommand {
    /// Start the language server over stdio.
    #[command(name = "lsp")]
    Lsp(LspCommand),
    /// Run a headless one-shot full index, for CI warm caches or exercising
    /// the indexing pipeline without an editor attached.
    #[command(name = "index")]
    Index(IndexCommand),
    /// Print the final, merged configuration.
    #[command(name = "config")]
    Config(ConfigCommand),
    /// Generate shell completions for this CLI.
    #[command(name = "completions")]
    Completions(CompletionsCommand),
}

#[derive(Parser, Debug)]
#[command(
    version,
    author,
    styles = CLAP_STYLING,
    about = "shopware-lsp: a language server for Shopware's PHP, XML, YAML, JSON, Twig and SCSS surface."
)]
pub struct CliArguments {
    /// The workspace directory to index. Defaults to the current working directory.
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// The number of rayon worker threads to use for indexing.
    ///
    /// Overrides the `threads` setting from `shopware-lsp.toml` and
    /// `SHOPWARE_LSP_THREADS`.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Do not use colors in the output.
    #[arg(long, default_value_t = false, global = true)]
    pub no_color: bool,

    #[clap(subcommand)]
    pub command: ShopwareLspCommand,
}
