//! Installs the process-wide [`tracing`] subscriber: an `EnvFilter` seeded
//! from `SHOPWARE_LSP_LOG` (falling back to `default_level`), writing to
//! stderr so stdout stays free for the LSP's JSON-RPC framing.

use clap::ColorChoice;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

pub fn initialize_logger(default_level: LevelFilter, env_var: &str, color_choice: ColorChoice) {
    let filter = EnvFilter::try_from_env(env_var).unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let ansi = match color_choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
    };

    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_ansi(ansi).init();
}
