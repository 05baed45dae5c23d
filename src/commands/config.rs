use std::process::ExitCode;

use clap::Parser;

use crate::config::Configuration;
use crate::consts::CURRENT_DIR;
use crate::error::Error;

/// Display the final, merged configuration `shopware-lsp` is using.
///
/// This command is useful for debugging your setup. It prints the fully resolved
/// configuration, showing the combined result of your `shopware-lsp.toml` file, any
/// environment variables, and the built-in default values.
#[derive(Parser, Debug)]
#[command(
    name = "config",
    about = "Display the current configuration that shopware-lsp is using.",
    long_about = "Display the final, merged configuration that shopware-lsp is using for this workspace.\n\n\
                  This command is invaluable for debugging your setup. It shows you the\n\
                  complete configuration that results from combining:\n\
                  • Built-in default values\n\
                  • Project configuration from ./shopware-lsp.toml\n\
                  • Environment variables (SHOPWARE_LSP_*)\n\
                  • Command-line overrides\n\n\
                  Use --default to see what the defaults would be without any configuration\n\
                  files or environment variables."
)]
pub struct ConfigCommand {
    /// Show the default configuration values instead of the current ones.
    ///
    /// This ignores any configuration files and environment variables,
    /// showing only the built-in defaults that shopware-lsp would use if no
    /// configuration was provided.
    #[arg(long, default_value_t = false)]
    default: bool,
}

impl ConfigCommand {
    pub fn execute(self, configuration: Configuration) -> Result<ExitCode, Error> {
        let json = if self.default {
            serde_json::to_string_pretty(&Configuration::from_workspace(CURRENT_DIR.clone()))?
        } else {
            serde_json::to_string_pretty(&configuration)?
        };

        println!("{json}");

        Ok(ExitCode::SUCCESS)
    }
}
