use std::io;
use std::process::ExitCode;

use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;
use clap_complete::generate;

use crate::commands::CliArguments;
use crate::error::Error;

/// Generates a shell completion script for this CLI, written to stdout.
#[derive(Parser, Debug)]
#[command(
    name = "completions",
    about = "Generates shell completions.",
    long_about = r#"
The `completions` command prints a completion script for the given shell to stdout. Source it
from your shell's startup file, e.g. `shopware-lsp completions bash > /etc/bash_completion.d/shopware-lsp`.
"#
)]
pub struct CompletionsCommand {
    /// The shell to generate completions for.
    #[arg(value_enum)]
    shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) -> Result<ExitCode, Error> {
        let mut command = CliArguments::command();
        let name = command.get_name().to_string();
        generate(self.shell, &mut command, name, &mut io::stdout());

        Ok(ExitCode::SUCCESS)
    }
}
