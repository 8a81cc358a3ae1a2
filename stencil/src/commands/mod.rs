mod check;
mod completions;
mod generate;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use generate::GenerateCommand;

use stencil_core::Error;

/// Print an error with pretty formatting and map it to an exit code:
/// 3 for a changes-found assertion failure, 2 for everything else.
pub(crate) fn report(error: Box<Error>) -> i32 {
    let code = if error.is_changes_found() { 3 } else { 2 };
    eprintln!("{:?}", miette::Report::new(*error));
    code
}

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version)]
#[command(about = "Generate artifacts from script manifests and handlebars templates")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> i32 {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script manifest against a configuration
    Generate(GenerateCommand),

    /// Load and validate a script manifest without generating
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
