use std::io;

use clap::{Args, CommandFactory};

use super::Cli;

#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn run(&self) -> i32 {
        let mut cmd = Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "stencil", &mut io::stdout());
        0
    }
}
