use std::path::PathBuf;

use clap::Args;

use stencil_codegen::{Pipeline, RunArgs};

use super::report;

#[derive(Args)]
pub struct GenerateCommand {
    /// Script manifest resource name
    #[arg(short, long)]
    pub script: String,

    /// Configuration resource name
    #[arg(short, long)]
    pub config: String,

    /// Output directory path (defaults to the current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Runtime parameter expressed as a 'name=value' pair (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Fail when generation would change any artifact (e.g. in a build pipeline)
    #[arg(long)]
    pub expect_no_changes: bool,

    /// Simulate: compare and count without creating or updating artifacts
    #[arg(long)]
    pub simulation: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> i32 {
        let mut args = RunArgs::new()
            .script(&self.script)
            .config(&self.config)
            .output_dir(&self.output)
            .expect_no_changes(self.expect_no_changes)
            .simulation(self.simulation);

        for param in &self.params {
            match param.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    args = args.parameter(name, value);
                }
                _ => {
                    eprintln!("invalid --param '{param}': expected name=value");
                    return 1;
                }
            }
        }

        let pipeline = match Pipeline::new(args) {
            Ok(pipeline) => pipeline,
            Err(e) => return report(e),
        };

        match pipeline.generate() {
            Ok(stats) => {
                println!("{stats}");
                0
            }
            Err(e) => report(e),
        }
    }
}
