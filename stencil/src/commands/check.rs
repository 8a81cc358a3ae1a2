use clap::Args;

use stencil_codegen::{Pipeline, RunArgs};

use super::report;

#[derive(Args)]
pub struct CheckCommand {
    /// Script manifest resource name
    #[arg(short, long)]
    pub script: String,
}

impl CheckCommand {
    /// Load and prepare the manifest (and everything it inherits) without
    /// touching any configuration or output.
    pub fn run(&self) -> i32 {
        let args = RunArgs::new().script(&self.script);
        let pipeline = match Pipeline::new(args) {
            Ok(pipeline) => pipeline,
            Err(e) => return report(e),
        };

        let manifest = pipeline.manifest();
        println!("✓ {} is valid\n", manifest.name());
        println!("  config type: {}", manifest.config_type());

        let items = manifest.generators();
        println!(
            "  {} generator{}:",
            items.len(),
            if items.len() == 1 { "" } else { "s" }
        );
        for item in items {
            match item.text() {
                Some(text) => println!("    {} -> {} ({})", item.template(), item.file(), text),
                None => println!("    {} -> {}", item.template(), item.file()),
            }
        }

        if !manifest.editors().is_empty() {
            println!("  editors: {}", manifest.editors().join(", "));
        }

        0
    }
}
