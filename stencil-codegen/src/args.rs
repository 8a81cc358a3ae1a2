use std::path::PathBuf;

use serde_json::Value;

use stencil_config::{Parameters, Registries};
use stencil_core::{ResourceBundle, ResourceLocator};

/// The run configuration consumed by the pipeline; the CLI flags map onto
/// this one-to-one.
pub struct RunArgs {
    /// Script resource name to load the manifest from.
    pub script: Option<String>,
    /// Configuration resource name.
    pub config: Option<String>,
    /// Directory generated artifacts are written under.
    pub output_dir: PathBuf,
    pub locator: ResourceLocator,
    pub registries: Registries,
    /// Default runtime parameters merged into every loaded manifest.
    pub parameters: Parameters,
    /// Fail with a changes-found error instead of writing anything.
    pub expect_no_changes: bool,
    /// Dry run: compare and count, never create or write.
    pub simulation: bool,
}

impl RunArgs {
    pub fn new() -> Self {
        Self {
            script: None,
            config: None,
            output_dir: PathBuf::from("."),
            locator: ResourceLocator::new(),
            registries: Registries::from_inventory(),
            parameters: Parameters::new(),
            expect_no_changes: false,
            simulation: false,
        }
    }

    pub fn script(mut self, name: impl Into<String>) -> Self {
        self.script = Some(name.into());
        self
    }

    pub fn config(mut self, name: impl Into<String>) -> Self {
        self.config = Some(name.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn bundle(mut self, bundle: ResourceBundle) -> Self {
        self.locator.add_bundle(bundle);
        self
    }

    pub fn registries(mut self, registries: Registries) -> Self {
        self.registries = registries;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    pub fn expect_no_changes(mut self, expect_no_changes: bool) -> Self {
        self.expect_no_changes = expect_no_changes;
        self
    }

    pub fn simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }
}

impl Default for RunArgs {
    fn default() -> Self {
        Self::new()
    }
}
