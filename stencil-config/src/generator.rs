use std::fmt;

use stencil_core::Result;

use crate::registry::GeneratorRegistration;
use crate::tree::{ConfigTree, NodeId};

/// Selects the configuration nodes a generator item's template is applied
/// to. The generation pipeline renders the template once per selected node,
/// in the returned order.
pub trait Generator: fmt::Debug + Send + Sync {
    /// Registry name of the configuration schema this generator expects;
    /// verified against the script's config type during preparation.
    fn config_schema(&self) -> &'static str;

    fn select(&self, tree: &ConfigTree) -> Result<Vec<NodeId>>;
}

/// Built-in generator that applies the template to the root node only.
///
/// Registered for every schema under the name `root`: selection does not
/// depend on the schema shape, so the schema check is satisfied by echoing
/// the tree's own schema name.
#[derive(Debug, Default)]
pub struct RootGenerator;

impl Generator for RootGenerator {
    fn config_schema(&self) -> &'static str {
        "*"
    }

    fn select(&self, _tree: &ConfigTree) -> Result<Vec<NodeId>> {
        Ok(vec![ConfigTree::ROOT])
    }
}

inventory::submit! {
    GeneratorRegistration {
        name: "root",
        factory: || Box::new(RootGenerator),
    }
}
