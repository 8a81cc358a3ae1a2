//! Schema-typed configuration tree for the stencil generator.
//!
//! A configuration document is parsed into a generic node, built into an
//! arena-backed [`ConfigTree`] against a registered [`NodeSchema`], and
//! prepared (validated and defaulted) top-down before generation. Editors
//! hook in before and after preparation; generators select the nodes each
//! template is applied to.

mod editor;
mod generator;
mod params;
mod prepare;
mod registry;
mod schema;
mod tree;

pub use editor::ConfigEditor;
pub use generator::{Generator, RootGenerator};
pub use params::Parameters;
pub use prepare::{PrepareContext, prepare_tree};
pub use registry::{
    EditorRegistration, GeneratorRegistration, Registries, SchemaRegistration,
};
pub use schema::{CollectionSchema, FieldSchema, NodeSchema, PrepareFn, collection, field};
pub use tree::{ConfigTree, Node, NodeId};
