//! Script manifest model and loader for the stencil generator.
//!
//! A script manifest declares the configuration schema its generators run
//! against, an ordered list of generator items, optional editors, and a
//! list of further manifests to inherit. Loading is recursive: inherited
//! manifests are merged ahead of the declaring manifest's own items, and
//! every error is wrapped with the resource name it originated from.

mod item;
mod loader;
mod manifest;

pub use item::GeneratorItem;
pub use loader::{LoadOptions, load_script};
pub use manifest::Manifest;
