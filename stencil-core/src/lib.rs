//! Core building blocks for the stencil generator.
//!
//! This crate provides the shared error taxonomy, the resource
//! locator used to probe for scripts/configs/templates, and the
//! structured-document (YAML/JSON) parsing into a generic node.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod document;
mod error;
mod resource;

pub use document::{ContentType, from_value, parse_document};
pub use error::{Error, Result};
pub use resource::{
    DOCUMENT_EXTENSIONS, Resource, ResourceBundle, ResourceKind, ResourceLocator,
    TEMPLATE_EXTENSIONS,
};
