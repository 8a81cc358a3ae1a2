//! Value-level schema descriptors for configuration nodes.
//!
//! A node type is described by a static [`NodeSchema`] table rather than
//! derived metadata: the preparer walks the descriptors generically to
//! validate fields, enforce uniqueness, and recurse into collections.

use std::fmt;

use crate::prepare::PrepareContext;
use stencil_core::Result;

/// Schema-specific preparation hook, run after declarative validation and
/// before the node's collections are prepared.
pub type PrepareFn = fn(&mut PrepareContext<'_>) -> Result<()>;

/// Describes one configuration node type.
pub struct NodeSchema {
    /// Registry name, e.g. `"entity"`.
    pub name: &'static str,
    /// Label used in qualified key names, e.g. `"Property"`. Root schemas
    /// typically have none so error paths start at the failing child.
    pub label: Option<&'static str>,
    /// Field whose value is embedded in the qualified key name.
    pub key: Option<&'static str>,
    pub fields: &'static [FieldSchema],
    pub collections: &'static [CollectionSchema],
    pub prepare: Option<PrepareFn>,
}

impl NodeSchema {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            label: None,
            key: None,
            fields: &[],
            collections: &[],
            prepare: None,
        }
    }

    pub const fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub const fn key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    pub const fn fields(mut self, fields: &'static [FieldSchema]) -> Self {
        self.fields = fields;
        self
    }

    pub const fn collections(mut self, collections: &'static [CollectionSchema]) -> Self {
        self.collections = collections;
        self
    }

    pub const fn prepare(mut self, prepare: PrepareFn) -> Self {
        self.prepare = Some(prepare);
        self
    }

    pub fn collection(&self, name: &str) -> Option<&'static CollectionSchema> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for NodeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Describes one declared scalar field.
pub struct FieldSchema {
    pub name: &'static str,
    pub mandatory: bool,
    /// Allowed values; empty means unconstrained.
    pub options: &'static [&'static str],
    /// Enforced per enclosing collection instance, not tree-wide.
    pub unique: bool,
}

/// Start a field descriptor.
pub const fn field(name: &'static str) -> FieldSchema {
    FieldSchema {
        name,
        mandatory: false,
        options: &[],
        unique: false,
    }
}

impl FieldSchema {
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Describes one declared child collection.
pub struct CollectionSchema {
    pub name: &'static str,
    pub mandatory: bool,
    /// Deferred so schemas may reference themselves or each other.
    pub schema: fn() -> &'static NodeSchema,
}

/// Start a collection descriptor.
pub const fn collection(name: &'static str, schema: fn() -> &'static NodeSchema) -> CollectionSchema {
    CollectionSchema {
        name,
        mandatory: false,
        schema,
    }
}

impl CollectionSchema {
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}
