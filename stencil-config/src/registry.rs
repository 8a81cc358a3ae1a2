//! Name-to-implementation registries.
//!
//! Script manifests name their config type, generators, and editors by
//! string key; resolution goes through a [`Registries`] value. Entries come
//! from two places: process-wide `inventory` submissions collected at
//! startup, and explicit `register_*` calls for caller-supplied wiring.

use std::collections::HashMap;

use crate::editor::ConfigEditor;
use crate::generator::Generator;
use crate::schema::NodeSchema;

/// Process-wide schema registration.
pub struct SchemaRegistration {
    pub name: &'static str,
    pub schema: fn() -> &'static NodeSchema,
}

/// Process-wide generator registration.
pub struct GeneratorRegistration {
    pub name: &'static str,
    pub factory: fn() -> Box<dyn Generator>,
}

/// Process-wide editor registration.
pub struct EditorRegistration {
    pub name: &'static str,
    pub factory: fn() -> Box<dyn ConfigEditor>,
}

inventory::collect!(SchemaRegistration);
inventory::collect!(GeneratorRegistration);
inventory::collect!(EditorRegistration);

/// The resolved lookup tables used while loading scripts and configs.
#[derive(Default)]
pub struct Registries {
    schemas: HashMap<String, fn() -> &'static NodeSchema>,
    generators: HashMap<String, fn() -> Box<dyn Generator>>,
    editors: HashMap<String, fn() -> Box<dyn ConfigEditor>>,
}

impl Registries {
    /// Empty registries, for fully caller-supplied wiring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries populated from every `inventory` submission linked into
    /// the process, including the built-in `root` generator.
    pub fn from_inventory() -> Self {
        let mut registries = Self::new();
        for reg in inventory::iter::<SchemaRegistration> {
            registries.schemas.insert(reg.name.to_string(), reg.schema);
        }
        for reg in inventory::iter::<GeneratorRegistration> {
            registries
                .generators
                .insert(reg.name.to_string(), reg.factory);
        }
        for reg in inventory::iter::<EditorRegistration> {
            registries.editors.insert(reg.name.to_string(), reg.factory);
        }
        registries
    }

    pub fn register_schema(&mut self, name: impl Into<String>, schema: fn() -> &'static NodeSchema) {
        self.schemas.insert(name.into(), schema);
    }

    pub fn register_generator(
        &mut self,
        name: impl Into<String>,
        factory: fn() -> Box<dyn Generator>,
    ) {
        self.generators.insert(name.into(), factory);
    }

    pub fn register_editor(
        &mut self,
        name: impl Into<String>,
        factory: fn() -> Box<dyn ConfigEditor>,
    ) {
        self.editors.insert(name.into(), factory);
    }

    pub fn schema(&self, name: &str) -> Option<&'static NodeSchema> {
        self.schemas.get(name).map(|f| f())
    }

    pub fn generator(&self, name: &str) -> Option<Box<dyn Generator>> {
        self.generators.get(name).map(|f| f())
    }

    pub fn editor(&self, name: &str) -> Option<Box<dyn ConfigEditor>> {
        self.editors.get(name).map(|f| f())
    }

    pub fn has_editor(&self, name: &str) -> bool {
        self.editors.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeSchema, field};

    fn sample_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("sample").fields(&[field("name")]);
        &SCHEMA
    }

    #[test]
    fn caller_supplied_registration_resolves() {
        let mut registries = Registries::new();
        registries.register_schema("sample", sample_schema);

        assert_eq!(registries.schema("sample").unwrap().name, "sample");
        assert!(registries.schema("other").is_none());
        assert!(registries.generator("root").is_none());
    }

    #[test]
    fn inventory_carries_the_builtin_root_generator() {
        let registries = Registries::from_inventory();
        let generator = registries.generator("root").unwrap();
        assert_eq!(generator.config_schema(), "*");
    }
}
