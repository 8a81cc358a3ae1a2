use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use stencil_config::{NodeSchema, Parameters, Registries};
use stencil_core::{Error, ResourceLocator, Result};

use crate::item::GeneratorItem;

/// The root of a script document: the configuration schema name, the
/// ordered generator items, optional editor, and manifests to inherit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    config_type: Option<String>,

    /// Additional script resource names to inherit, in merge order.
    #[serde(default)]
    inherits: Vec<String>,

    editor_type: Option<String>,

    #[serde(default)]
    generators: Vec<GeneratorItem>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,

    #[serde(skip)]
    schema: Option<&'static NodeSchema>,

    #[serde(skip)]
    parameters: Parameters,

    #[serde(skip)]
    editors: Vec<String>,

    #[serde(skip)]
    name: String,
}

impl Manifest {
    /// Resolve the config type and editor, then prepare every item.
    pub(crate) fn prepare(
        &mut self,
        registries: &Registries,
        locator: &ResourceLocator,
    ) -> Result<()> {
        let config_type = self
            .config_type
            .as_deref()
            .ok_or_else(|| Error::missing_value("configType"))?;

        let schema = registries.schema(config_type).ok_or_else(|| {
            Box::new(Error::SchemaNotRegistered {
                name: config_type.to_string(),
            })
        })?;
        self.schema = Some(schema);

        if let Some(editor) = &self.editor_type {
            if !registries.has_editor(editor) {
                return Err(Box::new(Error::EditorNotRegistered {
                    name: editor.clone(),
                }));
            }
            self.editors.push(editor.clone());
        }

        for item in &mut self.generators {
            item.prepare(registries, locator, config_type)?;
        }

        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Tear an inherited manifest apart into the pieces merged onto the root.
    pub(crate) fn into_merge_parts(self) -> (Vec<GeneratorItem>, Vec<String>) {
        (self.generators, self.editors)
    }

    /// Prepend inherited items and editor registrations; the manifest's own
    /// entries remain last.
    pub(crate) fn splice_front(&mut self, mut items: Vec<GeneratorItem>, mut editors: Vec<String>) {
        items.append(&mut self.generators);
        self.generators = items;
        editors.append(&mut self.editors);
        self.editors = editors;
    }

    pub(crate) fn inherits(&self) -> &[String] {
        &self.inherits
    }

    /// Resource name the manifest was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared config type name.
    pub fn config_type(&self) -> &str {
        self.config_type.as_deref().unwrap_or_default()
    }

    /// The resolved configuration schema. Manifests are always prepared by
    /// the loader.
    pub fn schema(&self) -> &'static NodeSchema {
        self.schema.expect("manifest is prepared by the loader")
    }

    /// Merged generator items, inherited first, in execution order.
    pub fn generators(&self) -> &[GeneratorItem] {
        &self.generators
    }

    /// Accumulated editor registrations, inherited first.
    pub fn editors(&self) -> &[String] {
        &self.editors
    }

    /// Script-level runtime parameters (caller-supplied defaults).
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// Extension data: script keys not mapped by the manifest.
    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }
}
