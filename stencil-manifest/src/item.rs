use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use stencil_config::{Generator, Parameters, Registries};
use stencil_core::{Error, Resource, ResourceKind, ResourceLocator, Result, TEMPLATE_EXTENSIONS};

/// One generation step: binds a template to a generator and an output
/// naming rule. Unrecognized keys are captured and promoted to runtime
/// parameters during preparation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorItem {
    #[serde(rename = "type")]
    generator_type: Option<String>,

    /// Template resource name; resolved against the locator at prepare.
    template: Option<String>,

    /// Output file name pattern (handlebars syntax).
    file: Option<String>,

    /// Optional output directory pattern (handlebars syntax).
    directory: Option<String>,

    /// Generate the file only where it does not already exist.
    #[serde(default)]
    gen_once: bool,

    /// Wildcard pattern checked instead of the exact file name.
    gen_once_pattern: Option<String>,

    /// Free-form annotation written to the log.
    text: Option<String>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,

    #[serde(skip)]
    parameters: Parameters,

    #[serde(skip)]
    generator: Option<Box<dyn Generator>>,

    #[serde(skip)]
    resolved_template: Option<String>,
}

impl GeneratorItem {
    /// Resolve the generator and template and seed the runtime parameters.
    pub(crate) fn prepare(
        &mut self,
        registries: &Registries,
        locator: &ResourceLocator,
        config_type: &str,
    ) -> Result<()> {
        let type_name = self
            .generator_type
            .as_deref()
            .ok_or_else(|| Error::missing_value("Generate.type"))?;

        let generator = registries
            .generator(type_name)
            .ok_or_else(|| {
                Box::new(Error::GeneratorNotRegistered {
                    name: type_name.to_string(),
                })
            })?;

        let schema = generator.config_schema();
        if schema != "*" && schema != config_type {
            return Err(Box::new(Error::GeneratorSchemaMismatch {
                name: type_name.to_string(),
                schema: schema.to_string(),
                expected: config_type.to_string(),
            }));
        }
        self.generator = Some(generator);

        let template = self
            .template
            .as_deref()
            .ok_or_else(|| Error::missing_value("Generate.template"))?;
        let resource = locator
            .locate(template, ResourceKind::Template, TEMPLATE_EXTENSIONS)?
            .ok_or_else(|| Error::not_found(ResourceKind::Template, template))?;
        self.resolved_template = Some(resource.name);

        if self.file.is_none() {
            return Err(Error::missing_value("Generate.file"));
        }

        self.parameters.insert("isGenOnce", self.gen_once);
        for (key, value) in &self.extra {
            self.parameters.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    /// The resolved generator. Items are always prepared by the loader.
    pub fn generator(&self) -> &dyn Generator {
        self.generator
            .as_deref()
            .expect("generator item is prepared by the loader")
    }

    /// The resolved template resource name.
    pub fn template(&self) -> &str {
        self.resolved_template
            .as_deref()
            .expect("generator item is prepared by the loader")
    }

    /// Fetch the resolved template's content.
    pub fn template_resource(&self, locator: &ResourceLocator) -> Result<Resource> {
        locator.require(self.template(), ResourceKind::Template, &[])
    }

    pub fn file(&self) -> &str {
        self.file.as_deref().unwrap_or_default()
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn is_gen_once(&self) -> bool {
        self.gen_once
    }

    pub fn gen_once_pattern(&self) -> Option<&str> {
        self.gen_once_pattern.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Runtime parameters merged into the config root before this item runs.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Extension data: manifest keys not mapped by the item.
    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }
}
