//! Recursive script loading and inheritance merging.

use stencil_config::{Parameters, Registries};
use stencil_core::{
    ContentType, DOCUMENT_EXTENSIONS, Error, Resource, ResourceKind, ResourceLocator, Result,
    from_value, parse_document,
};

use crate::manifest::Manifest;

/// Everything the loader needs besides the script name itself.
pub struct LoadOptions<'a> {
    pub locator: &'a ResourceLocator,
    pub registries: &'a Registries,
    /// Caller-supplied default runtime parameters, merged into every
    /// loaded manifest.
    pub parameters: &'a Parameters,
}

/// Load, prepare, and merge a script manifest and everything it inherits.
pub fn load_script(name: &str, opts: &LoadOptions<'_>) -> Result<Manifest> {
    let mut chain = Vec::new();
    load_recursive(name, opts, None, &mut chain)
}

fn load_recursive(
    name: &str,
    opts: &LoadOptions<'_>,
    root_config: Option<&str>,
    chain: &mut Vec<String>,
) -> Result<Manifest> {
    let resource = opts
        .locator
        .require(name, ResourceKind::Script, DOCUMENT_EXTENSIONS)?;

    if chain.contains(&resource.name) {
        let mut cycle = chain.clone();
        cycle.push(resource.name.clone());
        return Err(Box::new(Error::InheritanceCycle {
            chain: cycle.join(" -> "),
        }));
    }

    chain.push(resource.name.clone());
    let result = load_resource(&resource, opts, root_config, chain);
    chain.pop();

    // Wrap everything raised beneath this manifest with its resource name,
    // producing a breadcrumb trail through the inheritance recursion.
    result.map_err(|e| Error::invalid_script(&resource.name, e))
}

fn load_resource(
    resource: &Resource,
    opts: &LoadOptions<'_>,
    root_config: Option<&str>,
    chain: &mut Vec<String>,
) -> Result<Manifest> {
    let content_type = ContentType::from_name(&resource.name).ok_or_else(|| {
        Box::new(Error::UnsupportedFormat {
            name: resource.name.clone(),
        })
    })?;

    let document = parse_document(&resource.content, content_type, &resource.name)?;
    let mut manifest: Manifest = from_value(document, &resource.name)?;
    manifest.set_name(&resource.name);
    manifest.parameters_mut().merge(opts.parameters);
    manifest.prepare(opts.registries, opts.locator)?;

    // Every manifest reachable through `inherits` must declare the same
    // config type as the root of the load.
    let root_type = root_config.unwrap_or(manifest.config_type());
    if let Some(root) = root_config {
        if manifest.config_type() != root {
            return Err(Box::new(Error::SchemaMismatch {
                inherited: manifest.config_type().to_string(),
                root: root.to_string(),
            }));
        }
    }

    let mut inherited_items = Vec::new();
    let mut inherited_editors = Vec::new();
    for parent in manifest.inherits().to_vec() {
        let inherited = load_recursive(&parent, opts, Some(root_type), chain)?;
        let (items, editors) = inherited.into_merge_parts();
        inherited_items.extend(items);
        inherited_editors.extend(editors);
    }
    manifest.splice_front(inherited_items, inherited_editors);

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use stencil_config::{
        ConfigTree, Generator, NodeId, NodeSchema, Registries, collection, field,
    };
    use stencil_core::{ResourceBundle, Result as CoreResult};

    use super::*;

    fn property_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("property")
            .label("Property")
            .key("name")
            .fields(&[field("name").mandatory().unique()]);
        &SCHEMA
    }

    fn entity_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("entity")
            .fields(&[field("name").mandatory()])
            .collections(&[collection("properties", property_schema)]);
        &SCHEMA
    }

    fn other_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("other");
        &SCHEMA
    }

    #[derive(Debug)]
    struct EntityGenerator;

    impl Generator for EntityGenerator {
        fn config_schema(&self) -> &'static str {
            "entity"
        }

        fn select(&self, _tree: &ConfigTree) -> CoreResult<Vec<NodeId>> {
            Ok(vec![ConfigTree::ROOT])
        }
    }

    struct NoopEditor;
    impl stencil_config::ConfigEditor for NoopEditor {}

    fn registries() -> Registries {
        let mut registries = Registries::new();
        registries.register_schema("entity", entity_schema);
        registries.register_schema("other", other_schema);
        registries.register_generator("entity", || Box::new(EntityGenerator));
        registries.register_editor("upper", || Box::new(NoopEditor));
        registries.register_editor("audit", || Box::new(NoopEditor));
        registries.register_editor("main", || Box::new(NoopEditor));
        registries
    }

    fn templates() -> ResourceBundle {
        ResourceBundle::new("templates").with("entity.hbs", "{{name}}")
    }

    fn load(scripts: ResourceBundle) -> Result<Manifest> {
        let locator = stencil_core::ResourceLocator::new()
            .with_bundle(scripts)
            .with_bundle(templates());
        let registries = registries();
        let parameters = Parameters::new();
        load_script(
            "root",
            &LoadOptions {
                locator: &locator,
                registries: &registries,
                parameters: &parameters,
            },
        )
    }

    fn item_yaml(text: &str) -> String {
        format!("  - type: entity\n    template: entity\n    file: '{{{{name}}}}.txt'\n    text: {text}\n")
    }

    #[test]
    fn script_not_found() {
        let err = load(ResourceBundle::new("scripts")).unwrap_err();
        assert_eq!(err.to_string(), "script 'root' does not exist");
    }

    #[test]
    fn unsupported_format_is_wrapped() {
        let locator = stencil_core::ResourceLocator::new()
            .with_bundle(ResourceBundle::new("scripts").with("root.xml", "<x/>"));
        let registries = registries();
        let parameters = Parameters::new();
        let err = load_script(
            "root.xml",
            &LoadOptions {
                locator: &locator,
                registries: &registries,
                parameters: &parameters,
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.xml' is invalid: stream content type of 'root.xml' is not supported"
        );
    }

    #[test]
    fn empty_script_is_wrapped() {
        let scripts = ResourceBundle::new("scripts").with("root.yaml", "");
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: stream 'root.yaml' is empty"
        );
    }

    #[test]
    fn missing_config_type_is_mandatory() {
        let scripts =
            ResourceBundle::new("scripts").with("root.yaml", "generators: []\n");
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: [configType] value is mandatory"
        );
    }

    #[test]
    fn unregistered_config_type_fails() {
        let scripts =
            ResourceBundle::new("scripts").with("root.yaml", "configType: unknown\n");
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: config type 'unknown' is not registered"
        );
    }

    #[test]
    fn item_without_generator_type_fails() {
        let scripts = ResourceBundle::new("scripts").with(
            "root.yaml",
            "configType: entity\ngenerators:\n  - template: entity\n    file: out.txt\n",
        );
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: [Generate.type] value is mandatory"
        );
    }

    #[test]
    fn missing_template_resource_fails() {
        let scripts = ResourceBundle::new("scripts").with(
            "root.yaml",
            "configType: entity\ngenerators:\n  - type: entity\n    template: nope\n    file: out.txt\n",
        );
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: template 'nope' does not exist"
        );
    }

    #[test]
    fn extra_properties_become_runtime_parameters() {
        let scripts = ResourceBundle::new("scripts").with(
            "root.yaml",
            "configType: entity\ngenerators:\n  - type: entity\n    template: entity\n    file: out.txt\n    company: Xxx\n    appName: Yyy\n",
        );
        let manifest = load(scripts).unwrap();
        let item = &manifest.generators()[0];
        assert_eq!(item.parameters().len(), 3);
        assert_eq!(item.parameters().get_bool("isGenOnce"), Some(false));
        assert_eq!(item.parameters().get_str("company"), Some("Xxx"));
        assert_eq!(item.parameters().get_str("appName"), Some("Yyy"));
        assert_eq!(item.template(), "entity.hbs");
    }

    #[test]
    fn inherited_items_merge_ahead_in_listed_order() {
        let scripts = ResourceBundle::new("scripts")
            .with(
                "root.yaml",
                format!("configType: entity\ninherits: [a, b]\ngenerators:\n{}", item_yaml("own")),
            )
            .with(
                "a.yaml",
                format!("configType: entity\ngenerators:\n{}", item_yaml("from-a")),
            )
            .with(
                "b.yaml",
                format!("configType: entity\ngenerators:\n{}", item_yaml("from-b")),
            );
        let manifest = load(scripts).unwrap();

        let texts: Vec<_> = manifest
            .generators()
            .iter()
            .map(|g| g.text().unwrap())
            .collect();
        assert_eq!(texts, ["from-a", "from-b", "own"]);
    }

    #[test]
    fn inherited_editors_accumulate_ahead_of_the_roots() {
        let scripts = ResourceBundle::new("scripts")
            .with(
                "root.yaml",
                "configType: entity\ninherits: [a, b]\neditorType: main\n",
            )
            .with("a.yaml", "configType: entity\neditorType: upper\n")
            .with("b.yaml", "configType: entity\neditorType: audit\n");
        let manifest = load(scripts).unwrap();
        assert_eq!(manifest.editors(), ["upper", "audit", "main"]);
    }

    #[test]
    fn unregistered_editor_fails() {
        let scripts = ResourceBundle::new("scripts")
            .with("root.yaml", "configType: entity\neditorType: nope\n");
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: editor 'nope' is not registered"
        );
    }

    #[test]
    fn schema_mismatch_in_inherited_script_is_fatal() {
        let scripts = ResourceBundle::new("scripts")
            .with("root.yaml", "configType: entity\ninherits: [a]\n")
            .with("a.yaml", "configType: other\n");
        let err = load(scripts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "script 'root.yaml' is invalid: script 'a.yaml' is invalid: inherited config type 'other' must be the same as the root config type 'entity'"
        );
    }

    #[test]
    fn inheritance_cycle_is_detected() {
        let scripts = ResourceBundle::new("scripts")
            .with("root.yaml", "configType: entity\ninherits: [a]\n")
            .with("a.yaml", "configType: entity\ninherits: [root.yaml]\n");
        let err = load(scripts).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("inheritance cycle detected"), "{message}");
        assert!(message.contains("root.yaml -> a.yaml -> root.yaml"), "{message}");
    }
}
