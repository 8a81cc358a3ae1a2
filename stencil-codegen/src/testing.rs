//! Reusable fixtures for pipeline tests: a small entity/property schema,
//! generators and editors over it, and in-memory script/template bundles.

use serde_json::Value;

use stencil_config::{
    ConfigEditor, ConfigTree, Generator, NodeId, NodeSchema, Registries, collection, field,
};
use stencil_core::{Error, ResourceBundle, Result};

pub fn property_schema() -> &'static NodeSchema {
    static SCHEMA: NodeSchema = NodeSchema::new("property")
        .label("Property")
        .key("name")
        .fields(&[
            field("name").mandatory().unique(),
            field("type").options(&["string", "int", "decimal"]),
            field("isNullable"),
            field("count"),
            field("amount"),
        ])
        .prepare(|ctx| {
            ctx.default_str("type", "string");
            Ok(())
        });
    &SCHEMA
}

pub fn entity_schema() -> &'static NodeSchema {
    static SCHEMA: NodeSchema = NodeSchema::new("entity")
        .fields(&[field("name").mandatory()])
        .collections(&[collection("properties", property_schema)]);
    &SCHEMA
}

/// Applies the template to the entity root and each of its properties.
#[derive(Debug)]
pub struct EntityGenerator;

impl Generator for EntityGenerator {
    fn config_schema(&self) -> &'static str {
        "entity"
    }

    fn select(&self, tree: &ConfigTree) -> Result<Vec<NodeId>> {
        let mut selected = vec![ConfigTree::ROOT];
        selected.extend(tree.children(ConfigTree::ROOT, "properties"));
        Ok(selected)
    }
}

/// Uppercases the entity name before validation runs.
pub struct UppercaseEditor;

impl ConfigEditor for UppercaseEditor {
    fn before_prepare(&self, tree: &mut ConfigTree) -> Result<()> {
        let name = tree
            .root()
            .get_str("name")
            .ok_or_else(|| Error::invalid("name", "editor requires a name"))?
            .to_uppercase();
        tree.node_mut(ConfigTree::ROOT).set("name", name);
        Ok(())
    }
}

fn mark(tree: &mut ConfigTree, entry: &str) {
    let log = tree
        .node_mut(ConfigTree::ROOT)
        .custom_mut()
        .entry("editLog".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(entries) = log {
        entries.push(Value::String(entry.to_string()));
    }
}

/// Records hook invocations in the root's custom properties.
pub struct FirstEditor;

impl ConfigEditor for FirstEditor {
    fn before_prepare(&self, tree: &mut ConfigTree) -> Result<()> {
        mark(tree, "first:before");
        Ok(())
    }

    fn after_prepare(&self, tree: &mut ConfigTree) -> Result<()> {
        mark(tree, "first:after");
        Ok(())
    }
}

pub struct SecondEditor;

impl ConfigEditor for SecondEditor {
    fn before_prepare(&self, tree: &mut ConfigTree) -> Result<()> {
        mark(tree, "second:before");
        Ok(())
    }

    fn after_prepare(&self, tree: &mut ConfigTree) -> Result<()> {
        mark(tree, "second:after");
        Ok(())
    }
}

/// Registries covering the fixtures plus the inventory built-ins.
pub fn registries() -> Registries {
    let mut registries = Registries::from_inventory();
    registries.register_schema("entity", entity_schema);
    registries.register_generator("entity", || Box::new(EntityGenerator));
    registries.register_editor("uppercase", || Box::new(UppercaseEditor));
    registries.register_editor("first", || Box::new(FirstEditor));
    registries.register_editor("second", || Box::new(SecondEditor));
    registries
}

pub fn scripts() -> ResourceBundle {
    ResourceBundle::new("scripts")
        .with(
            "entity.yaml",
            r#"configType: entity
generators:
  - type: entity
    template: entity
    file: '{{name}}.txt'
"#,
        )
        .with(
            "entity-once.yaml",
            r#"configType: entity
generators:
  - type: entity
    template: entity
    file: '{{name}}.txt'
    genOnce: true
"#,
        )
        .with(
            "entity-params.yaml",
            r#"configType: entity
generators:
  - type: root
    template: params
    file: params.txt
    company: Xxx
    appName: Yyy
"#,
        )
        .with(
            "entity-editors.yaml",
            r#"configType: entity
inherits: [entity-editor-base]
editorType: second
generators: []
"#,
        )
        .with(
            "entity-editor-base.yaml",
            r#"configType: entity
editorType: first
generators: []
"#,
        )
        .with(
            "entity-uppercase.yaml",
            r#"configType: entity
editorType: uppercase
generators:
  - type: root
    template: entity
    file: '{{name}}.txt'
"#,
        )
}

pub fn templates() -> ResourceBundle {
    ResourceBundle::new("templates")
        .with("entity.hbs", "entity: {{name}}\nroot: {{root.name}}\n")
        .with(
            "params.hbs",
            "company: {{root.runtimeParameters.company}}\nappName: {{root.runtimeParameters.appName}}\n",
        )
}

/// A three-property entity configuration document.
pub fn person_config() -> &'static str {
    r#"name: Person
properties:
  - name: code
  - name: text
    type: string
  - name: amount
    type: decimal
    count: 4
    amount: 3.95
"#
}
