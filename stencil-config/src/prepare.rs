//! Top-down preparation of a configuration tree.
//!
//! For every node, in order: declarative validation against the schema
//! descriptors, the schema's own prepare hook, then each declared
//! collection with per-collection uniqueness tracking and recursive
//! preparation of its children.

use std::collections::HashSet;

use serde_json::Value;

use stencil_core::{Error, Result};

use crate::tree::{ConfigTree, Node, NodeId};

/// Prepare the whole tree, starting at the root.
pub fn prepare_tree(tree: &mut ConfigTree) -> Result<()> {
    prepare_node(tree, ConfigTree::ROOT)?;
    tree.set_prepared();
    Ok(())
}

fn prepare_node(tree: &mut ConfigTree, id: NodeId) -> Result<()> {
    validate_node(tree, id)?;

    if let Some(prepare) = tree.node(id).schema().prepare {
        let mut ctx = PrepareContext { tree, id };
        prepare(&mut ctx)?;
    }

    let schema = tree.node(id).schema();
    for collection in schema.collections {
        let child_schema = (collection.schema)();
        let unique_fields: Vec<&str> = child_schema
            .fields
            .iter()
            .filter(|f| f.unique)
            .map(|f| f.name)
            .collect();

        let children: Vec<NodeId> = tree.children(id, collection.name).to_vec();
        let mut seen: Vec<HashSet<String>> = vec![HashSet::new(); unique_fields.len()];

        for child in children {
            for (i, field) in unique_fields.iter().enumerate() {
                if let Some(value) = tree.node(child).get(field) {
                    if !seen[i].insert(value.to_string()) {
                        return Err(Error::not_unique(
                            tree.qualified_path(child, Some(field)),
                            display_value(value),
                        ));
                    }
                }
            }
            prepare_node(tree, child)?;
        }
    }

    Ok(())
}

fn validate_node(tree: &ConfigTree, id: NodeId) -> Result<()> {
    let node = tree.node(id);
    let schema = node.schema();

    for field in schema.fields {
        let value = node.get(field.name);

        if field.mandatory && value.is_none() {
            return Err(Error::missing_value(tree.qualified_path(id, Some(field.name))));
        }

        if !field.options.is_empty() {
            if let Some(value) = value.and_then(Value::as_str) {
                if !field.options.contains(&value) {
                    return Err(Error::invalid_option(
                        tree.qualified_path(id, Some(field.name)),
                        value,
                        field.options,
                    ));
                }
            }
        }
    }

    for collection in schema.collections {
        if collection.mandatory && !node.collection_present(collection.name) {
            return Err(Error::missing_value(
                tree.qualified_path(id, Some(collection.name)),
            ));
        }
    }

    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Mutation surface handed to a schema's prepare hook.
pub struct PrepareContext<'t> {
    tree: &'t mut ConfigTree,
    id: NodeId,
}

impl PrepareContext<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &ConfigTree {
        self.tree
    }

    pub fn node(&self) -> &Node {
        self.tree.node(self.id)
    }

    pub fn node_mut(&mut self) -> &mut Node {
        self.tree.node_mut(self.id)
    }

    pub fn root(&self) -> &Node {
        self.tree.root()
    }

    /// Qualified path of a field on this node, for error reporting.
    pub fn path(&self, field: &str) -> String {
        self.tree.qualified_path(self.id, Some(field))
    }

    /// Default a field where the document omitted it.
    pub fn default_value(&mut self, field: &str, default: impl FnOnce() -> Value) {
        if self.node().get(field).is_none() {
            let value = default();
            self.node_mut().set(field, value);
        }
    }

    pub fn default_str(&mut self, field: &str, default: &str) {
        self.default_value(field, || Value::String(default.to_string()));
    }

    pub fn default_bool(&mut self, field: &str, default: bool) {
        self.default_value(field, || Value::Bool(default));
    }

    /// A validation error anchored at a field of this node.
    pub fn invalid(&self, field: &str, message: impl Into<String>) -> Box<Error> {
        Error::invalid(self.path(field), message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{NodeSchema, collection, field};

    fn property_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("property")
            .label("Property")
            .key("name")
            .fields(&[
                field("name").mandatory().unique(),
                field("type").options(&["string", "int", "decimal"]),
            ])
            .prepare(|ctx| {
                ctx.default_str("type", "string");
                Ok(())
            });
        &SCHEMA
    }

    fn group_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("group")
            .label("Group")
            .key("name")
            .fields(&[field("name").mandatory()])
            .collections(&[collection("properties", property_schema)]);
        &SCHEMA
    }

    fn entity_schema() -> &'static NodeSchema {
        static SCHEMA: NodeSchema = NodeSchema::new("entity")
            .fields(&[field("name").mandatory()])
            .collections(&[
                collection("properties", property_schema),
                collection("groups", group_schema),
            ]);
        &SCHEMA
    }

    fn build(doc: Value) -> ConfigTree {
        ConfigTree::build(doc, entity_schema()).unwrap()
    }

    #[test]
    fn missing_mandatory_field_names_the_path() {
        let mut tree = build(json!({ "properties": [{ "name": "a" }] }));
        let err = prepare_tree(&mut tree).unwrap_err();
        assert_eq!(err.to_string(), "[name] value is mandatory");
    }

    #[test]
    fn missing_mandatory_field_on_child_names_the_full_path() {
        let mut tree = build(json!({ "name": "Person", "properties": [{ "type": "int" }] }));
        let err = prepare_tree(&mut tree).unwrap_err();
        assert_eq!(err.to_string(), "[Property.name] value is mandatory");
    }

    #[test]
    fn invalid_option_lists_the_allowed_set() {
        let mut tree = build(json!({
            "name": "Person",
            "properties": [{ "name": "a", "type": "float" }],
        }));
        let err = prepare_tree(&mut tree).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Property(name='a').type] value 'float' is invalid; valid values are: 'string', 'int', 'decimal'"
        );
    }

    #[test]
    fn prepare_hook_defaults_values() {
        let mut tree = build(json!({
            "name": "Person",
            "properties": [{ "name": "a" }, { "name": "b", "type": "int" }],
        }));
        prepare_tree(&mut tree).unwrap();

        let children = tree.children(ConfigTree::ROOT, "properties").to_vec();
        assert_eq!(tree.node(children[0]).get_str("type"), Some("string"));
        assert_eq!(tree.node(children[1]).get_str("type"), Some("int"));
        assert!(tree.is_prepared());
    }

    #[test]
    fn duplicates_within_one_collection_fail_on_the_second_occurrence() {
        let mut tree = build(json!({
            "name": "Person",
            "properties": [{ "name": "a" }, { "name": "b" }, { "name": "a" }],
        }));
        let err = prepare_tree(&mut tree).unwrap_err();
        assert_eq!(err.to_string(), "[Property(name='a').name] value 'a' is not unique");
    }

    #[test]
    fn uniqueness_is_scoped_per_collection_instance() {
        // the same property name under two sibling groups is fine
        let mut tree = build(json!({
            "name": "Person",
            "groups": [
                { "name": "g1", "properties": [{ "name": "same" }] },
                { "name": "g2", "properties": [{ "name": "same" }] },
            ],
        }));
        prepare_tree(&mut tree).unwrap();

        // but duplicates inside one group still fail
        let mut tree = build(json!({
            "name": "Person",
            "groups": [
                { "name": "g1", "properties": [{ "name": "same" }, { "name": "same" }] },
            ],
        }));
        let err = prepare_tree(&mut tree).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Group(name='g1').Property(name='same').name] value 'same' is not unique"
        );
    }
}
