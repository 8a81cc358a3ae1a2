//! Arena-backed configuration tree.
//!
//! All nodes of a configuration document live in one owned arena; parent
//! and root references are indices, so qualified error paths are built by
//! walking indices upward without reference cycles.

use std::collections::HashMap;

use chrono::{Local, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use stencil_core::{Error, Result};

use crate::params::Parameters;
use crate::schema::NodeSchema;

/// Index of a node within its [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One declared child collection on a node.
#[derive(Debug)]
struct CollectionSlot {
    name: &'static str,
    /// Whether the document carried the collection at all (a missing
    /// mandatory collection is an error, an empty one is not).
    present: bool,
    ids: Vec<NodeId>,
}

/// One configuration node: declared fields, extension data, and
/// runtime-only custom properties.
#[derive(Debug)]
pub struct Node {
    schema: &'static NodeSchema,
    parent: Option<NodeId>,
    fields: IndexMap<String, Value>,
    extra: IndexMap<String, Value>,
    custom: HashMap<String, Value>,
    collections: Vec<CollectionSlot>,
}

impl Node {
    pub fn schema(&self) -> &'static NodeSchema {
        self.schema
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    /// Set a value: declared fields land in the field map, anything else
    /// becomes extension data.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        let value = value.into();
        if self.schema.field(field).is_some() {
            self.fields.insert(field.to_string(), value);
        } else {
            self.extra.insert(field.to_string(), value);
        }
    }

    /// Remove a declared field value, returning the previous one.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// Extension data: document fields not mapped by the schema.
    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }

    /// Runtime-only scratch state, never rendered or persisted.
    pub fn custom(&self) -> &HashMap<String, Value> {
        &self.custom
    }

    pub fn custom_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.custom
    }

    /// Child ids of a declared collection, empty when absent.
    pub fn children(&self, collection: &str) -> &[NodeId] {
        self.collections
            .iter()
            .find(|slot| slot.name == collection)
            .map(|slot| slot.ids.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn collection_present(&self, collection: &str) -> bool {
        self.collections
            .iter()
            .any(|slot| slot.name == collection && slot.present)
    }

    /// Key segment for qualified paths, e.g. `Property(name='code')`.
    fn qualified_key(&self) -> Option<String> {
        let label = self.schema.label?;
        match self.schema.key.and_then(|k| self.get_str(k)) {
            Some(value) => Some(format!("{label}({}='{value}')", self.schema.key.unwrap())),
            None => Some(label.to_string()),
        }
    }
}

/// The owned configuration tree; node 0 is the root.
#[derive(Debug)]
pub struct ConfigTree {
    nodes: Vec<Node>,
    params: Parameters,
    prepared: bool,
}

impl ConfigTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Build a tree from a generic document node against a schema.
    ///
    /// Declared scalar fields land in each node's field map, declared
    /// collections become child nodes in document order, and everything
    /// else is preserved as extension data. No validation happens here.
    pub fn build(document: Value, schema: &'static NodeSchema) -> Result<Self> {
        let mut tree = ConfigTree {
            nodes: Vec::new(),
            params: Parameters::new(),
            prepared: false,
        };
        tree.build_node(document, schema, None)?;
        Ok(tree)
    }

    fn build_node(
        &mut self,
        value: Value,
        schema: &'static NodeSchema,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let Value::Object(object) = value else {
            let path = self.path_under(parent, schema.label.unwrap_or(schema.name));
            return Err(Error::invalid(path, "node must be an object"));
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            schema,
            parent,
            fields: IndexMap::new(),
            extra: IndexMap::new(),
            custom: HashMap::new(),
            collections: schema
                .collections
                .iter()
                .map(|c| CollectionSlot {
                    name: c.name,
                    present: false,
                    ids: Vec::new(),
                })
                .collect(),
        });

        let mut pending: Vec<(&'static str, fn() -> &'static NodeSchema, Vec<Value>)> = Vec::new();
        for (key, value) in object {
            if let Some(collection) = schema.collection(&key) {
                if value.is_null() {
                    continue;
                }
                let Value::Array(entries) = value else {
                    let path = self.qualified_path(id, Some(collection.name));
                    return Err(Error::invalid(path, "collection must be an array"));
                };
                self.slot_mut(id, collection.name).present = true;
                pending.push((collection.name, collection.schema, entries));
            } else if schema.field(&key).is_some() {
                if !value.is_null() {
                    self.nodes[id.0].fields.insert(key, value);
                }
            } else {
                self.nodes[id.0].extra.insert(key, value);
            }
        }

        for (name, child_schema, entries) in pending {
            for entry in entries {
                let child = self.build_node(entry, child_schema(), Some(id))?;
                self.slot_mut(id, name).ids.push(child);
            }
        }

        Ok(id)
    }

    fn slot_mut(&mut self, id: NodeId, name: &str) -> &mut CollectionSlot {
        self.nodes[id.0]
            .collections
            .iter_mut()
            .find(|slot| slot.name == name)
            .expect("collection slot exists for declared collection")
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The root schema the tree was built against.
    pub fn schema(&self) -> &'static NodeSchema {
        self.root().schema
    }

    /// Child ids of a declared collection on a node.
    pub fn children(&self, id: NodeId, collection: &str) -> &[NodeId] {
        self.node(id).children(collection)
    }

    /// Root-level runtime parameters, reset and re-merged per generator item.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub(crate) fn set_prepared(&mut self) {
        self.prepared = true;
    }

    /// Fully qualified key path for a node, optionally ending in a field
    /// name: ancestor key segments root to leaf, dot separated.
    pub fn qualified_path(&self, id: NodeId, field: Option<&str>) -> String {
        let mut segments = Vec::new();
        if let Some(field) = field {
            segments.push(field.to_string());
        }

        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if let Some(key) = node.qualified_key() {
                segments.push(key);
            }
            current = node.parent;
        }

        segments.reverse();
        segments.join(".")
    }

    fn path_under(&self, parent: Option<NodeId>, leaf: &str) -> String {
        match parent {
            Some(id) => self.qualified_path(id, Some(leaf)),
            None => leaf.to_string(),
        }
    }

    /// Render a node (and its subtree) back into a generic object node.
    /// Declared fields and extension data are inlined, collections become
    /// arrays. Custom properties stay runtime-only.
    pub fn node_value(&self, id: NodeId) -> Value {
        let node = &self.nodes[id.0];
        let mut object = Map::new();
        for (key, value) in &node.fields {
            object.insert(key.clone(), value.clone());
        }
        for (key, value) in &node.extra {
            object.insert(key.clone(), value.clone());
        }
        for slot in &node.collections {
            let entries: Vec<Value> = slot.ids.iter().map(|c| self.node_value(*c)).collect();
            object.insert(slot.name.to_string(), Value::Array(entries));
        }
        Value::Object(object)
    }

    /// Assemble the template render context for a node.
    ///
    /// The context is the node's own object plus a `root` object carrying
    /// the runtime parameters and the derived convenience values, which are
    /// computed fresh on every call. When the node is the root itself the
    /// derived values are also available at the top level.
    pub fn render_context(&self, id: NodeId) -> Value {
        let mut root_object = match self.node_value(Self::ROOT) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        root_object.insert("runtimeParameters".to_string(), self.params.to_value());
        root_object.insert(
            "dateTimeNow".to_string(),
            Value::String(Local::now().to_rfc3339()),
        );
        root_object.insert(
            "dateTimeUtcNow".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        root_object.insert(
            "newGuid".to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );

        let mut context = if id == Self::ROOT {
            root_object.clone()
        } else {
            match self.node_value(id) {
                Value::Object(map) => map,
                _ => Map::new(),
            }
        };
        context.insert("root".to_string(), Value::Object(root_object));
        Value::Object(context)
    }
}
