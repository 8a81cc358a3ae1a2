use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{Error, Result};

/// Extensions probed for script and config documents, in order.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "jsn"];

/// Extensions probed for handlebars templates, in order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["hbs", "hb"];

/// The kind of resource being probed for, which determines the
/// fallback subdirectory searched next to the requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Script,
    Config,
    Template,
}

impl ResourceKind {
    fn subdir(self) -> &'static str {
        match self {
            ResourceKind::Script => "scripts",
            ResourceKind::Config => "configs",
            ResourceKind::Template => "templates",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Script => write!(f, "script"),
            ResourceKind::Config => write!(f, "config"),
            ResourceKind::Template => write!(f, "template"),
        }
    }
}

/// A resolved resource: the concrete name it was found under and its content.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub content: String,
}

/// An in-memory bundle of named resources.
///
/// Bundles stand in for embedded resource containers: an embedding crate
/// typically fills one with `include_str!` content and registers it on the
/// locator so scripts and templates resolve without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    name: String,
    entries: IndexMap<String, String>,
}

impl ResourceBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Bundle name, used for diagnostics only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entry keyed by its logical file name (extension included).
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.insert(name.into(), content.into());
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }
}

/// Locates resources by probing the filesystem and registered bundles.
///
/// Probing order for a logical name: the path as given, then the resource
/// kind's subdirectory next to it, then each registered bundle in
/// registration order. The whole sequence is retried once per fallback
/// extension when the name as given resolves nowhere.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocator {
    bundles: Vec<ResourceBundle>,
}

impl ResourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle, probed after all previously registered bundles.
    pub fn add_bundle(&mut self, bundle: ResourceBundle) {
        self.bundles.push(bundle);
    }

    pub fn with_bundle(mut self, bundle: ResourceBundle) -> Self {
        self.add_bundle(bundle);
        self
    }

    /// Probe for a resource, returning `Ok(None)` when it resolves nowhere.
    pub fn locate(
        &self,
        name: &str,
        kind: ResourceKind,
        extensions: &[&str],
    ) -> Result<Option<Resource>> {
        if let Some(resource) = self.locate_exact(name, kind)? {
            return Ok(Some(resource));
        }

        for ext in extensions {
            let candidate = format!("{name}.{ext}");
            if let Some(resource) = self.locate_exact(&candidate, kind)? {
                return Ok(Some(resource));
            }
        }

        Ok(None)
    }

    /// Probe for a resource, attaching a not-found error when it resolves nowhere.
    pub fn require(
        &self,
        name: &str,
        kind: ResourceKind,
        extensions: &[&str],
    ) -> Result<Resource> {
        self.locate(name, kind, extensions)?
            .ok_or_else(|| Error::not_found(kind, name))
    }

    fn locate_exact(&self, name: &str, kind: ResourceKind) -> Result<Option<Resource>> {
        let path = Path::new(name);
        if path.is_file() {
            return Ok(Some(Resource {
                name: name.to_string(),
                content: read(path)?,
            }));
        }

        // Probe the kind subdirectory next to the requested path.
        if let Some(file_name) = path.file_name() {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            let nested: PathBuf = parent.join(kind.subdir()).join(file_name);
            if nested.is_file() {
                return Ok(Some(Resource {
                    name: name.to_string(),
                    content: read(&nested)?,
                }));
            }
        }

        for bundle in &self.bundles {
            if let Some(content) = bundle.get(name) {
                return Ok(Some(Resource {
                    name: name.to_string(),
                    content: content.to_string(),
                }));
            }
        }

        Ok(None)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
