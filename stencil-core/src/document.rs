use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Supported structured-document formats, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Yaml,
    Json,
}

impl ContentType {
    /// Detect the content type from a resource name, `None` when unsupported.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?;
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(ContentType::Yaml),
            "json" | "jsn" => Some(ContentType::Json),
            _ => None,
        }
    }
}

/// Parse a document stream into a generic node.
///
/// A document that parses to null (e.g. an empty YAML stream) is an error:
/// every script and config must carry at least one mapping.
pub fn parse_document(content: &str, content_type: ContentType, name: &str) -> Result<Value> {
    let value = match content_type {
        ContentType::Yaml => serde_yaml::from_str::<Value>(content).map_err(|e| {
            let offset = e.location().map(|l| l.index());
            Error::parse(e.to_string(), content, name, offset)
        })?,
        ContentType::Json => {
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str::<Value>(content).map_err(|e| {
                    let offset = offset_of(content, e.line(), e.column());
                    Error::parse(e.to_string(), content, name, offset)
                })?
            }
        }
    };

    if value.is_null() {
        return Err(Box::new(Error::Empty {
            name: name.to_string(),
        }));
    }

    Ok(value)
}

/// Deserialize a generic node into a typed value.
pub fn from_value<T: DeserializeOwned>(value: Value, name: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::parse(e.to_string(), "", name, None))
}

/// Convert a one-based line/column pair into a byte offset.
fn offset_of(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (i, l) in content.split('\n').enumerate() {
        if i + 1 == line {
            return Some(offset + column.saturating_sub(1).min(l.len()));
        }
        offset += l.len() + 1;
    }
    None
}
