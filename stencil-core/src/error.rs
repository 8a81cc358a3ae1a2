use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::resource::ResourceKind;

/// Result type for stencil operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} '{name}' does not exist")]
    #[diagnostic(
        code(stencil::not_found),
        help("the name is probed as-is, under the '{kind}s' directory, and in registered bundles")
    )]
    NotFound { kind: ResourceKind, name: String },

    #[error("stream content type of '{name}' is not supported")]
    #[diagnostic(code(stencil::unsupported_format), help("supported extensions are: yaml, yml, json, jsn"))]
    UnsupportedFormat { name: String },

    #[error("stream '{name}' is empty")]
    #[diagnostic(code(stencil::empty_stream))]
    Empty { name: String },

    #[error("failed to parse document: {message}")]
    #[diagnostic(code(stencil::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("[{path}] value is mandatory")]
    #[diagnostic(code(stencil::missing_value))]
    MissingValue { path: String },

    #[error("[{path}] value '{value}' is invalid; valid values are: {allowed}")]
    #[diagnostic(code(stencil::invalid_option))]
    InvalidOption {
        path: String,
        value: String,
        allowed: String,
    },

    #[error("[{path}] value '{value}' is not unique")]
    #[diagnostic(code(stencil::not_unique))]
    NotUnique { path: String, value: String },

    #[error("[{path}] {message}")]
    #[diagnostic(code(stencil::invalid_value))]
    Invalid { path: String, message: String },

    #[error("config type '{name}' is not registered")]
    #[diagnostic(
        code(stencil::schema_not_registered),
        help("register the schema on the registries before loading the script")
    )]
    SchemaNotRegistered { name: String },

    #[error("inherited config type '{inherited}' must be the same as the root config type '{root}'")]
    #[diagnostic(code(stencil::schema_mismatch))]
    SchemaMismatch { inherited: String, root: String },

    #[error("inheritance cycle detected: {chain}")]
    #[diagnostic(code(stencil::inheritance_cycle))]
    InheritanceCycle { chain: String },

    #[error("generator '{name}' is not registered")]
    #[diagnostic(code(stencil::generator_not_registered))]
    GeneratorNotRegistered { name: String },

    #[error("generator '{name}' config type '{schema}' must be the same as the script config type '{expected}'")]
    #[diagnostic(code(stencil::generator_schema_mismatch))]
    GeneratorSchemaMismatch {
        name: String,
        schema: String,
        expected: String,
    },

    #[error("editor '{name}' is not registered")]
    #[diagnostic(code(stencil::editor_not_registered))]
    EditorNotRegistered { name: String },

    #[error("editor '{name}' failed: {message}")]
    #[diagnostic(code(stencil::editor_failed))]
    Editor { name: String, message: String },

    #[error("template '{name}' failed to render: {message}")]
    #[diagnostic(code(stencil::render_error))]
    Render { name: String, message: String },

    #[error("file '{path}' would be created as a result of the generation")]
    #[diagnostic(code(stencil::changes_found))]
    ChangesCreate { path: PathBuf },

    #[error("file '{path}' would be updated as a result of the generation:\n{diff}")]
    #[diagnostic(code(stencil::changes_found))]
    ChangesUpdate { path: PathBuf, diff: String },

    #[error("script '{name}' is invalid: {cause}")]
    #[diagnostic(code(stencil::invalid_script))]
    InvalidScript { name: String, cause: Box<Error> },

    #[error("config '{name}' is invalid: {cause}")]
    #[diagnostic(code(stencil::invalid_config))]
    InvalidConfig { name: String, cause: Box<Error> },
}

impl Error {
    /// Create an IO error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }

    /// Create a not-found error for the given resource kind and name
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Box<Self> {
        Box::new(Error::NotFound {
            kind,
            name: name.into(),
        })
    }

    /// Create a parse error with source context and an optional byte offset
    pub fn parse(
        message: impl Into<String>,
        content: &str,
        name: &str,
        offset: Option<usize>,
    ) -> Box<Self> {
        Box::new(Error::Parse {
            src: NamedSource::new(name, content.to_string()),
            span: offset.map(|o| (o, 1).into()),
            message: message.into(),
        })
    }

    /// Create a missing-mandatory-value error for the qualified path
    pub fn missing_value(path: impl Into<String>) -> Box<Self> {
        Box::new(Error::MissingValue { path: path.into() })
    }

    /// Create an invalid-option error listing the allowed values
    pub fn invalid_option(
        path: impl Into<String>,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Box<Self> {
        Box::new(Error::InvalidOption {
            path: path.into(),
            value: value.into(),
            allowed: allowed
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Create a not-unique error for the qualified path
    pub fn not_unique(path: impl Into<String>, value: impl Into<String>) -> Box<Self> {
        Box::new(Error::NotUnique {
            path: path.into(),
            value: value.into(),
        })
    }

    /// Create a free-form validation error for the qualified path
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Invalid {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Wrap an error with the script resource name it originated from
    pub fn invalid_script(name: impl Into<String>, cause: Box<Error>) -> Box<Self> {
        Box::new(Error::InvalidScript {
            name: name.into(),
            cause,
        })
    }

    /// Wrap an error with the config resource name it originated from
    pub fn invalid_config(name: impl Into<String>, cause: Box<Error>) -> Box<Self> {
        Box::new(Error::InvalidConfig {
            name: name.into(),
            cause,
        })
    }

    /// Whether this error (or its wrapped cause) is a changes-found assertion failure
    pub fn is_changes_found(&self) -> bool {
        match self {
            Error::ChangesCreate { .. } | Error::ChangesUpdate { .. } => true,
            Error::InvalidScript { cause, .. } | Error::InvalidConfig { cause, .. } => {
                cause.is_changes_found()
            }
            _ => false,
        }
    }
}
