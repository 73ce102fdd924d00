//! Error types for the loader.
//!
//! Uses the dual-error pattern: `LoaderError` for library consumers with
//! detailed error context, and `RegistryError` for failures raised by a
//! definition registry. Errors that happen while walking a document are not
//! returned but reported as problems (see [`crate::reader::Problem`]); their
//! [`ProblemKind`] classifies them.

use std::fmt;

use thiserror::Error;

/// Main error type for the loader library.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Location expression was empty.
    #[error("Resource location must not be empty")]
    EmptyLocation,

    /// No resource backend understands the location.
    #[error("Unsupported resource location: '{0}'")]
    UnsupportedLocation(String),

    /// Resource does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A relative resource could not be derived from its base.
    #[error("Cannot create relative resource '{relative}' from {base}")]
    RelativeResource { base: String, relative: String },

    /// A `${...}` placeholder could not be resolved.
    #[error("Could not resolve placeholder '{placeholder}' in value \"{value}\"")]
    UnresolvablePlaceholder { placeholder: String, value: String },

    /// A placeholder refers back to itself.
    #[error("Circular placeholder reference '{0}' in property definitions")]
    CircularPlaceholder(String),

    /// Invalid profile declaration.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Resource is already being loaded further up the import chain.
    #[error("Detected cyclic loading of {location}: {}", .chain.join(" -> "))]
    CyclicImport {
        location: String,
        chain: Vec<String>,
    },

    /// XML parsing failed.
    #[error("XML document from {resource} is invalid: {source}")]
    XmlParse {
        resource: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Registry rejected a write.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Loading finished but problems were reported.
    #[error("Loading reported {0} problem(s)")]
    ProblemsReported(usize),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoaderError {
    /// Classify this error for problem reporting.
    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        match self {
            Self::EmptyLocation
            | Self::InvalidProfile(_)
            | Self::Config(_)
            | Self::ProblemsReported(_) => ProblemKind::Validation,
            Self::UnsupportedLocation(_)
            | Self::ResourceNotFound(_)
            | Self::RelativeResource { .. }
            | Self::UnresolvablePlaceholder { .. }
            | Self::CircularPlaceholder(_)
            | Self::CyclicImport { .. }
            | Self::XmlParse { .. }
            | Self::Url(_) => ProblemKind::Resolution,
            Self::Registry(_) => ProblemKind::Registry,
            Self::Http(_)
            | Self::RetriesExhausted { .. }
            | Self::Io(_)
            | Self::Yaml(_)
            | Self::Json(_) => ProblemKind::Io,
        }
    }
}

/// Errors raised by a [`crate::definition::DefinitionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Name was empty.
    #[error("Component name must not be empty")]
    EmptyName,

    /// Definition exists and overriding is disabled.
    #[error("Cannot register component definition for '{0}': a definition is already bound to that name")]
    DefinitionOverride(String),

    /// Alias is bound to another name and overriding is disabled.
    #[error("Cannot define alias '{alias}' for name '{name}': it is already registered for name '{existing}'")]
    AliasOverride {
        alias: String,
        name: String,
        existing: String,
    },

    /// Registering the alias would close an alias loop.
    #[error("Cannot register alias '{alias}' for name '{name}': circular reference")]
    CircularAlias { alias: String, name: String },

    /// Alias would hide an existing definition.
    #[error("Cannot register alias '{0}': a component definition with that name exists")]
    AliasShadowsDefinition(String),
}

/// Classification of problems reported while reading documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// Missing or malformed required attribute.
    Validation,
    /// Placeholder, location or import resolution failure.
    Resolution,
    /// Registry rejected a definition or alias.
    Registry,
    /// No handler for a non-default namespace.
    Vocabulary,
    /// Resource existence or location lookup failure.
    Io,
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::Resolution => "resolution",
            Self::Registry => "registry",
            Self::Vocabulary => "vocabulary",
            Self::Io => "io",
        };
        f.write_str(label)
    }
}

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;
