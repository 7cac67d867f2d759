//! Error handling for the sdkgen code generation library.
//!
//! Three layers of failure exist and each gets its own type:
//!
//! - [`IngestError`]: the API description could not be turned into an
//!   [`ApiSchema`](crate::schema::ApiSchema). Fatal for a generation run.
//! - [`EmitError`]: one backend could not render the schema. Recorded in the
//!   [`GenerationReport`](crate::generate::GenerationReport), siblings go on.
//! - [`Error`]: everything else (I/O, parsing project files, HTTP), plus
//!   conversions from the two above so `?` works across layers.
//!
//! # Examples
//!
//! ```
//! use sdkgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::target::TargetKind;

/// Result type for sdkgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sdkgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Malformed URL in a project file
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP error while talking to a remote service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API description could not be loaded or ingested
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A backend failed to render
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// OpenAPI document could not be retrieved
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Documentation host rejected a request
    #[error("Upload error: {0}")]
    Upload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new upload error
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        Self::Upload(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

/// Failure to build the IR from a raw API description.
///
/// Both variants carry the offending location (a JSON-pointer-like path into
/// the description) so the caller can report it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The document is not structured data, or a construct in it does not map
    /// onto the IR.
    #[error("malformed API description at {location}: {reason}")]
    MalformedDescription { location: String, reason: String },

    /// A field, parameter, body, or response names a type that is not declared.
    #[error("unresolved reference to '{name}' at {location}")]
    UnresolvedReference { name: String, location: String },
}

impl IngestError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescription {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Failure of a single backend. Never aborts the other backends of a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A field's type cannot be expressed by the target
    #[error("{target}: cannot render type of {model}.{field}: {reason}")]
    UnrenderableType {
        target: TargetKind,
        model: String,
        field: String,
        reason: String,
    },

    /// The configured identifier is a reserved word in the target language
    #[error("{target}: '{identifier}' is a reserved word")]
    ReservedIdentifier {
        target: TargetKind,
        identifier: String,
    },

    /// The configured identifier is not legal in the target language
    #[error("{target}: '{identifier}' is not a valid identifier: {reason}")]
    InvalidIdentifier {
        target: TargetKind,
        identifier: String,
        reason: String,
    },

    /// Two distinct source names map onto the same emitted name
    #[error("{target}: name collision on '{name}' in {scope}")]
    NameCollision {
        target: TargetKind,
        scope: String,
        name: String,
    },

    /// Template rendering failed
    #[error("{target}: template error: {message}")]
    Template { target: TargetKind, message: String },

    /// The backend task did not complete
    #[error("{target}: backend aborted: {reason}")]
    Aborted { target: TargetKind, reason: String },
}

impl EmitError {
    /// The target whose backend produced this error
    pub fn target(&self) -> TargetKind {
        match self {
            Self::UnrenderableType { target, .. }
            | Self::ReservedIdentifier { target, .. }
            | Self::InvalidIdentifier { target, .. }
            | Self::NameCollision { target, .. }
            | Self::Template { target, .. }
            | Self::Aborted { target, .. } => *target,
        }
    }

    pub(crate) fn template(target: TargetKind, err: tera::Error) -> Self {
        // Tera nests the useful message in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::Template { target, message }
    }
}
