//! Error types for the configuration client.
//!
//! Every failure carries enough context to diagnose it without a debugger:
//! unsupported plugins keep their type identifier, structural problems keep the
//! element that was expected and where.

use thiserror::Error;

/// Main error type for the configuration client.
#[derive(Debug, Error)]
pub enum ConfError {
    /// No registered handler matches a type identifier.
    #[error("Unsupported plugin '{identifier}'{}", .context.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    UnsupportedPlugin {
        identifier: String,
        context: Option<String>,
    },

    /// A fetched document could not be used as configuration XML.
    #[error("Malformed document {context}: {reason}")]
    MalformedDocument { context: String, reason: String },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML serialization failed.
    #[error("XML serialization failed: {0}")]
    XmlWrite(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// All retry attempts exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// JSON decoding failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A status snapshot lacks an expected field.
    #[error("Missing field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// A node tried to persist through a document that has been dropped.
    #[error("Configuration document was closed before the update could be written")]
    DocumentClosed,

    /// A typed accessor was handed a plugin of another kind.
    #[error("Expected a {expected} plugin, found '{found}'")]
    WrongPluginKind { expected: String, found: String },

    /// A node that already belongs to a tree was added to another container.
    #[error("Plugin '{identifier}' already belongs to a configuration tree")]
    AlreadyAttached { identifier: String },

    /// Invalid URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Invalid entity name.
    #[error("Invalid name: '{0}'. Names must be non-empty and must not contain '/'")]
    InvalidName(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfError {
    /// Build a `MissingElement` error for `element` below `context`.
    pub fn missing(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// Build an `UnsupportedPlugin` error without location context.
    pub fn unsupported(identifier: impl Into<String>) -> Self {
        Self::UnsupportedPlugin {
            identifier: identifier.into(),
            context: None,
        }
    }

    /// Whether this error is the recoverable "no handler" condition.
    #[must_use]
    pub fn is_unsupported_plugin(&self) -> bool {
        matches!(self, Self::UnsupportedPlugin { .. })
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfError>;
