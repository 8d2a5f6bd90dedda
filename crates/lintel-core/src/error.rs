//! Error types and handling for configuration resolution and validation

use crate::config::value::ValueShape;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration operations
#[derive(Debug, Error)]
pub enum LintelError {
    /// A configuration document could not be parsed or violated a load bound
    #[error("Invalid configuration in '{document}': {message}")]
    InvalidConfig { document: String, message: String },

    /// Validation was invoked with an unusable baseline or settings
    #[error("Configuration precondition violated: {message}")]
    Precondition { message: String },

    /// A stored value could not be coerced to the type requested by the reader
    #[error("Value \"{value}\" set for config parameter \"{path}\" is not of required type {expected}.")]
    TypeMismatch {
        path: String,
        value: String,
        expected: ValueShape,
    },

    /// A boolean-typed property held a string other than `"true"`/`"false"`
    #[error("Value \"{value}\" set for config parameter \"{path}\" is not a boolean value.")]
    NotABoolean { path: String, value: String },

    /// A string-list-typed property held elements that are not strings
    #[error("Value \"{value}\" set for config parameter \"{path}\" contains non-string values.")]
    NonStringList { path: String, value: String },

    /// Aggregate failure after validation found Error-level findings
    #[error("Run failed with {count} invalid config properties.")]
    InvalidConfigProperties { count: usize },

    /// Run-gate failure when the issue count exceeds the configured maximum
    #[error("Analysis failed with {found} issues, maximum allowed is {max}.")]
    MaxIssuesReached { found: usize, max: i64 },

    /// Unrecognized `build > failOnSeverity` value
    #[error("Unknown failOnSeverity value \"{value}\"; expected one of never, info, warning, error.")]
    UnknownSeverityPolicy { value: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Precondition,
    Coercion,
    Validation,
    Policy,
    Io,
}

impl LintelError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LintelError::InvalidConfig { .. } => ErrorKind::Parse,
            LintelError::Precondition { .. } => ErrorKind::Precondition,
            LintelError::TypeMismatch { .. } => ErrorKind::Coercion,
            LintelError::NotABoolean { .. } => ErrorKind::Coercion,
            LintelError::NonStringList { .. } => ErrorKind::Coercion,
            LintelError::InvalidConfigProperties { .. } => ErrorKind::Validation,
            LintelError::MaxIssuesReached { .. } => ErrorKind::Policy,
            LintelError::UnknownSeverityPolicy { .. } => ErrorKind::Policy,
            LintelError::IoError { .. } => ErrorKind::Io,
        }
    }

    /// Create an invalid-configuration error for a named document
    pub fn invalid_config(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a type mismatch error for a dotted property path
    pub fn type_mismatch(
        path: impl Into<String>,
        value: impl Into<String>,
        expected: ValueShape,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a boolean coercion error
    pub fn not_a_boolean(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotABoolean {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a non-string list element error
    pub fn non_string_list(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NonStringList {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for LintelError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
