//! Error types for finqual operations.
//!
//! Data-quality problems are never errors: a malformed or missing value is
//! reported as an issue on the record that carries it. The variants below
//! cover structural failures only, such as an empty batch that cannot be
//! aggregated or a catalog definition that does not compile.

use thiserror::Error;

/// Main error type for finqual operations.
#[derive(Debug, Error)]
pub enum FinqualError {
    /// The record set is empty, so no percentage or score can be computed
    #[error("Cannot compute quality summary: the record set is empty")]
    EmptyDataset,

    /// Configuration or catalog definition is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Loading records from an external source failed
    #[error("Failed to load records: {context}")]
    Load {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Rendering a report artifact failed
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with FinqualError
pub type Result<T> = std::result::Result<T, FinqualError>;

impl FinqualError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a load error with context
    pub fn load_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Load {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a report error with context
    pub fn report_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Report {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an I/O error for the given path
    pub fn io(path: &std::path::Path, action: &str, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("Failed to {} {}", action, path.display()),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
