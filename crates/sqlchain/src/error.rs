//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for sqlchain operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Boxed error raised by a database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for building and executing statements
#[derive(Debug, Error)]
pub enum SqlError {
    /// Missing or unusable configuration (table, connection settings, config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Queued insert rows do not share the same shape
    #[error("data counts do not match: expected {expected} columns, found {found}")]
    DataMismatch { expected: usize, found: usize },

    /// Builder state that cannot be rendered
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error reported by the underlying driver, passed through unchanged
    #[error("Driver error: {0}")]
    Driver(#[source] DriverError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap a driver error
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is an insert shape mismatch
    pub fn is_data_mismatch(&self) -> bool {
        matches!(self, Self::DataMismatch { .. })
    }

    /// Check if this error came from the driver
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
