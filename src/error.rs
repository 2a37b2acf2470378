//! Error types for the Drive Group Selector
//!
//! Provides structured error types for filter parsing, device selection,
//! inventory reduction and the file-backed collaborators.

use thiserror::Error;

/// Unified error type for drive group evaluation
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Filter Errors
    // =========================================================================
    #[error("Filter {filter} is not supported")]
    FilterNotSupported { filter: String },

    #[error("Invalid value '{value}' for filter {filter}: {reason}")]
    InvalidFilterValue {
        filter: String,
        value: String,
        reason: String,
    },

    #[error("Invalid limit: {value}")]
    InvalidLimit { value: String },

    // =========================================================================
    // Size Expression Errors
    // =========================================================================
    #[error("Unit '{unit}' is not supported")]
    UnitNotSupported { unit: String },

    #[error("Couldn't parse size expression '{expression}': {reason}")]
    SizeExpression { expression: String, reason: String },

    #[error("Size range has neither low, high nor exact bound configured")]
    NoRangeConfigured,

    // =========================================================================
    // Device Errors
    // =========================================================================
    #[error("No disk attribute found for {} or {}", .key, .fallback.as_deref().unwrap_or("None"))]
    MissingAttribute {
        key: String,
        fallback: Option<String>,
    },

    #[error("Invalid value '{value}' for disk attribute {key}")]
    InvalidAttributeValue { key: String, value: String },

    #[error("Disk {device} doesn't have a 'path' identifier")]
    MissingPath { device: String },

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Inventory parse error: {0}")]
    InventoryParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of an error for callers deciding how to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The drive group spec or one of its values is wrong
    InvalidInput,
    /// The device inventory is incomplete or malformed
    InvalidInventory,
    /// An internal invariant was violated
    Defect,
    /// Reading an input failed
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FilterNotSupported { .. }
            | Error::InvalidFilterValue { .. }
            | Error::InvalidLimit { .. }
            | Error::UnitNotSupported { .. }
            | Error::SizeExpression { .. }
            | Error::Configuration(_)
            | Error::YamlParse(_) => ErrorKind::InvalidInput,

            Error::MissingAttribute { .. }
            | Error::InvalidAttributeValue { .. }
            | Error::MissingPath { .. }
            | Error::InventoryParse(_)
            | Error::JsonParse(_) => ErrorKind::InvalidInventory,

            Error::NoRangeConfigured => ErrorKind::Defect,

            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Check if this error signals a programming defect rather than bad input
    pub fn is_defect(&self) -> bool {
        matches!(self.kind(), ErrorKind::Defect)
    }
}

/// Result type alias for drive group evaluation
pub type Result<T> = std::result::Result<T, Error>;
