//! Error types for Shapegen
//!
//! Generators never fail on ineligible input; they skip and record a
//! warning instead. The errors in this module are the hard failures at the
//! boundary: unreadable or malformed IR, unknown declarations, bad
//! configuration, and output IO.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Shapegen
#[derive(Debug, Error)]
pub enum ShapeError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Declaration validation failed
    #[error("Declaration validation failed for '{declaration}': {message}")]
    DeclarationValidation {
        declaration: String,
        message: String,
    },

    /// Duplicate declaration name in one batch
    #[error("Duplicate declaration name: '{0}' appears more than once")]
    DuplicateDeclaration(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Requested declaration is not part of the batch
    #[error("Declaration not found: {0}")]
    DeclarationNotFound(String),

    /// IR document not found
    #[error("IR document not found at path: {0}")]
    IrNotFound(PathBuf),

    // ========================================================================
    // IR Format Errors
    // ========================================================================
    /// The IR document could not be parsed
    #[error("Invalid IR document: {0}")]
    InvalidIrFormat(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected at most {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// Output file already exists and overwriting is disabled
    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl ShapeError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ShapeError::Validation(msg.into())
    }

    /// Create a declaration validation error
    pub fn declaration_validation(declaration: impl Into<String>, msg: impl Into<String>) -> Self {
        ShapeError::DeclarationValidation {
            declaration: declaration.into(),
            message: msg.into(),
        }
    }

    /// Create a not-found error for a declaration name
    pub fn declaration_not_found(name: impl Into<String>) -> Self {
        ShapeError::DeclarationNotFound(name.into())
    }

    /// Create an IR format error
    pub fn invalid_ir(msg: impl Into<String>) -> Self {
        ShapeError::InvalidIrFormat(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        ShapeError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShapeError::Validation(_)
                | ShapeError::DeclarationValidation { .. }
                | ShapeError::DuplicateDeclaration(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ShapeError::DeclarationNotFound(_) | ShapeError::IrNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ShapeError::Io(_)
                | ShapeError::FileRead { .. }
                | ShapeError::FileWrite { .. }
                | ShapeError::DirectoryCreate { .. }
                | ShapeError::OutputExists(_)
        )
    }
}

/// Result type alias using ShapeError
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> ShapeResult<T>;
}

impl<T, E: Into<ShapeError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> ShapeResult<T> {
        self.map_err(|e| {
            let err: ShapeError = e.into();
            ShapeError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
