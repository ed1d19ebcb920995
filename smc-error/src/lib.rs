//! Unified error handling for smcread
//!
//! This crate provides the single error type shared by every smcread component.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;

/// Result type alias using SmcError
pub type Result<T> = std::result::Result<T, SmcError>;

/// Unified error type for all controller operations
#[derive(thiserror::Error, Debug)]
pub enum SmcError {
    // ============================================================================
    // Controller Session Errors
    // ============================================================================
    #[error("Controller service not found: {0}")]
    ServiceNotFound(String),

    #[error("Connection to controller service refused: status {0:#010x}")]
    ConnectionFailed(i32),

    #[error("Controller call failed: status {0:#010x}")]
    CallFailed(i32),

    // ============================================================================
    // Key Read Protocol Errors
    // ============================================================================
    #[error("Size mismatch reading {key}: metadata declared {expected} bytes, fetch reported {actual}")]
    SizeMismatch {
        key: String,
        expected: u32,
        actual: u32,
    },

    #[error("Invalid key {0:?}: expected exactly 4 printable ASCII characters")]
    InvalidKey(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl SmcError {
    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Status code carried by a failed platform call, if any
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::ConnectionFailed(code) | Self::CallFailed(code) => Some(*code),
            _ => None,
        }
    }
}
