//! Error taxonomy for the enrollment subsystem.
//!
//! Every crate in the workspace surfaces failures through this single enum so
//! that workflow step handlers can classify a fault (transport, card
//! protocol, capture pipeline, directory) without downcasting. Failures are
//! typed and carried upward; no layer below the workflow retries on its own.

use thiserror::Error;

/// Result type alias for enrollment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during credential enrollment.
#[derive(Debug, Error)]
pub enum Error {
    // Transport errors
    /// Serial link could not be opened, was lost, or was used after close.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// A bounded read or write did not complete in time.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    // Card protocol errors
    /// Sector authentication was rejected by the card.
    #[error("Sector {sector} authentication failed with status {status:02X?}")]
    Auth { sector: u8, status: [u8; 2] },

    /// Block write was rejected by the card.
    #[error("Block {block} write failed with status {status:02X?}")]
    Write { block: u8, status: [u8; 2] },

    /// Frame bytes do not form a valid command or response frame.
    #[error("Invalid frame: {message}")]
    InvalidFrame { message: String },

    /// Stored frame checksum does not match the computed one.
    #[error("Checksum mismatch: expected {expected:#04X}, got {actual:#04X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    // Biometric capture errors
    /// Video device unavailable, denied, or failed mid-capture.
    #[error("Capture device error: {message}")]
    Device { message: String },

    /// A recognition model artifact could not be loaded.
    #[error("Model artifact '{artifact}' failed to load: {message}")]
    ModelLoad { artifact: String, message: String },

    // Domain validation errors
    /// Operator-supplied data failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    // Workflow errors
    /// Requested step transition is not allowed by the state machine.
    #[error("Invalid step transition from {from} to {to}")]
    InvalidStepTransition { from: String, to: String },

    // Employee Directory errors
    /// A directory commit was rejected or unreachable.
    #[error("Directory error: {message}")]
    Directory { status: Option<u16>, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new sector authentication error.
    pub fn auth(sector: u8, status: [u8; 2]) -> Self {
        Self::Auth { sector, status }
    }

    /// Create a new block write error.
    pub fn write(block: u8, status: [u8; 2]) -> Self {
        Self::Write { block, status }
    }

    /// Create a new invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Create a new capture device error.
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Create a new model load error.
    pub fn model_load(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new directory error without an HTTP status.
    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory {
            status: None,
            message: message.into(),
        }
    }

    /// Create a new directory error carrying the HTTP status code.
    pub fn directory_status(status: u16, message: impl Into<String>) -> Self {
        Self::Directory {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns `true` if this error came from the Employee Directory.
    ///
    /// Step handlers use this to distinguish a failed commit (session state
    /// unchanged, operator may retry) from a hardware fault.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Returns `true` if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
