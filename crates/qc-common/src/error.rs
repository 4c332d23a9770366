//! Error types for QC Sentinel.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//!
//! Errors serialize to structured JSON via the category/code accessors:
//! ```json
//! {
//!   "code": 13,
//!   "category": "config",
//!   "message": "no configuration versions exist for stream hba1c-arch",
//!   "recoverable": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for QC Sentinel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Stream/prior configuration errors.
    Config,
    /// Bayesian inference and numerical errors.
    Inference,
    /// Record ingestion and validation errors.
    Ingest,
    /// Store access, file I/O, and serialization errors.
    Store,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Ingest => write!(f, "ingest"),
            ErrorCategory::Store => write!(f, "store"),
        }
    }
}

/// Unified error type for QC Sentinel.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid stream config: {0}")]
    InvalidStreamConfig(String),

    #[error("invalid prior config: {0}")]
    InvalidPriors(String),

    #[error("no configuration versions exist for stream {stream_id}")]
    NotConfigured { stream_id: String },

    // Inference errors (30-39)
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // Ingestion errors (40-49)
    #[error("units {got} do not match stream configuration units {expected}")]
    UnitMismatch { expected: String, got: String },

    #[error("QC level {got} does not match stream configuration level {expected}")]
    QcLevelMismatch { expected: String, got: String },

    #[error("result {value} outside configured bounds [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    #[error("result value must be finite")]
    NonFiniteValue,

    // Store / I/O errors (60-69)
    #[error("store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Error codes are grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Inference errors
    /// - 40-49: Ingestion errors
    /// - 60-69: Store / I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidStreamConfig(_) => 11,
            Error::InvalidPriors(_) => 12,
            Error::NotConfigured { .. } => 13,
            Error::Inference(_) => 30,
            Error::NumericalInstability(_) => 31,
            Error::UnitMismatch { .. } => 40,
            Error::QcLevelMismatch { .. } => 41,
            Error::OutOfBounds { .. } => 42,
            Error::NonFiniteValue => 43,
            Error::Store(_) => 60,
            Error::Io(_) => 61,
            Error::Json(_) => 62,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidStreamConfig(_)
            | Error::InvalidPriors(_)
            | Error::NotConfigured { .. } => ErrorCategory::Config,

            Error::Inference(_) | Error::NumericalInstability(_) => ErrorCategory::Inference,

            Error::UnitMismatch { .. }
            | Error::QcLevelMismatch { .. }
            | Error::OutOfBounds { .. }
            | Error::NonFiniteValue => ErrorCategory::Ingest,

            Error::Store(_) | Error::Io(_) | Error::Json(_) => ErrorCategory::Store,
        }
    }

    /// Returns whether this error is potentially recoverable by retrying.
    ///
    /// Configuration and ingestion errors require operator intervention
    /// (a new config version, a corrected record); store errors may clear
    /// on retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Io(_))
    }

    /// Serialize to the structured JSON representation.
    pub fn to_structured_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "category": self.category().to_string(),
            "message": self.to_string(),
            "recoverable": self.is_recoverable(),
        })
    }
}
