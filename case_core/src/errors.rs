//! # Error Types
//!
//! Structured error types for case_core. Only [`CaseError::InvalidPaperSize`]
//! aborts an export; every other variant is recovered locally (a panel reverts
//! to empty, or an export stage is dropped and reported as a warning).
//!
//! ## Example
//!
//! ```rust
//! use case_core::errors::{CaseError, CaseResult};
//!
//! fn validate_ratio(ratio: u32) -> CaseResult<()> {
//!     if ratio == 0 {
//!         return Err(CaseError::invalid_input("supersample", "0", "Ratio must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_ratio(3).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for case_core operations
pub type CaseResult<T> = Result<T, CaseError>;

/// Structured error type for layout, decode and export operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CaseError {
    /// Export requested with a paper size key outside the supported table
    #[error("Invalid paper size '{key}' (expected one of: a4, f4, letter)")]
    InvalidPaperSize { key: String },

    /// A source image could not be read or decoded
    #[error("Failed to load image '{origin}': {reason}")]
    AssetLoad { origin: String, reason: String },

    /// A stage failed while being rasterized for export
    #[error("Rasterization of {stage} stage failed: {reason}")]
    StageRasterization { stage: String, reason: String },

    /// A rasterized stage could not be embedded into the document
    #[error("Embedding of {stage} stage failed: {reason}")]
    StageEmbed { stage: String, reason: String },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CaseError {
    /// Create an InvalidPaperSize error
    pub fn invalid_paper_size(key: impl Into<String>) -> Self {
        CaseError::InvalidPaperSize { key: key.into() }
    }

    /// Create an AssetLoad error
    pub fn asset_load(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseError::AssetLoad {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create a StageRasterization error
    pub fn stage_rasterization(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseError::StageRasterization {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create a StageEmbed error
    pub fn stage_embed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseError::StageEmbed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts a whole export.
    ///
    /// Stage failures degrade the output instead; only an unknown paper
    /// size rejects the request before any layout work.
    pub fn is_fatal_for_export(&self) -> bool {
        !matches!(
            self,
            CaseError::StageRasterization { .. } | CaseError::StageEmbed { .. } | CaseError::AssetLoad { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CaseError::InvalidPaperSize { .. } => "INVALID_PAPER_SIZE",
            CaseError::AssetLoad { .. } => "ASSET_LOAD",
            CaseError::StageRasterization { .. } => "STAGE_RASTERIZATION",
            CaseError::StageEmbed { .. } => "STAGE_EMBED",
            CaseError::InvalidInput { .. } => "INVALID_INPUT",
            CaseError::FileError { .. } => "FILE_ERROR",
            CaseError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CaseError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(e: serde_json::Error) -> Self {
        CaseError::SerializationError { reason: e.to_string() }
    }
}
