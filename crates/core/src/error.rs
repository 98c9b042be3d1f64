//! Error types for the sucre stream decode pipeline.

use thiserror::Error;

/// Primary error type for stream decoding operations.
///
/// The variants are deliberately coarse: callers decide recoverability per
/// kind, not per message. `Parse` and `UnknownFilter` abort a pipeline with
/// no partial output; `Bounds` is always a hard failure.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("unsupported feature: {0}")]
    Unsupported(String),

    #[error("bounds error: {op} of {len} at position {pos} exceeds {limit}")]
    Bounds {
        op: &'static str,
        len: usize,
        pos: usize,
        limit: usize,
    },

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
