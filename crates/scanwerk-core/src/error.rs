// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Unified error types.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Device / stream errors --
    #[error("data source failed: {0}")]
    DataSource(String),

    #[error("stream is not ready for I/O: {0}")]
    StreamNotReady(String),

    #[error("stream is sealed: a terminal device has already been pushed")]
    StreamSealed,

    #[error("pipeline stalled: {0}")]
    PipelineStall(String),

    // -- Pump errors --
    #[error("bucket allocation failed: {0}")]
    BucketAllocation(String),

    #[error("pump error: {0}")]
    Pump(String),

    // -- Settings errors --
    #[error("constraint violation for '{key}': {reason}")]
    ConstraintViolation { key: String, reason: String },

    #[error("restriction '{0}' rejected the proposed values")]
    RestrictionViolation(String),

    #[error("duplicate option key: {0}")]
    DuplicateKey(String),

    #[error("unknown option key: {0}")]
    UnknownKey(String),

    #[error("option map inserted into itself or one of its ancestors")]
    SelfReference,

    // -- Transport boundary --
    #[error("transport error: {0}")]
    Transport(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
