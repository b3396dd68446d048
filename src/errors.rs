//! Error types for recorder operations

use thiserror::Error;

/// Errors that can occur when recording or retrieving events
///
/// Callers are expected to treat [`RecorderError::Conflict`] as retryable:
/// re-read the aggregate, rebuild the batch with fresh versions, insert
/// again. Every other variant indicates a caller bug, bad data in the log,
/// or a misconfigured environment, and retrying will not help.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Malformed insert batch: versions for an aggregate are not strictly
    /// contiguous within the batch. Detected before any I/O.
    #[error("invalid event batch: {0}")]
    Validation(String),

    /// The log rejected a conditional append because a conflicting tagged
    /// event already exists. Signals a lost optimistic-concurrency race.
    #[error("conditional append rejected: {0}")]
    Conflict(String),

    /// A tag retrieved from the log does not match the expected encoding.
    /// Indicates data corruption or a foreign writer.
    #[error("tag decoding failed: {0}")]
    Decode(String),

    /// The requested capability is deliberately not offered by this adapter.
    #[error("capability not offered: {0}")]
    Unsupported(String),

    /// Missing or invalid connection configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport or server-side failure reported by the log service.
    #[error("log service error: {0}")]
    Log(String),
}

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;
