//! Error types for the media session coordination layer
//!
//! The taxonomy mirrors the operations of the crate: configuration and
//! initialization failures are fatal to the calling operation, transport
//! failures are wrapped into typed errors at the coordinator boundary, and
//! cleanup failures are surfaced without blocking local bookkeeping.

use thiserror::Error;

use crate::transport::TransportError;
use crate::types::TrackKind;

/// Result type for media session operations
pub type MediaSessionResult<T> = Result<T, MediaSessionError>;

/// Errors that can occur in the media session coordination layer
#[derive(Debug, Error)]
pub enum MediaSessionError {
    /// Bad or missing configuration, fatal to `initialize`
    #[error("Configuration error in field '{field}': {reason}")]
    Configuration { field: String, reason: String },

    /// Operation attempted before the coordinator was initialized
    #[error("Coordinator not initialized (operation: {operation})")]
    NotInitialized { operation: String },

    /// The transport rejected a room join; recoverable, the caller may retry
    #[error("Failed to join room: {reason}")]
    Join { reason: String },

    /// A toggle was attempted on a track that does not currently exist
    #[error("No active {kind:?} track; publish before toggling")]
    TrackNotInitialized { kind: TrackKind },

    /// Publishing a local track failed
    #[error("Failed to publish {kind:?} track: {reason}")]
    Publish { kind: TrackKind, reason: String },

    /// Unpublishing or releasing a local track failed; local bookkeeping
    /// is already cleared when this surfaces
    #[error("Failed to unpublish {kind:?} track: {reason}")]
    Unpublish { kind: TrackKind, reason: String },

    /// A remote subscribe/unsubscribe request failed at the transport
    #[error("Subscription request failed: {reason}")]
    Subscription { reason: String },

    /// A recording or screen-share operation failed
    #[error("Operation '{operation}' failed: {reason}")]
    Operation { operation: String, reason: String },

    /// The same operation is already in flight on this controller
    #[error("Operation '{operation}' is already in progress")]
    AlreadyInProgress { operation: String },

    /// Raw transport error that has no more specific mapping
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl MediaSessionError {
    /// Create a configuration error naming the offending field
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-initialized error for the given operation
    pub fn not_initialized(operation: impl Into<String>) -> Self {
        Self::NotInitialized {
            operation: operation.into(),
        }
    }

    /// Create a join error
    pub fn join(reason: impl Into<String>) -> Self {
        Self::Join {
            reason: reason.into(),
        }
    }

    /// Create a publish error for the given track kind
    pub fn publish(kind: TrackKind, reason: impl Into<String>) -> Self {
        Self::Publish {
            kind,
            reason: reason.into(),
        }
    }

    /// Create an unpublish error for the given track kind
    pub fn unpublish(kind: TrackKind, reason: impl Into<String>) -> Self {
        Self::Unpublish {
            kind,
            reason: reason.into(),
        }
    }

    /// Create a subscription error
    pub fn subscription(reason: impl Into<String>) -> Self {
        Self::Subscription {
            reason: reason.into(),
        }
    }

    /// Create a generic operation error
    pub fn operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an already-in-progress error
    pub fn already_in_progress(operation: impl Into<String>) -> Self {
        Self::AlreadyInProgress {
            operation: operation.into(),
        }
    }
}
