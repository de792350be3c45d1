//! Session persistence gateway boundary
//!
//! The backend that stores classroom sessions and drives server-side
//! recording is a consumed capability; this module only defines the
//! narrow interface the coordination layer calls through. Storage
//! semantics belong to the implementing service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error reported by the persistence gateway
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    /// Human-readable failure reason from the backend
    pub message: String,
}

impl GatewayError {
    /// Create a gateway error with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A persisted classroom session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Backend-assigned session identifier
    pub id: String,
    /// Class this session belongs to
    pub class_id: String,
    /// Participant id of the hosting teacher
    pub host_id: String,
    /// Name of the real-time room backing this session
    pub room_name: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

/// Container format for a server-side recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerFormat {
    /// MP4 container
    Mp4,
    /// WebM container
    WebM,
    /// Matroska container
    Mkv,
}

/// Quality and format parameters for a recording start request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Recording width in pixels
    pub width: u32,
    /// Recording height in pixels
    pub height: u32,
    /// Target bitrate in kilobits per second
    pub bitrate_kbps: u32,
    /// Frame rate in frames per second
    pub frame_rate: u32,
    /// Record audio only, ignoring video tracks
    pub audio_only: bool,
    /// Container format for the recording artifact
    pub container: ContainerFormat,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            bitrate_kbps: 1500,
            frame_rate: 24,
            audio_only: false,
            container: ContainerFormat::Mp4,
        }
    }
}

/// The consumed session persistence capability
///
/// This crate calls these operations but does not define their storage
/// semantics. `start_recording` distinguishes transport failures
/// (`Err`) from an orderly rejection of the request (`Ok(false)`).
#[async_trait]
pub trait SessionPersistenceGateway: Send + Sync {
    /// Create a persisted session for a class hosted in the given room
    async fn create_session(
        &self,
        class_id: &str,
        host_id: &str,
        room_name: &str,
    ) -> GatewayResult<SessionRecord>;

    /// Mark a session as ended
    async fn end_session(&self, session_id: &str) -> GatewayResult<()>;

    /// Ask the backend to start recording the given session
    ///
    /// Returns `Ok(true)` when the backend accepted the request.
    async fn start_recording(
        &self,
        session_id: &str,
        config: &RecordingConfig,
    ) -> GatewayResult<bool>;
}
