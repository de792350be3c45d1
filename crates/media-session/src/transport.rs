//! Real-time media transport boundary
//!
//! The transport engine that performs the actual network transmission of
//! audio/video packets is a consumed capability, not something this crate
//! implements. This module defines the narrow interface the coordinator
//! talks through: room join/leave, local track creation and
//! publish/unpublish, remote subscribe/unsubscribe, and a single event
//! stream delivered over an unbounded channel.
//!
//! Implementations are expected to emit every state change as a
//! [`TransportEvent`]; the coordinator does not assume success of a join
//! or a connection, it waits for the corresponding event.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::session::config::VideoEncoderConfig;
use crate::types::{ConnectionState, MediaKind, ParticipantId, QualityLevel, TrackKind};

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Error reported by the underlying media transport
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Human-readable failure reason from the engine
    pub message: String,
}

impl TransportError {
    /// Create a transport error with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An exclusively-owned handle to a live local capture device
///
/// Created by the transport's `create_*_track` methods, published through
/// [`RealtimeMediaClient::publish`], and released by [`LocalTrack::stop`].
/// Dropping the handle without calling `stop` leaks the capture device;
/// the coordinator guarantees `stop` is invoked on every exit path.
#[async_trait]
pub trait LocalTrack: Send + Sync {
    /// Transport-assigned identifier of this track
    fn id(&self) -> &str;

    /// What this track captures
    fn kind(&self) -> TrackKind;

    /// Toggle the track's active flag without destroying it
    ///
    /// A disabled audio track is muted; a disabled video track stops
    /// sending frames. The capture device stays acquired either way.
    fn set_enabled(&self, enabled: bool);

    /// Whether the track is currently enabled
    fn is_enabled(&self) -> bool;

    /// Attach the track to a local render target (video preview)
    ///
    /// Best-effort; a missing render target is not a publish failure.
    fn attach(&self, render_target_id: &str);

    /// Stop capture and release the underlying device
    async fn stop(&self) -> TransportResult<()>;
}

/// Descriptor of a remote participant as reported on join
#[derive(Debug, Clone)]
pub struct ParticipantSummary {
    /// Transport-assigned participant identifier
    pub id: ParticipantId,
    /// Whether the participant joined with a published audio track
    pub has_audio: bool,
    /// Whether the participant joined with a published video track
    pub has_video: bool,
    /// Whether the transport reports the participant as speaking
    pub is_speaking: bool,
}

/// Event emitted by the transport engine
///
/// Tagged-variant translation of the engine's callback surface. The
/// coordinator consumes these, updates its own state, and re-emits them
/// as [`crate::events::SessionEvent`]s so internal consumers are
/// decoupled from the engine's exact callback shapes.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A remote participant joined the room
    ParticipantJoined {
        /// The participant as reported by the engine
        participant: ParticipantSummary,
    },
    /// A remote participant left the room
    ParticipantLeft {
        /// Identifier of the departed participant
        participant_id: ParticipantId,
    },
    /// A remote participant published a track
    TrackPublished {
        /// Identifier of the publishing participant
        participant_id: ParticipantId,
        /// Kind of media published
        kind: MediaKind,
    },
    /// A remote participant unpublished a track
    TrackUnpublished {
        /// Identifier of the unpublishing participant
        participant_id: ParticipantId,
        /// Kind of media unpublished
        kind: MediaKind,
    },
    /// The engine's connection state changed
    ConnectionStateChanged {
        /// The new connection state
        state: ConnectionState,
    },
    /// A network quality report
    NetworkQuality {
        /// Participant the report applies to; `None` for the local uplink
        participant_id: Option<ParticipantId>,
        /// Uplink quality
        uplink: QualityLevel,
        /// Downlink quality
        downlink: QualityLevel,
    },
}

/// The consumed real-time media transport capability
///
/// One instance backs one coordinator. All methods are asynchronous and
/// may take arbitrarily long or fail; the coordinator wraps failures into
/// its own error taxonomy at this boundary.
#[async_trait]
pub trait RealtimeMediaClient: Send + Sync {
    /// Initialize the engine with the application identifier
    async fn initialize(&self, app_id: &str) -> TransportResult<()>;

    /// Join a named room with the given token and local participant id
    async fn join(
        &self,
        room_name: &str,
        token: &str,
        participant_id: &str,
    ) -> TransportResult<()>;

    /// Leave the current room
    async fn leave(&self) -> TransportResult<()>;

    /// Acquire the camera and create a video capture track
    async fn create_camera_track(
        &self,
        encoder: &VideoEncoderConfig,
    ) -> TransportResult<Arc<dyn LocalTrack>>;

    /// Acquire the microphone and create an audio capture track
    async fn create_microphone_track(&self) -> TransportResult<Arc<dyn LocalTrack>>;

    /// Acquire a screen/window stream and create a capture track
    async fn create_screen_track(&self) -> TransportResult<Arc<dyn LocalTrack>>;

    /// Publish a local track to the room
    async fn publish(&self, track: Arc<dyn LocalTrack>) -> TransportResult<()>;

    /// Unpublish a previously published local track
    async fn unpublish(&self, track: Arc<dyn LocalTrack>) -> TransportResult<()>;

    /// Request delivery of a remote participant's media
    async fn subscribe(
        &self,
        participant_id: &ParticipantId,
        kind: MediaKind,
    ) -> TransportResult<()>;

    /// Stop delivery of a remote participant's media
    async fn unsubscribe(&self, participant_id: &ParticipantId) -> TransportResult<()>;

    /// Take the engine's event stream
    ///
    /// Returns `None` once the stream has already been taken and not yet
    /// replaced by the engine (for example across a leave/join cycle the
    /// engine is expected to provide a fresh receiver).
    async fn take_events(&self) -> Option<mpsc::UnboundedReceiver<TransportEvent>>;
}
