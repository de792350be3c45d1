//! Type definitions for the media session coordination layer
//!
//! This module contains the data structures shared across the coordinator
//! and its layered controllers: connection state, track and media kinds,
//! remote participant projections, and the state snapshots exposed to
//! callers (local media, screen share, recording).
//!
//! # Type Categories
//!
//! - **Connection Types** - Connection state and network quality
//! - **Media Types** - Track kinds and media kinds
//! - **Participant Types** - Read-only remote participant projections
//! - **Snapshot Types** - Point-in-time views of controller state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state of the coordinator towards the media transport
///
/// Owned exclusively by the `MediaSessionCoordinator`; it transitions only
/// in response to transport `connection-state-change` events. The
/// `Reconnecting` intermediate state is surfaced, not hidden, so callers
/// can show appropriate UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection to the transport's signaling/media path
    Disconnected,
    /// A join is in flight
    Connecting,
    /// Connected to the room
    Connected,
    /// The transport is attempting to recover a dropped connection
    Reconnecting,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

/// Identifier of a remote participant in the room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Create a new participant id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of media carried by a track, as seen by subscribe requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Audio media
    Audio,
    /// Video media (camera or screen)
    Video,
}

/// Kind of a local capture track
///
/// Screen capture is a second video publication layered on the same
/// connection, so it gets its own kind rather than reusing `Camera`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    /// Microphone capture
    Microphone,
    /// Camera capture
    Camera,
    /// Screen/window capture
    Screen,
}

impl TrackKind {
    /// The media kind this track carries on the wire
    pub fn media_kind(&self) -> MediaKind {
        match self {
            TrackKind::Microphone => MediaKind::Audio,
            TrackKind::Camera | TrackKind::Screen => MediaKind::Video,
        }
    }
}

/// Read-only projection of a remote participant
///
/// The coordinator never mutates a participant's tracks; this struct only
/// reflects what the transport has reported through its event stream. It
/// appears on a `participant-joined` event, is updated on track
/// publish/unpublish events, and is removed on `participant-left`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipant {
    /// Participant identifier assigned by the transport
    pub id: ParticipantId,
    /// Whether the participant currently has a published audio track
    pub has_audio: bool,
    /// Whether the participant currently has a published video track
    pub has_video: bool,
    /// Whether the transport reports this participant as speaking
    pub is_speaking: bool,
    /// When the participant joined, as observed locally
    pub joined_at: DateTime<Utc>,
}

/// Snapshot of the coordinator's local track bookkeeping
///
/// At most one audio, one video, and one screen track exist per session;
/// the `*_published` flags report slot occupancy and the `*_enabled` flags
/// report the active/mute state of the occupying track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMediaState {
    /// Whether a microphone track is currently published
    pub audio_published: bool,
    /// Whether the published microphone track is enabled (not muted)
    pub audio_enabled: bool,
    /// Whether a camera track is currently published
    pub video_published: bool,
    /// Whether the published camera track is enabled
    pub video_enabled: bool,
    /// Whether a screen track is currently published
    pub screen_published: bool,
}

impl LocalMediaState {
    /// A state with no tracks published
    pub fn empty() -> Self {
        Self {
            audio_published: false,
            audio_enabled: false,
            video_published: false,
            video_enabled: false,
            screen_published: false,
        }
    }
}

/// Snapshot of the screen share controller's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenShareState {
    /// Whether a screen track is currently published through the coordinator
    pub is_sharing: bool,
    /// Whether a start is currently in flight
    pub is_starting: bool,
    /// The last start/stop error, if any
    pub error: Option<String>,
}

/// Snapshot of the recording controller's state
///
/// `duration_seconds` is a locally-ticked counter, not derived from the
/// transport or the recording backend. It is best-effort client-side
/// bookkeeping and must not be treated as a reliable wall-clock duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingState {
    /// Whether a recording is currently active
    pub is_recording: bool,
    /// Whether a start request is currently in flight
    pub is_starting: bool,
    /// Identifier of the active recording, if any
    pub recording_id: Option<String>,
    /// Locally-ticked elapsed seconds since the recording started
    pub duration_seconds: u64,
    /// The last start/stop error, if any
    pub error: Option<String>,
    /// When the active recording started
    pub started_at: Option<DateTime<Utc>>,
}

/// Coarse network quality level reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    /// Quality not yet measured
    Unknown,
    /// No observed impairment
    Excellent,
    /// Minor impairment, media unaffected
    Good,
    /// Noticeable impairment
    Poor,
    /// Severe impairment, media likely degraded
    Bad,
}

/// Network quality report relayed from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkQualityInfo {
    /// Participant the report applies to; `None` means the local uplink
    pub participant_id: Option<ParticipantId>,
    /// Uplink quality level
    pub uplink: QualityLevel,
    /// Downlink quality level
    pub downlink: QualityLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_kind_maps_to_media_kind() {
        assert_eq!(TrackKind::Microphone.media_kind(), MediaKind::Audio);
        assert_eq!(TrackKind::Camera.media_kind(), MediaKind::Video);
        assert_eq!(TrackKind::Screen.media_kind(), MediaKind::Video);
    }

    #[test]
    fn connection_state_defaults_to_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn local_media_state_empty_has_nothing_published() {
        let state = LocalMediaState::empty();
        assert!(!state.audio_published);
        assert!(!state.video_published);
        assert!(!state.screen_published);
    }
}
