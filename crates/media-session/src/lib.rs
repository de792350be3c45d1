//! # Live Classroom Media Session Coordination
//!
//! Coordination layer for live classroom audio/video sessions: room
//! lifecycle, local track publishing, remote participant tracking,
//! screen sharing, and recording control, on top of two consumed
//! capabilities that callers inject:
//!
//! * [`transport::RealtimeMediaClient`] - the real-time engine that
//!   moves media packets
//! * [`gateway::SessionPersistenceGateway`] - the backend that stores
//!   sessions and drives server-side recording
//!
//! This crate implements neither capability; it owns the state machine
//! between them and exposes a typed, event-driven API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Application                       │
//! └───────────┬─────────────┬──────────────┬────────────┘
//!             │             │              │
//!   MediaSessionCoordinator │              │
//!             │    ScreenShareController   │
//!             │             │     RecordingController
//!             ▼             ▼              ▼
//! ┌──────────────────────────────┐ ┌─────────────────────┐
//! │     RealtimeMediaClient      │ │ SessionPersistence  │
//! │     (injected transport)     │ │ Gateway (injected)  │
//! └──────────────────────────────┘ └─────────────────────┘
//! ```
//!
//! The screen share controller delegates its track bookkeeping to the
//! coordinator, so there is a single source of truth for what is
//! published. The recording controller talks only to the gateway.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use liveclass_media_session::{
//!     MediaSessionBuilder, SessionEventKind,
//! };
//! # use liveclass_media_session::transport::RealtimeMediaClient;
//!
//! # async fn example(transport: Arc<dyn RealtimeMediaClient>) -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = MediaSessionBuilder::new("classroom-app-id")
//!     .build(transport)
//!     .await?;
//!
//! // Listeners go on before the join so no early event is missed.
//! let subscription = coordinator.add_event_listener(
//!     SessionEventKind::ParticipantJoined,
//!     |event| println!("event: {event:?}"),
//! );
//!
//! coordinator.join_room("math-101", "room-token", "teacher-1").await?;
//! coordinator.publish_local_audio().await?;
//! coordinator.publish_local_video("preview-main", None).await?;
//!
//! // ... class happens ...
//!
//! coordinator.leave_room().await?;
//! coordinator.remove_event_listener(&subscription);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod gateway;
pub mod recording;
pub mod screen_share;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{MediaSessionError, MediaSessionResult};
pub use events::{EventSubscription, SessionEvent, SessionEventKind};
pub use gateway::{RecordingConfig, SessionPersistenceGateway, SessionRecord};
pub use recording::RecordingController;
pub use screen_share::ScreenShareController;
pub use session::builder::MediaSessionBuilder;
pub use session::config::CoordinatorConfig;
pub use session::MediaSessionCoordinator;
pub use transport::{LocalTrack, RealtimeMediaClient, TransportEvent};
pub use types::{
    ConnectionState, LocalMediaState, MediaKind, ParticipantId, RecordingState, RemoteParticipant,
    ScreenShareState, TrackKind,
};
