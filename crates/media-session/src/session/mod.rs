//! Media session coordination
//!
//! [`MediaSessionCoordinator`] owns one logical classroom session at a
//! time on top of a [`RealtimeMediaClient`]: it manages the local
//! audio/video track lifecycle, mute/enable state, remote participant
//! tracking, and connection-state transitions, and it relays transport
//! events to registered listeners.
//!
//! The coordinator is an explicit, caller-constructed object passed by
//! `Arc` to whichever component needs it. There is no process-global
//! instance; `initialize` stays idempotent so callers that treat the
//! coordinator as init-once keep working.
//!
//! # Event Flow
//!
//! ```text
//! RealtimeMediaClient ──mpsc──▶ relay task ──▶ state updates
//!                                    │          (connection state,
//!                                    │           participant map)
//!                                    └────────▶ ListenerRegistry ──▶ caller listeners
//! ```
//!
//! The relay task is attached *before* the join request goes out, so
//! early remote-participant events are never dropped.

pub mod builder;
pub mod config;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::{MediaSessionError, MediaSessionResult};
use crate::events::{EventSubscription, ListenerRegistry, SessionEvent, SessionEventKind};
use crate::transport::{LocalTrack, RealtimeMediaClient, TransportEvent};
use crate::types::{
    ConnectionState, LocalMediaState, MediaKind, NetworkQualityInfo, ParticipantId,
    RemoteParticipant, TrackKind,
};

use self::config::{CoordinatorConfig, VideoEncoderConfig};

pub use self::builder::MediaSessionBuilder;

/// Local track slots; at most one active track per kind per session
#[derive(Default)]
struct LocalTracks {
    audio: Option<Arc<dyn LocalTrack>>,
    video: Option<Arc<dyn LocalTrack>>,
    screen: Option<Arc<dyn LocalTrack>>,
}

/// State shared with the relay task
struct RelayShared {
    connection_state: RwLock<ConnectionState>,
    participants: DashMap<ParticipantId, RemoteParticipant>,
    registry: ListenerRegistry,
}

/// Coordinator for one live classroom media session
///
/// Wraps a [`RealtimeMediaClient`] and owns the session state machine:
/// connection lifecycle, local track lifecycle, and remote participant
/// presence. All state mutation happens through this type's methods;
/// layered controllers (screen share, recording) never duplicate its
/// bookkeeping.
pub struct MediaSessionCoordinator {
    transport: Arc<dyn RealtimeMediaClient>,
    config: RwLock<Option<CoordinatorConfig>>,
    initialized: AtomicBool,
    joined: AtomicBool,
    local: Mutex<LocalTracks>,
    relay_task: Mutex<Option<JoinHandle<()>>>,
    shared: Arc<RelayShared>,
}

impl MediaSessionCoordinator {
    /// Create an uninitialized coordinator over the given transport
    ///
    /// The transport handle is injected rather than constructed
    /// internally so tests and alternative engines can supply their own
    /// implementation. Call [`initialize`](Self::initialize) before any
    /// other operation.
    pub fn new(transport: Arc<dyn RealtimeMediaClient>) -> Self {
        Self {
            transport,
            config: RwLock::new(None),
            initialized: AtomicBool::new(false),
            joined: AtomicBool::new(false),
            local: Mutex::new(LocalTracks::default()),
            relay_task: Mutex::new(None),
            shared: Arc::new(RelayShared {
                connection_state: RwLock::new(ConnectionState::Disconnected),
                participants: DashMap::new(),
                registry: ListenerRegistry::new(),
            }),
        }
    }

    /// Initialize the coordinator with the given configuration
    ///
    /// Idempotent: if the coordinator is already initialized the call
    /// logs and returns `Ok` without side effects. The configuration is
    /// validated before the transport is touched.
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::Configuration`] - the application id is
    ///   missing or malformed, or the transport rejected initialization
    pub async fn initialize(&self, config: CoordinatorConfig) -> MediaSessionResult<()> {
        if self.initialized.load(Ordering::SeqCst) {
            tracing::info!("Coordinator already initialized, ignoring repeated initialize");
            return Ok(());
        }

        config.validate()?;

        self.transport
            .initialize(&config.app_id)
            .await
            .map_err(|e| {
                MediaSessionError::configuration(
                    "app_id",
                    format!("transport initialization failed: {e}"),
                )
            })?;

        *self.config.write().unwrap() = Some(config);
        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!("Media session coordinator initialized");
        Ok(())
    }

    /// Join a named room
    ///
    /// The relay task consuming transport events is attached *before*
    /// the join request is issued, so remote-participant events arriving
    /// during join are never dropped. The coordinator does not assume
    /// the join succeeded at the media level; the `Connected` state is
    /// only entered when the transport emits the corresponding
    /// connection-state event.
    ///
    /// # Arguments
    ///
    /// * `room_name` - Name of the room to join
    /// * `token` - Access token for the room
    /// * `participant_id` - Local participant identifier
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::NotInitialized`] - `initialize` has not run
    /// * [`MediaSessionError::Join`] - already joined, the transport
    ///   event stream was unavailable, or the transport rejected the
    ///   join. On failure the coordinator's state is unchanged; no retry
    ///   is attempted, retry policy belongs to the caller.
    pub async fn join_room(
        &self,
        room_name: &str,
        token: &str,
        participant_id: &str,
    ) -> MediaSessionResult<()> {
        self.ensure_initialized("join_room")?;

        if self.joined.load(Ordering::SeqCst) {
            return Err(MediaSessionError::join(
                "already joined a room; only one session may be active",
            ));
        }

        // Listener registration before join is an ordering invariant,
        // not a race to win.
        self.attach_relay().await?;

        match self.transport.join(room_name, token, participant_id).await {
            Ok(()) => {
                self.joined.store(true, Ordering::SeqCst);
                tracing::info!("Joined room '{}' as '{}'", room_name, participant_id);
                Ok(())
            }
            Err(e) => {
                self.detach_relay().await;
                tracing::warn!("Join of room '{}' rejected: {}", room_name, e);
                Err(MediaSessionError::join(e.to_string()))
            }
        }
    }

    /// Leave the current room
    ///
    /// Order-safe and idempotent. Local video, audio, and screen tracks
    /// are unpublished in that order before the room is left, so no
    /// locally published track is ever orphaned on the transport after
    /// departure. Unpublish failures are logged and never block
    /// departure; local slots are guaranteed cleared regardless of the
    /// remote leave outcome.
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::Operation`] - the transport leave itself
    ///   failed (local resources are already released at that point)
    pub async fn leave_room(&self) -> MediaSessionResult<()> {
        if let Err(e) = self.unpublish_local_video().await {
            tracing::warn!("Unpublish of camera track during leave failed: {}", e);
        }
        if let Err(e) = self.unpublish_local_audio().await {
            tracing::warn!("Unpublish of microphone track during leave failed: {}", e);
        }
        if let Err(e) = self.unpublish_screen().await {
            tracing::warn!("Unpublish of screen track during leave failed: {}", e);
        }

        if !self.joined.swap(false, Ordering::SeqCst) {
            tracing::debug!("leave_room called while not joined, nothing to do");
            return Ok(());
        }

        self.transport
            .leave()
            .await
            .map_err(|e| MediaSessionError::operation("leave_room", e.to_string()))?;
        tracing::info!("Left room");
        Ok(())
    }

    /// Create, attach, and publish the local camera track
    ///
    /// Exactly one camera track may be active; a second publish fails
    /// fast rather than replacing the first. If track creation succeeds
    /// but the publish fails, the created track is stopped and released
    /// before the error surfaces.
    ///
    /// # Arguments
    ///
    /// * `render_target_id` - Identifier of the local preview surface
    /// * `encoder` - Per-call encoder override; `None` uses the
    ///   configured default (~720p at 24fps for a classroom)
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::NotInitialized`] - `initialize` has not run
    /// * [`MediaSessionError::Publish`] - a camera track already exists,
    ///   capture acquisition failed, or the transport publish failed
    pub async fn publish_local_video(
        &self,
        render_target_id: &str,
        encoder: Option<VideoEncoderConfig>,
    ) -> MediaSessionResult<()> {
        self.ensure_initialized("publish_local_video")?;
        let encoder = encoder.unwrap_or_else(|| self.default_encoder());

        let mut local = self.local.lock().await;
        if local.video.is_some() {
            return Err(MediaSessionError::publish(
                TrackKind::Camera,
                "a camera track is already published",
            ));
        }

        let track = self
            .transport
            .create_camera_track(&encoder)
            .await
            .map_err(|e| MediaSessionError::publish(TrackKind::Camera, e.to_string()))?;
        track.attach(render_target_id);

        if let Err(e) = self.transport.publish(track.clone()).await {
            if let Err(stop_err) = track.stop().await {
                tracing::warn!(
                    "Releasing camera track after failed publish also failed: {}",
                    stop_err
                );
            }
            return Err(MediaSessionError::publish(TrackKind::Camera, e.to_string()));
        }

        local.video = Some(track);
        tracing::info!("Published local camera track");
        Ok(())
    }

    /// Create and publish the local microphone track
    ///
    /// Same guarantees as [`publish_local_video`](Self::publish_local_video):
    /// one active microphone track, and the created track is released if
    /// the publish step fails.
    pub async fn publish_local_audio(&self) -> MediaSessionResult<()> {
        self.ensure_initialized("publish_local_audio")?;

        let mut local = self.local.lock().await;
        if local.audio.is_some() {
            return Err(MediaSessionError::publish(
                TrackKind::Microphone,
                "a microphone track is already published",
            ));
        }

        let track = self
            .transport
            .create_microphone_track()
            .await
            .map_err(|e| MediaSessionError::publish(TrackKind::Microphone, e.to_string()))?;

        if let Err(e) = self.transport.publish(track.clone()).await {
            if let Err(stop_err) = track.stop().await {
                tracing::warn!(
                    "Releasing microphone track after failed publish also failed: {}",
                    stop_err
                );
            }
            return Err(MediaSessionError::publish(
                TrackKind::Microphone,
                e.to_string(),
            ));
        }

        local.audio = Some(track);
        tracing::info!("Published local microphone track");
        Ok(())
    }

    /// Unpublish and release the local camera track
    ///
    /// Safe to call when nothing is published (a no-op, not an error).
    /// The local slot is cleared even when the underlying unpublish or
    /// release fails, so repeated cleanup attempts never pile up.
    pub async fn unpublish_local_video(&self) -> MediaSessionResult<()> {
        let track = self.local.lock().await.video.take();
        let Some(track) = track else {
            tracing::debug!("No local camera track to unpublish");
            return Ok(());
        };
        self.release_track(track, TrackKind::Camera).await
    }

    /// Unpublish and release the local microphone track
    ///
    /// Same no-op and bookkeeping guarantees as
    /// [`unpublish_local_video`](Self::unpublish_local_video).
    pub async fn unpublish_local_audio(&self) -> MediaSessionResult<()> {
        let track = self.local.lock().await.audio.take();
        let Some(track) = track else {
            tracing::debug!("No local microphone track to unpublish");
            return Ok(());
        };
        self.release_track(track, TrackKind::Microphone).await
    }

    /// Mute the local microphone track without destroying it
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::TrackNotInitialized`] - no microphone
    ///   track is currently published
    pub async fn mute_local_audio(&self) -> MediaSessionResult<()> {
        self.set_local_enabled(TrackKind::Microphone, false).await
    }

    /// Unmute the local microphone track
    pub async fn unmute_local_audio(&self) -> MediaSessionResult<()> {
        self.set_local_enabled(TrackKind::Microphone, true).await
    }

    /// Re-enable the local camera track
    pub async fn enable_local_video(&self) -> MediaSessionResult<()> {
        self.set_local_enabled(TrackKind::Camera, true).await
    }

    /// Disable the local camera track without destroying it
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::TrackNotInitialized`] - no camera track is
    ///   currently published
    pub async fn disable_local_video(&self) -> MediaSessionResult<()> {
        self.set_local_enabled(TrackKind::Camera, false).await
    }

    /// Request delivery of a remote participant's media
    ///
    /// Pass-through to the transport; the coordinator does not cache
    /// subscription decisions beyond what the transport already reports.
    pub async fn subscribe_to_remote(
        &self,
        participant_id: &ParticipantId,
        kind: MediaKind,
    ) -> MediaSessionResult<()> {
        self.ensure_initialized("subscribe_to_remote")?;
        self.transport
            .subscribe(participant_id, kind)
            .await
            .map_err(|e| MediaSessionError::subscription(e.to_string()))
    }

    /// Stop delivery of a remote participant's media
    pub async fn unsubscribe_from_remote(
        &self,
        participant_id: &ParticipantId,
    ) -> MediaSessionResult<()> {
        self.ensure_initialized("unsubscribe_from_remote")?;
        self.transport
            .unsubscribe(participant_id)
            .await
            .map_err(|e| MediaSessionError::subscription(e.to_string()))
    }

    /// Create and publish an additional screen-capture track
    ///
    /// Screen bookkeeping lives here, not in the screen share
    /// controller, so there is exactly one source of truth for whether a
    /// screen track exists. Same release-on-failed-publish guarantee as
    /// the camera path.
    pub async fn publish_screen(&self, render_target_id: &str) -> MediaSessionResult<()> {
        self.ensure_initialized("publish_screen")?;

        let mut local = self.local.lock().await;
        if local.screen.is_some() {
            return Err(MediaSessionError::publish(
                TrackKind::Screen,
                "a screen track is already published",
            ));
        }

        let track = self
            .transport
            .create_screen_track()
            .await
            .map_err(|e| MediaSessionError::publish(TrackKind::Screen, e.to_string()))?;
        track.attach(render_target_id);

        if let Err(e) = self.transport.publish(track.clone()).await {
            if let Err(stop_err) = track.stop().await {
                tracing::warn!(
                    "Releasing screen track after failed publish also failed: {}",
                    stop_err
                );
            }
            return Err(MediaSessionError::publish(TrackKind::Screen, e.to_string()));
        }

        local.screen = Some(track);
        tracing::info!("Published screen track");
        Ok(())
    }

    /// Unpublish and release the screen track; no-op when none exists
    pub async fn unpublish_screen(&self) -> MediaSessionResult<()> {
        let track = self.local.lock().await.screen.take();
        let Some(track) = track else {
            tracing::debug!("No screen track to unpublish");
            return Ok(());
        };
        self.release_track(track, TrackKind::Screen).await
    }

    /// Whether a screen track is currently published
    pub async fn is_screen_published(&self) -> bool {
        self.local.lock().await.screen.is_some()
    }

    /// Register a listener for a session event kind
    ///
    /// Multiple listeners may be registered per kind; delivery order is
    /// registration order and a panicking listener never blocks the
    /// rest. The returned token deregisters via
    /// [`remove_event_listener`](Self::remove_event_listener).
    pub fn add_event_listener<F>(&self, kind: SessionEventKind, listener: F) -> EventSubscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(kind, listener)
    }

    /// Deregister a previously added listener
    pub fn remove_event_listener(&self, subscription: &EventSubscription) -> bool {
        self.shared.registry.unsubscribe(subscription)
    }

    /// Current connection state towards the transport
    ///
    /// Transport `connection-state-change` events are the sole authority
    /// for this value; the intermediate `Reconnecting` state is surfaced
    /// so callers can show appropriate UI.
    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection_state.read().unwrap()
    }

    /// Snapshot of the remote participants currently in the room
    pub fn remote_participants(&self) -> Vec<RemoteParticipant> {
        self.shared
            .participants
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Look up a single remote participant
    pub fn get_remote_participant(&self, id: &ParticipantId) -> Option<RemoteParticipant> {
        self.shared.participants.get(id).map(|p| p.clone())
    }

    /// Snapshot of the local track bookkeeping
    pub async fn local_media_state(&self) -> LocalMediaState {
        let local = self.local.lock().await;
        LocalMediaState {
            audio_published: local.audio.is_some(),
            audio_enabled: local.audio.as_ref().map(|t| t.is_enabled()).unwrap_or(false),
            video_published: local.video.is_some(),
            video_enabled: local.video.as_ref().map(|t| t.is_enabled()).unwrap_or(false),
            screen_published: local.screen.is_some(),
        }
    }

    /// Whether `initialize` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether a room is currently joined
    pub fn is_joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }

    /// Full teardown
    ///
    /// Unpublishes all local tracks, leaves the room if joined, stops
    /// the event relay, clears all listener registrations, and resets
    /// the initialization flag so a fresh `initialize` can run later.
    /// Safe to call multiple times and from an uninitialized state;
    /// every cleanup step is best-effort and failures are only logged.
    pub async fn destroy(&self) {
        if let Err(e) = self.unpublish_local_video().await {
            tracing::warn!("Unpublish of camera track during destroy failed: {}", e);
        }
        if let Err(e) = self.unpublish_local_audio().await {
            tracing::warn!("Unpublish of microphone track during destroy failed: {}", e);
        }
        if let Err(e) = self.unpublish_screen().await {
            tracing::warn!("Unpublish of screen track during destroy failed: {}", e);
        }

        if self.joined.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.transport.leave().await {
                tracing::warn!("Leave during destroy failed: {}", e);
            }
        }

        self.detach_relay().await;
        self.shared.registry.clear();
        self.shared.participants.clear();
        *self.shared.connection_state.write().unwrap() = ConnectionState::Disconnected;
        *self.config.write().unwrap() = None;
        self.initialized.store(false, Ordering::SeqCst);
        tracing::info!("Media session coordinator destroyed");
    }

    fn ensure_initialized(&self, operation: &str) -> MediaSessionResult<()> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MediaSessionError::not_initialized(operation))
        }
    }

    fn default_encoder(&self) -> VideoEncoderConfig {
        self.config
            .read()
            .unwrap()
            .as_ref()
            .map(|c| c.video_encoder.clone())
            .unwrap_or_default()
    }

    async fn set_local_enabled(&self, kind: TrackKind, enabled: bool) -> MediaSessionResult<()> {
        let local = self.local.lock().await;
        let track = match kind {
            TrackKind::Microphone => local.audio.as_ref(),
            TrackKind::Camera => local.video.as_ref(),
            TrackKind::Screen => local.screen.as_ref(),
        }
        .ok_or(MediaSessionError::TrackNotInitialized { kind })?;
        track.set_enabled(enabled);
        tracing::debug!("Set {:?} track enabled = {}", kind, enabled);
        Ok(())
    }

    /// Unpublish and release a track already removed from its slot
    ///
    /// Both halves run even if the first fails; the slot is already
    /// cleared by the caller, so failed cleanup never repeats.
    async fn release_track(
        &self,
        track: Arc<dyn LocalTrack>,
        kind: TrackKind,
    ) -> MediaSessionResult<()> {
        let mut failure: Option<String> = None;

        if let Err(e) = self.transport.unpublish(track.clone()).await {
            tracing::warn!("Unpublish of {:?} track failed: {}", kind, e);
            failure = Some(e.to_string());
        }
        if let Err(e) = track.stop().await {
            tracing::warn!("Release of {:?} track failed: {}", kind, e);
            failure.get_or_insert(e.to_string());
        }

        match failure {
            Some(reason) => Err(MediaSessionError::unpublish(kind, reason)),
            None => {
                tracing::info!("Unpublished {:?} track", kind);
                Ok(())
            }
        }
    }

    async fn attach_relay(&self) -> MediaSessionResult<()> {
        let mut relay = self.relay_task.lock().await;
        if let Some(handle) = relay.as_ref() {
            if !handle.is_finished() {
                return Ok(());
            }
        }

        let mut rx = self
            .transport
            .take_events()
            .await
            .ok_or_else(|| MediaSessionError::join("transport event stream unavailable"))?;

        let shared = self.shared.clone();
        *relay = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_transport_event(&shared, event);
            }
            tracing::debug!("Transport event stream closed");
        }));
        Ok(())
    }

    async fn detach_relay(&self) {
        if let Some(handle) = self.relay_task.lock().await.take() {
            handle.abort();
        }
    }
}

/// Translate one transport event, update coordinator state, and dispatch
fn handle_transport_event(shared: &RelayShared, event: TransportEvent) {
    let session_event = match event {
        TransportEvent::ParticipantJoined { participant } => {
            let remote = RemoteParticipant {
                id: participant.id.clone(),
                has_audio: participant.has_audio,
                has_video: participant.has_video,
                is_speaking: participant.is_speaking,
                joined_at: Utc::now(),
            };
            shared.participants.insert(remote.id.clone(), remote.clone());
            tracing::debug!("Participant {} joined", remote.id);
            SessionEvent::ParticipantJoined { participant: remote }
        }
        TransportEvent::ParticipantLeft { participant_id } => {
            shared.participants.remove(&participant_id);
            tracing::debug!("Participant {} left", participant_id);
            SessionEvent::ParticipantLeft { participant_id }
        }
        TransportEvent::TrackPublished {
            participant_id,
            kind,
        } => {
            if let Some(mut participant) = shared.participants.get_mut(&participant_id) {
                match kind {
                    MediaKind::Audio => participant.has_audio = true,
                    MediaKind::Video => participant.has_video = true,
                }
            }
            SessionEvent::TrackPublished {
                participant_id,
                kind,
            }
        }
        TransportEvent::TrackUnpublished {
            participant_id,
            kind,
        } => {
            if let Some(mut participant) = shared.participants.get_mut(&participant_id) {
                match kind {
                    MediaKind::Audio => participant.has_audio = false,
                    MediaKind::Video => participant.has_video = false,
                }
            }
            SessionEvent::TrackUnpublished {
                participant_id,
                kind,
            }
        }
        TransportEvent::ConnectionStateChanged { state } => {
            let previous = {
                let mut current = shared.connection_state.write().unwrap();
                let previous = *current;
                *current = state;
                previous
            };
            tracing::info!("Connection state: {:?} -> {:?}", previous, state);
            SessionEvent::ConnectionStateChanged {
                previous,
                current: state,
            }
        }
        TransportEvent::NetworkQuality {
            participant_id,
            uplink,
            downlink,
        } => SessionEvent::NetworkQuality(NetworkQualityInfo {
            participant_id,
            uplink,
            downlink,
        }),
    };

    shared.registry.dispatch(&session_event);
}
