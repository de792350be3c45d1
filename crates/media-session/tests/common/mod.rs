#![allow(dead_code)]

//! Shared mock transport and gateway for integration tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Notify};

use liveclass_media_session::gateway::{
    GatewayError, GatewayResult, RecordingConfig, SessionPersistenceGateway, SessionRecord,
};
use liveclass_media_session::session::config::VideoEncoderConfig;
use liveclass_media_session::transport::{
    LocalTrack, ParticipantSummary, RealtimeMediaClient, TransportError, TransportEvent,
    TransportResult,
};
use liveclass_media_session::types::{MediaKind, ParticipantId, TrackKind};

/// Local track stub that records enable/attach/stop interactions
pub struct MockTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
    stop_calls: AtomicUsize,
    attached_to: Mutex<Option<String>>,
}

impl MockTrack {
    pub fn new(kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            id: format!("{kind:?}-track"),
            kind,
            enabled: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
            attached_to: Mutex::new(None),
        })
    }

    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn attached_to(&self) -> Option<String> {
        self.attached_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalTrack for MockTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn attach(&self, render_target_id: &str) {
        *self.attached_to.lock().unwrap() = Some(render_target_id.to_string());
    }

    async fn stop(&self) -> TransportResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted transport: records every call in order, fails operations on
/// request, and lets tests inject events into the coordinator's relay
pub struct MockMediaClient {
    ops: Mutex<Vec<String>>,
    fail_ops: Mutex<HashSet<String>>,
    event_tx: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
    tracks: Mutex<Vec<Arc<MockTrack>>>,
    screen_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockMediaClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            fail_ops: Mutex::new(HashSet::new()),
            event_tx: Mutex::new(None),
            tracks: Mutex::new(Vec::new()),
            screen_gate: Mutex::new(None),
        })
    }

    /// Make every future call named `op` fail
    pub fn fail_on(&self, op: &str) {
        self.fail_ops.lock().unwrap().insert(op.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_ops.lock().unwrap().clear();
    }

    /// Ordered log of transport calls made so far
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    /// Gate `create_screen_track` on a [`Notify`] so tests can hold a
    /// start in flight
    pub fn gate_screen_create(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.screen_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Inject a transport event into the stream taken by the coordinator
    pub fn emit(&self, event: TransportEvent) {
        let tx = self.event_tx.lock().unwrap();
        if let Some(tx) = tx.as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Most recently created track of the given kind
    pub fn last_track(&self, kind: TrackKind) -> Option<Arc<MockTrack>> {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| t.kind == kind)
            .cloned()
    }

    fn record(&self, name: &str, op: String) -> TransportResult<()> {
        self.ops.lock().unwrap().push(op);
        if self.fail_ops.lock().unwrap().contains(name) {
            Err(TransportError::new(format!("scripted failure of {name}")))
        } else {
            Ok(())
        }
    }

    fn create_track(&self, name: &str, kind: TrackKind) -> TransportResult<Arc<dyn LocalTrack>> {
        self.record(name, name.to_string())?;
        let track = MockTrack::new(kind);
        self.tracks.lock().unwrap().push(track.clone());
        Ok(track)
    }
}

#[async_trait]
impl RealtimeMediaClient for MockMediaClient {
    async fn initialize(&self, app_id: &str) -> TransportResult<()> {
        self.record("initialize", format!("initialize({app_id})"))
    }

    async fn join(
        &self,
        room_name: &str,
        token: &str,
        participant_id: &str,
    ) -> TransportResult<()> {
        self.record("join", format!("join({room_name},{token},{participant_id})"))
    }

    async fn leave(&self) -> TransportResult<()> {
        self.record("leave", "leave".to_string())
    }

    async fn create_camera_track(
        &self,
        _encoder: &VideoEncoderConfig,
    ) -> TransportResult<Arc<dyn LocalTrack>> {
        self.create_track("create_camera_track", TrackKind::Camera)
    }

    async fn create_microphone_track(&self) -> TransportResult<Arc<dyn LocalTrack>> {
        self.create_track("create_microphone_track", TrackKind::Microphone)
    }

    async fn create_screen_track(&self) -> TransportResult<Arc<dyn LocalTrack>> {
        let gate = self.screen_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.create_track("create_screen_track", TrackKind::Screen)
    }

    async fn publish(&self, track: Arc<dyn LocalTrack>) -> TransportResult<()> {
        self.record("publish", format!("publish({:?})", track.kind()))
    }

    async fn unpublish(&self, track: Arc<dyn LocalTrack>) -> TransportResult<()> {
        self.record("unpublish", format!("unpublish({:?})", track.kind()))
    }

    async fn subscribe(
        &self,
        participant_id: &ParticipantId,
        kind: MediaKind,
    ) -> TransportResult<()> {
        self.record("subscribe", format!("subscribe({participant_id},{kind:?})"))
    }

    async fn unsubscribe(&self, participant_id: &ParticipantId) -> TransportResult<()> {
        self.record("unsubscribe", format!("unsubscribe({participant_id})"))
    }

    async fn take_events(&self) -> Option<mpsc::UnboundedReceiver<TransportEvent>> {
        self.ops.lock().unwrap().push("take_events".to_string());
        let (tx, rx) = mpsc::unbounded_channel();
        *self.event_tx.lock().unwrap() = Some(tx);
        Some(rx)
    }
}

/// Scripted persistence gateway
pub struct MockGateway {
    ops: Mutex<Vec<String>>,
    accept_recording: AtomicBool,
    fail_ops: Mutex<HashSet<String>>,
    last_recording_config: Mutex<Option<RecordingConfig>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            accept_recording: AtomicBool::new(true),
            fail_ops: Mutex::new(HashSet::new()),
            last_recording_config: Mutex::new(None),
        })
    }

    pub fn decline_recordings(&self) {
        self.accept_recording.store(false, Ordering::SeqCst);
    }

    pub fn fail_on(&self, op: &str) {
        self.fail_ops.lock().unwrap().insert(op.to_string());
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn last_recording_config(&self) -> Option<RecordingConfig> {
        self.last_recording_config.lock().unwrap().clone()
    }

    fn record(&self, name: &str, op: String) -> GatewayResult<()> {
        self.ops.lock().unwrap().push(op);
        if self.fail_ops.lock().unwrap().contains(name) {
            Err(GatewayError::new(format!("scripted failure of {name}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionPersistenceGateway for MockGateway {
    async fn create_session(
        &self,
        class_id: &str,
        host_id: &str,
        room_name: &str,
    ) -> GatewayResult<SessionRecord> {
        self.record(
            "create_session",
            format!("create_session({class_id},{host_id},{room_name})"),
        )?;
        Ok(SessionRecord {
            id: format!("session-for-{class_id}"),
            class_id: class_id.to_string(),
            host_id: host_id.to_string(),
            room_name: room_name.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn end_session(&self, session_id: &str) -> GatewayResult<()> {
        self.record("end_session", format!("end_session({session_id})"))
    }

    async fn start_recording(
        &self,
        session_id: &str,
        config: &RecordingConfig,
    ) -> GatewayResult<bool> {
        self.record("start_recording", format!("start_recording({session_id})"))?;
        *self.last_recording_config.lock().unwrap() = Some(config.clone());
        Ok(self.accept_recording.load(Ordering::SeqCst))
    }
}

/// A participant summary as the transport would report it
pub fn summary(id: &str, has_audio: bool, has_video: bool) -> ParticipantSummary {
    ParticipantSummary {
        id: ParticipantId::new(id),
        has_audio,
        has_video,
        is_speaking: false,
    }
}

/// Initialize test logging; honors `RUST_LOG`, safe to call repeatedly
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Let the coordinator's relay task drain injected events
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
