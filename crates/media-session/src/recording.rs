//! Recording control over the persistence gateway
//!
//! [`RecordingController`] asks the backend (via
//! [`SessionPersistenceGateway`]) to record a session server-side and
//! keeps a local, display-oriented view of the recording: an identifier,
//! a one-second duration tick, and pause/resume of that tick.
//!
//! The duration counter is local only. Pausing it does not pause the
//! backend recording; the gateway has no pause operation, and the
//! backend recording ends together with the session. Callers that need
//! authoritative durations must read them from the stored artifact.
//!
//! Tick cancellation is race-free by generation counter: every start
//! bumps the generation and the tick task re-checks it each second, so
//! a tick that was already in flight when `stop` ran can never count
//! against a later recording.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{MediaSessionError, MediaSessionResult};
use crate::gateway::{RecordingConfig, SessionPersistenceGateway};
use crate::types::RecordingState;

/// Format a duration in whole seconds for display
///
/// # Examples
///
/// ```rust
/// use liveclass_media_session::recording::format_duration;
///
/// assert_eq!(format_duration(42), "42s");
/// assert_eq!(format_duration(125), "2m 5s");
/// assert_eq!(format_duration(3725), "1h 2m 5s");
/// ```
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Counter state shared with the tick task
struct TickShared {
    duration_secs: AtomicU64,
    generation: AtomicU64,
    paused: AtomicBool,
}

#[derive(Default)]
struct RecordingInner {
    is_recording: bool,
    is_starting: bool,
    recording_id: Option<String>,
    session_id: Option<String>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

/// Controller for server-side session recording
///
/// Lock order: `state` before `tick_task`; never the reverse.
pub struct RecordingController {
    gateway: Arc<dyn SessionPersistenceGateway>,
    state: Mutex<RecordingInner>,
    ticker: Arc<TickShared>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingController {
    /// Create a controller over the given persistence gateway
    pub fn new(gateway: Arc<dyn SessionPersistenceGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(RecordingInner::default()),
            ticker: Arc::new(TickShared {
                duration_secs: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                paused: AtomicBool::new(false),
            }),
            tick_task: Mutex::new(None),
        }
    }

    /// Start recording the given session
    ///
    /// Issues the start request to the backend, then, on acceptance,
    /// assigns a fresh local recording identifier, resets the duration
    /// counter to zero, and spawns the one-second tick task.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Backend session to record
    /// * `config` - Quality and format parameters; `None` uses defaults
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::AlreadyInProgress`] - a recording is
    ///   active or a start is in flight
    /// * [`MediaSessionError::Operation`] - the backend call failed or
    ///   the backend declined the request. The reason is retained in
    ///   [`state`](Self::state) until the next start attempt.
    pub async fn start_recording(
        &self,
        session_id: &str,
        config: Option<RecordingConfig>,
    ) -> MediaSessionResult<()> {
        {
            let mut state = self.state.lock().await;
            if state.is_recording || state.is_starting {
                return Err(MediaSessionError::already_in_progress("start_recording"));
            }
            state.is_starting = true;
            state.error = None;
        }

        let config = config.unwrap_or_default();
        let accepted = self.gateway.start_recording(session_id, &config).await;

        let mut state = self.state.lock().await;
        state.is_starting = false;
        match accepted {
            Ok(true) => {}
            Ok(false) => {
                let reason = "backend declined the recording request".to_string();
                state.error = Some(reason.clone());
                return Err(MediaSessionError::operation("start_recording", reason));
            }
            Err(e) => {
                state.error = Some(e.to_string());
                return Err(MediaSessionError::operation("start_recording", e.to_string()));
            }
        }

        let recording_id = Uuid::new_v4().to_string();
        state.is_recording = true;
        state.recording_id = Some(recording_id.clone());
        state.session_id = Some(session_id.to_string());
        state.started_at = Some(Utc::now());

        self.ticker.duration_secs.store(0, Ordering::SeqCst);
        self.ticker.paused.store(false, Ordering::SeqCst);
        self.ticker.generation.fetch_add(1, Ordering::SeqCst);

        let mut tick_task = self.tick_task.lock().await;
        if let Some(handle) = tick_task.take() {
            handle.abort();
        }
        *tick_task = Some(self.spawn_tick());

        tracing::info!(
            "Recording {} started for session {}",
            recording_id,
            session_id
        );
        Ok(())
    }

    /// Stop the recording
    ///
    /// Cancels the tick task, clears the recording identifier, and
    /// returns the final counted duration in seconds. The backend
    /// recording itself ends when the session ends; there is no
    /// stop-recording request to send.
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::Operation`] - no recording is active (so a
    ///   double stop surfaces as an error rather than silently passing)
    pub async fn stop_recording(&self) -> MediaSessionResult<u64> {
        let mut state = self.state.lock().await;
        if !state.is_recording {
            return Err(MediaSessionError::operation(
                "stop_recording",
                "no recording is active",
            ));
        }

        // Bump first so an in-flight tick can no longer count.
        self.ticker.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.tick_task.lock().await.take() {
            handle.abort();
        }

        let recording_id = state.recording_id.take();
        let session_id = state.session_id.take();
        state.is_recording = false;
        state.started_at = None;
        self.ticker.paused.store(false, Ordering::SeqCst);

        let duration = self.ticker.duration_secs.load(Ordering::SeqCst);
        tracing::info!(
            "Recording {} of session {} stopped after {}",
            recording_id.as_deref().unwrap_or("<unknown>"),
            session_id.as_deref().unwrap_or("<unknown>"),
            format_duration(duration)
        );
        Ok(duration)
    }

    /// Pause the local duration counter
    ///
    /// Local display state only; the backend keeps recording. Returns
    /// whether the call changed anything (`false` when no recording is
    /// active or the counter is already paused).
    pub async fn pause(&self) -> bool {
        let state = self.state.lock().await;
        if !state.is_recording {
            return false;
        }
        let changed = !self.ticker.paused.swap(true, Ordering::SeqCst);
        if changed {
            tracing::debug!("Recording duration counter paused");
        }
        changed
    }

    /// Resume the local duration counter
    ///
    /// Returns whether the call changed anything.
    pub async fn resume(&self) -> bool {
        let state = self.state.lock().await;
        if !state.is_recording {
            return false;
        }
        let changed = self.ticker.paused.swap(false, Ordering::SeqCst);
        if changed {
            tracing::debug!("Recording duration counter resumed");
        }
        changed
    }

    /// Whether a recording is currently active
    pub async fn is_recording(&self) -> bool {
        self.state.lock().await.is_recording
    }

    /// Whether the duration counter is paused
    pub fn is_paused(&self) -> bool {
        self.ticker.paused.load(Ordering::SeqCst)
    }

    /// Counted duration of the current (or last) recording in seconds
    pub fn duration_seconds(&self) -> u64 {
        self.ticker.duration_secs.load(Ordering::SeqCst)
    }

    /// Counted duration formatted for display
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_seconds())
    }

    /// Snapshot of the recording state
    pub async fn state(&self) -> RecordingState {
        let state = self.state.lock().await;
        RecordingState {
            is_recording: state.is_recording,
            is_starting: state.is_starting,
            recording_id: state.recording_id.clone(),
            duration_seconds: self.ticker.duration_secs.load(Ordering::SeqCst),
            error: state.error.clone(),
            started_at: state.started_at,
        }
    }

    /// Cancel any active tick unconditionally
    ///
    /// Invoked on caller teardown regardless of recording state so no
    /// orphaned timer survives the owning context. Does not touch the
    /// recording flags; a later [`stop_recording`](Self::stop_recording)
    /// still settles them.
    pub async fn cleanup(&self) {
        self.ticker.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.tick_task.lock().await.take() {
            handle.abort();
        }
        tracing::debug!("Recording duration tick cancelled during cleanup");
    }

    fn spawn_tick(&self) -> JoinHandle<()> {
        let shared = self.ticker.clone();
        let generation = shared.generation.load(Ordering::SeqCst);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if shared.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                if !shared.paused.load(Ordering::SeqCst) {
                    shared.duration_secs.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
    }
}
