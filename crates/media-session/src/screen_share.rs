//! Screen share control layered on the coordinator
//!
//! [`ScreenShareController`] adds start/stop sequencing and
//! stop-during-start handling on top of the coordinator's screen track
//! operations. The coordinator remains the single source of truth for
//! whether a screen track exists; this controller only tracks the
//! in-flight transition and the last failure.
//!
//! Internal state is guarded by an async mutex that is never held
//! across a transport await, so a slow capture-picker dialog cannot
//! block `stop` or `state` queries.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{MediaSessionError, MediaSessionResult};
use crate::session::MediaSessionCoordinator;
use crate::types::ScreenShareState;

#[derive(Default)]
struct ScreenShareInner {
    is_starting: bool,
    stop_requested: bool,
    error: Option<String>,
}

/// Controller for the local screen share
pub struct ScreenShareController {
    coordinator: Arc<MediaSessionCoordinator>,
    inner: Mutex<ScreenShareInner>,
}

impl ScreenShareController {
    /// Create a controller over the given coordinator
    pub fn new(coordinator: Arc<MediaSessionCoordinator>) -> Self {
        Self {
            coordinator,
            inner: Mutex::new(ScreenShareInner::default()),
        }
    }

    /// Start sharing the screen
    ///
    /// Acquires a screen capture track and publishes it to the room.
    /// Screen capture typically raises a source-picker dialog, so this
    /// can take a while; a `stop` issued in the meantime is honored as
    /// soon as the publish completes and the call still returns `Ok`.
    ///
    /// # Arguments
    ///
    /// * `render_target_id` - Identifier of the local preview surface
    ///
    /// # Errors
    ///
    /// * [`MediaSessionError::AlreadyInProgress`] - a start is already
    ///   in flight
    /// * [`MediaSessionError::Publish`] - a screen track already exists,
    ///   the user dismissed the capture picker, or the publish failed.
    ///   The failure reason is also retained in
    ///   [`state`](Self::state) until the next start attempt.
    pub async fn start(&self, render_target_id: &str) -> MediaSessionResult<()> {
        {
            let mut inner = self.inner.lock().await;
            if inner.is_starting {
                return Err(MediaSessionError::already_in_progress("start_screen_share"));
            }
            inner.is_starting = true;
            inner.stop_requested = false;
            inner.error = None;
        }

        let result = self.coordinator.publish_screen(render_target_id).await;

        let mut inner = self.inner.lock().await;
        inner.is_starting = false;
        match result {
            Ok(()) => {
                if inner.stop_requested {
                    inner.stop_requested = false;
                    drop(inner);
                    tracing::info!("Stop was requested during screen share start, tearing down");
                    if let Err(e) = self.coordinator.unpublish_screen().await {
                        tracing::warn!("Teardown of cancelled screen share failed: {}", e);
                    }
                    return Ok(());
                }
                tracing::info!("Screen share started");
                Ok(())
            }
            Err(e) => {
                inner.error = Some(e.to_string());
                tracing::warn!("Screen share start failed: {}", e);
                Err(e)
            }
        }
    }

    /// Stop sharing the screen
    ///
    /// Idempotent. If a start is currently in flight the stop is
    /// recorded and applied when the start completes; otherwise the
    /// screen track is unpublished immediately (a no-op when no share
    /// is active).
    pub async fn stop(&self) -> MediaSessionResult<()> {
        {
            let mut inner = self.inner.lock().await;
            if inner.is_starting {
                inner.stop_requested = true;
                tracing::debug!("Screen share still starting, stop deferred");
                return Ok(());
            }
            inner.error = None;
        }
        self.coordinator.unpublish_screen().await?;
        tracing::info!("Screen share stopped");
        Ok(())
    }

    /// Stop if currently sharing, otherwise start
    pub async fn toggle(&self, render_target_id: &str) -> MediaSessionResult<()> {
        if self.coordinator.is_screen_published().await {
            self.stop().await
        } else {
            self.start(render_target_id).await
        }
    }

    /// Whether a screen track is currently published
    pub async fn is_sharing(&self) -> bool {
        self.coordinator.is_screen_published().await
    }

    /// Snapshot of the screen share state
    ///
    /// `is_sharing` reflects the coordinator's screen track slot;
    /// `error` holds the reason of the most recent failed start, cleared
    /// on the next start or stop.
    pub async fn state(&self) -> ScreenShareState {
        let (is_starting, error) = {
            let inner = self.inner.lock().await;
            (inner.is_starting, inner.error.clone())
        };
        ScreenShareState {
            is_sharing: self.coordinator.is_screen_published().await,
            is_starting,
            error,
        }
    }
}
