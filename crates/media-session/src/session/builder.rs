//! Fluent construction of an initialized coordinator
//!
//! Wraps [`CoordinatorConfig`] assembly and the
//! [`MediaSessionCoordinator::initialize`] call into one step, returning
//! a ready-to-use `Arc` handle.

use std::sync::Arc;

use crate::error::MediaSessionResult;
use crate::transport::RealtimeMediaClient;

use super::config::{ChannelMode, CodecProfile, CoordinatorConfig, Region, VideoEncoderConfig};
use super::MediaSessionCoordinator;

/// Builder for an initialized [`MediaSessionCoordinator`]
///
/// # Usage
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use liveclass_media_session::session::builder::MediaSessionBuilder;
/// use liveclass_media_session::session::config::Region;
/// # use liveclass_media_session::transport::RealtimeMediaClient;
///
/// # async fn example(transport: Arc<dyn RealtimeMediaClient>) -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = MediaSessionBuilder::new("classroom-app-id")
///     .region(Region::Europe)
///     .build(transport)
///     .await?;
/// coordinator.join_room("math-101", "token", "teacher-1").await?;
/// # Ok(())
/// # }
/// ```
pub struct MediaSessionBuilder {
    config: CoordinatorConfig,
}

impl MediaSessionBuilder {
    /// Start a builder with the given application id and defaults
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            config: CoordinatorConfig::new(app_id),
        }
    }

    /// Set the region hint
    pub fn region(mut self, region: Region) -> Self {
        self.config = self.config.with_region(region);
        self
    }

    /// Set the codec profile
    pub fn codec_profile(mut self, profile: CodecProfile) -> Self {
        self.config = self.config.with_codec_profile(profile);
        self
    }

    /// Set the channel mode
    pub fn channel_mode(mut self, mode: ChannelMode) -> Self {
        self.config = self.config.with_channel_mode(mode);
        self
    }

    /// Set the default video encoder parameters
    pub fn video_encoder(mut self, encoder: VideoEncoderConfig) -> Self {
        self.config = self.config.with_video_encoder(encoder);
        self
    }

    /// Construct the coordinator over the given transport and initialize it
    ///
    /// # Errors
    ///
    /// * [`crate::error::MediaSessionError::Configuration`] - the
    ///   assembled configuration failed validation or the transport
    ///   rejected initialization
    pub async fn build(
        self,
        transport: Arc<dyn RealtimeMediaClient>,
    ) -> MediaSessionResult<Arc<MediaSessionCoordinator>> {
        let coordinator = Arc::new(MediaSessionCoordinator::new(transport));
        coordinator.initialize(self.config).await?;
        Ok(coordinator)
    }
}
