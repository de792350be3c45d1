//! Coordinator configuration structures
//!
//! Configuration consumed by [`crate::session::MediaSessionCoordinator::initialize`]:
//! the required application identifier, optional transport tuning
//! (region, codec profile, channel mode), and the default video encoder
//! parameters used when a publish call does not override them.
//!
//! # Usage Examples
//!
//! ## Basic configuration
//!
//! ```rust
//! use liveclass_media_session::session::config::CoordinatorConfig;
//!
//! let config = CoordinatorConfig::new("classroom-app-id");
//! assert!(config.validate().is_ok());
//! assert_eq!(config.video_encoder.height, 720);
//! ```
//!
//! ## Tuned configuration
//!
//! ```rust
//! use liveclass_media_session::session::config::{
//!     ChannelMode, CodecProfile, CoordinatorConfig, Region, VideoEncoderConfig,
//! };
//!
//! let config = CoordinatorConfig::new("classroom-app-id")
//!     .with_region(Region::Europe)
//!     .with_codec_profile(CodecProfile::Advanced)
//!     .with_channel_mode(ChannelMode::Broadcast)
//!     .with_video_encoder(VideoEncoderConfig {
//!         width: 1920,
//!         height: 1080,
//!         frame_rate: 30,
//!         bitrate_min_kbps: 800,
//!         bitrate_max_kbps: 3000,
//!     });
//!
//! assert_eq!(config.channel_mode, ChannelMode::Broadcast);
//! assert_eq!(config.video_encoder.width, 1920);
//! ```
//!
//! ## Validation
//!
//! ```rust
//! use liveclass_media_session::session::config::CoordinatorConfig;
//!
//! let config = CoordinatorConfig::new("");
//! assert!(config.validate().is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{MediaSessionError, MediaSessionResult};

/// Geographic region hint for the transport engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    /// Let the engine pick
    Global,
    /// North America
    NorthAmerica,
    /// Europe
    Europe,
    /// Asia-Pacific
    AsiaPacific,
}

/// Video codec profile requested from the transport engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecProfile {
    /// Widely-compatible baseline profile
    Baseline,
    /// Higher-efficiency profile where supported
    Advanced,
}

/// Channel mode of the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Every participant may publish (small classes)
    Conference,
    /// Host publishes, audience subscribes (lectures)
    Broadcast,
}

/// Encoder quality parameters for local video capture
///
/// Defaults are reasonable for a classroom camera feed; callers may
/// override per publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEncoderConfig {
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
    /// Frame rate in frames per second
    pub frame_rate: u32,
    /// Lower bitrate bound in kilobits per second
    pub bitrate_min_kbps: u32,
    /// Upper bitrate bound in kilobits per second
    pub bitrate_max_kbps: u32,
}

impl Default for VideoEncoderConfig {
    fn default() -> Self {
        // ~720p at 24fps suits a classroom camera feed
        Self {
            width: 1280,
            height: 720,
            frame_rate: 24,
            bitrate_min_kbps: 400,
            bitrate_max_kbps: 1500,
        }
    }
}

/// Configuration for [`crate::session::MediaSessionCoordinator::initialize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Application identifier issued by the transport provider (required)
    pub app_id: String,
    /// Geographic region hint
    pub region: Region,
    /// Requested codec profile
    pub codec_profile: CodecProfile,
    /// Channel mode of rooms joined through this coordinator
    pub channel_mode: ChannelMode,
    /// Default encoder parameters for local video publishes
    pub video_encoder: VideoEncoderConfig,
}

impl CoordinatorConfig {
    /// Create a configuration with the given application id and defaults
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            region: Region::Global,
            codec_profile: CodecProfile::Baseline,
            channel_mode: ChannelMode::Conference,
            video_encoder: VideoEncoderConfig::default(),
        }
    }

    /// Set the region hint
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set the codec profile
    pub fn with_codec_profile(mut self, profile: CodecProfile) -> Self {
        self.codec_profile = profile;
        self
    }

    /// Set the channel mode
    pub fn with_channel_mode(mut self, mode: ChannelMode) -> Self {
        self.channel_mode = mode;
        self
    }

    /// Set the default video encoder parameters
    pub fn with_video_encoder(mut self, encoder: VideoEncoderConfig) -> Self {
        self.video_encoder = encoder;
        self
    }

    /// Validate the configuration
    ///
    /// The application id is required, must be non-empty, and must not
    /// contain whitespace. Returns a
    /// [`MediaSessionError::Configuration`] naming the offending field
    /// before any connection attempt is made.
    pub fn validate(&self) -> MediaSessionResult<()> {
        if self.app_id.trim().is_empty() {
            return Err(MediaSessionError::configuration(
                "app_id",
                "application id is required",
            ));
        }
        if self.app_id.chars().any(char::is_whitespace) {
            return Err(MediaSessionError::configuration(
                "app_id",
                "application id must not contain whitespace",
            ));
        }
        if self.video_encoder.bitrate_min_kbps > self.video_encoder.bitrate_max_kbps {
            return Err(MediaSessionError::configuration(
                "video_encoder",
                "minimum bitrate exceeds maximum bitrate",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_encoder_targets_classroom_quality() {
        let encoder = VideoEncoderConfig::default();
        assert_eq!((encoder.width, encoder.height), (1280, 720));
        assert_eq!(encoder.frame_rate, 24);
        assert!(encoder.bitrate_min_kbps <= encoder.bitrate_max_kbps);
    }

    #[test]
    fn validate_rejects_empty_app_id() {
        let err = CoordinatorConfig::new("").validate().unwrap_err();
        match err {
            MediaSessionError::Configuration { field, .. } => assert_eq!(field, "app_id"),
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_whitespace_app_id() {
        assert!(CoordinatorConfig::new("app id").validate().is_err());
        assert!(CoordinatorConfig::new("   ").validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_bitrate_bounds() {
        let config = CoordinatorConfig::new("app").with_video_encoder(VideoEncoderConfig {
            bitrate_min_kbps: 2000,
            bitrate_max_kbps: 400,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_methods_apply() {
        let config = CoordinatorConfig::new("app")
            .with_region(Region::AsiaPacific)
            .with_codec_profile(CodecProfile::Advanced)
            .with_channel_mode(ChannelMode::Broadcast);
        assert_eq!(config.region, Region::AsiaPacific);
        assert_eq!(config.codec_profile, CodecProfile::Advanced);
        assert_eq!(config.channel_mode, ChannelMode::Broadcast);
        assert!(config.validate().is_ok());
    }
}
