//! Integration tests for the recording controller against a scripted gateway

mod common;

use std::sync::Arc;

use common::{init_logging, MockGateway};
use liveclass_media_session::gateway::{ContainerFormat, RecordingConfig};
use liveclass_media_session::{MediaSessionError, RecordingController, SessionPersistenceGateway};

fn gateway() -> Arc<MockGateway> {
    init_logging();
    MockGateway::new()
}

#[tokio::test]
async fn recording_flows_through_the_session_lifecycle() {
    let gateway = gateway();
    let session = gateway
        .create_session("class-42", "teacher-1", "math-101")
        .await
        .unwrap();
    assert_eq!(session.class_id, "class-42");

    let controller = RecordingController::new(gateway.clone());
    controller.start_recording(&session.id, None).await.unwrap();
    assert!(controller.is_recording().await);

    let state = controller.state().await;
    assert!(state.recording_id.is_some());
    assert!(state.started_at.is_some());

    controller.stop_recording().await.unwrap();
    gateway.end_session(&session.id).await.unwrap();

    let ops = gateway.ops();
    assert_eq!(
        ops,
        vec![
            "create_session(class-42,teacher-1,math-101)".to_string(),
            format!("start_recording({})", session.id),
            format!("end_session({})", session.id),
        ]
    );
}

#[tokio::test]
async fn custom_recording_config_reaches_the_gateway() {
    let gateway = gateway();
    let controller = RecordingController::new(gateway.clone());

    let config = RecordingConfig {
        width: 1920,
        height: 1080,
        bitrate_kbps: 3000,
        frame_rate: 30,
        audio_only: false,
        container: ContainerFormat::Mkv,
    };
    controller
        .start_recording("session-1", Some(config))
        .await
        .unwrap();

    let seen = gateway.last_recording_config().unwrap();
    assert_eq!((seen.width, seen.height), (1920, 1080));
    assert_eq!(seen.container, ContainerFormat::Mkv);
}

#[tokio::test]
async fn default_config_is_used_when_none_is_given() {
    let gateway = gateway();
    let controller = RecordingController::new(gateway.clone());

    controller.start_recording("session-1", None).await.unwrap();

    let seen = gateway.last_recording_config().unwrap();
    assert_eq!((seen.width, seen.height), (1280, 720));
    assert_eq!(seen.container, ContainerFormat::Mp4);
    assert!(!seen.audio_only);
}

#[tokio::test]
async fn declined_recording_does_not_start_locally() {
    let gateway = gateway();
    gateway.decline_recordings();
    let controller = RecordingController::new(gateway.clone());

    let err = controller
        .start_recording("session-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaSessionError::Operation { .. }));
    assert!(!controller.is_recording().await);
    assert!(controller.state().await.error.is_some());
}

#[tokio::test]
async fn gateway_outage_surfaces_as_an_operation_error() {
    let gateway = gateway();
    gateway.fail_on("start_recording");
    let controller = RecordingController::new(gateway.clone());

    let err = controller
        .start_recording("session-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaSessionError::Operation { .. }));

    // Recovery once the backend is reachable again is a fresh start.
    let gateway_ok = self::gateway();
    let controller = RecordingController::new(gateway_ok);
    controller.start_recording("session-1", None).await.unwrap();
    assert!(controller.is_recording().await);
}
