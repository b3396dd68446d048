//! Factory construction and capability answers

mod fixtures;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use eventsourcing_taglog::{
    AggregateRecorder, ApplicationRecorder, Capability, Factory, OriginatorId, RecorderError,
    RecorderPurpose, StoredEvent, TAGLOG_URI,
};
use fixtures::MemoryTagLog;

#[tokio::test]
async fn test_from_env_requires_the_uri_variable() {
    // Environment mutation is process-global, so both halves of this check
    // run in one test.
    std::env::remove_var(TAGLOG_URI);
    let result = Factory::<MemoryTagLog>::from_env().await;
    match result {
        Err(RecorderError::Configuration(message)) => {
            assert!(message.contains(TAGLOG_URI), "message was: {message}");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("factory built without a uri"),
    }

    std::env::set_var(TAGLOG_URI, "memory://tests");
    let result = Factory::<MemoryTagLog>::from_env().await;
    std::env::remove_var(TAGLOG_URI);
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_connect_rejects_an_unusable_uri() {
    let result = Factory::<MemoryTagLog>::connect("").await;
    assert!(matches!(result, Err(RecorderError::Configuration(_))));
}

#[tokio::test]
async fn test_recorders_share_one_log() -> Result<(), RecorderError> {
    let factory = Factory::<MemoryTagLog>::connect("memory://tests").await?;
    let aggregate_recorder = factory.aggregate_recorder(RecorderPurpose::Events)?;
    let application_recorder = factory.application_recorder();

    let id = OriginatorId::from(Uuid::new_v4());
    aggregate_recorder
        .insert_events(vec![StoredEvent {
            originator_id: id,
            originator_version: 0,
            topic: "topic1".to_string(),
            state: b"state1".to_vec(),
        }])
        .await?;

    // The write through one recorder is visible through the other.
    assert_eq!(application_recorder.max_notification_id().await?, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_recorder_fails_at_construction() -> Result<(), RecorderError> {
    let factory = Factory::<MemoryTagLog>::connect("memory://tests").await?;
    let result = factory.aggregate_recorder(RecorderPurpose::Snapshots);
    assert!(matches!(result, Err(RecorderError::Unsupported(_))));
    Ok(())
}

#[tokio::test]
async fn test_process_and_tracking_recorders_are_not_offered() -> Result<(), RecorderError> {
    let factory = Factory::<MemoryTagLog>::connect("memory://tests").await?;
    assert!(matches!(
        factory.process_recorder(),
        Err(RecorderError::Unsupported(_))
    ));
    assert!(matches!(
        factory.tracking_recorder(),
        Err(RecorderError::Unsupported(_))
    ));
    Ok(())
}

#[test]
fn test_capability_answers() {
    assert!(Factory::<MemoryTagLog>::offers(Capability::AggregateEvents));
    assert!(Factory::<MemoryTagLog>::offers(Capability::Notifications));
    assert!(!Factory::<MemoryTagLog>::offers(Capability::Snapshots));
    assert!(!Factory::<MemoryTagLog>::offers(Capability::Tracking));
    assert!(!Factory::<MemoryTagLog>::offers(
        Capability::ProcessRecording
    ));
    assert!(!Factory::<MemoryTagLog>::offers(Capability::Subscriptions));
}
