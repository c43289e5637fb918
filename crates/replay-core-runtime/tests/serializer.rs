mod common;

use common::{URI, blank, hello_world, missing_blob};
use pretty_assertions::assert_eq;
use replay_core::{ContentChange, NoBlobs, Position, Range};
use replay_core_runtime::{
    Notification, NullHost, RecordingHost, RuntimeConfig, RuntimeError, RuntimeHandle,
    RuntimeStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn spawn() -> RuntimeHandle {
    init_tracing();
    RuntimeHandle::spawn(RuntimeConfig::default(), NullHost, Arc::new(NoBlobs)).unwrap()
}

#[tokio::test]
async fn test_spawn_rejects_invalid_config() {
    init_tracing();
    let config = RuntimeConfig {
        tick_interval_ms: 0,
        ..RuntimeConfig::default()
    };
    let err = RuntimeHandle::spawn(config, NullHost, Arc::new(NoBlobs)).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidConfig(_)));
}

#[tokio::test(start_paused = true)]
async fn test_playback_runs_to_the_end() {
    init_tracing();
    let host = RecordingHost::new();
    let handle =
        RuntimeHandle::spawn(RuntimeConfig::default(), host.clone(), Arc::new(NoBlobs)).unwrap();
    handle.load(hello_world()).await.unwrap();

    let mut status = handle.subscribe();
    handle.play().await.unwrap();
    assert_eq!(handle.status(), RuntimeStatus::Playing);

    status
        .wait_for(|s| *s == RuntimeStatus::Paused)
        .await
        .unwrap();

    let progress = handle.progress().await.unwrap();
    assert_eq!(progress.clock, 3.0);
    assert_eq!(progress.boundary, Some(4));
    let text = handle
        .projection()
        .await
        .unwrap()
        .state()
        .document(URI)
        .unwrap()
        .text();
    assert_eq!(text, "hello world");
    assert!(!host.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pause_cancels_queued_tasks() {
    let handle = spawn();
    handle.load(hello_world()).await.unwrap();
    handle.play().await.unwrap();

    // Both are queued before the serializer runs; the pause overtakes the seek.
    let (seek, pause) = tokio::join!(handle.seek(2.0), handle.pause());
    assert!(matches!(seek, Err(RuntimeError::Cancelled)));
    pause.unwrap();
    assert_eq!(handle.status(), RuntimeStatus::Paused);

    // Later submissions run normally.
    assert_eq!(handle.seek(2.0).await.unwrap(), 2.0);
}

#[tokio::test(start_paused = true)]
async fn test_recording_stamps_events_with_elapsed_time() {
    let handle = spawn();
    handle.load(blank()).await.unwrap();
    handle.record().await.unwrap();
    assert_eq!(handle.status(), RuntimeStatus::Recording);

    tokio::time::sleep(Duration::from_millis(550)).await;
    handle
        .notify(Notification::DocumentChanged {
            uri: URI.into(),
            changes: vec![ContentChange::new(Range::caret(Position::new(0, 0)), "hi")],
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.pause().await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    let events = snapshot.events();
    assert_eq!(events.len(), 4);
    assert!(events[3].clock >= 0.4 && events[3].clock <= 0.6, "{}", events[3].clock);
    assert!(snapshot.duration() > events[3].clock);

    let progress = handle.progress().await.unwrap();
    assert_eq!(progress.status, RuntimeStatus::Paused);
    assert_eq!(progress.undo_depth, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_fails_runtime_until_reload() {
    let handle = spawn();
    let err = handle.load(missing_blob()).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(handle.status(), RuntimeStatus::Failed(_)));

    assert!(matches!(
        handle.seek(0.5).await,
        Err(RuntimeError::Failed(_))
    ));
    assert!(matches!(handle.play().await, Err(RuntimeError::Failed(_))));

    handle.load(hello_world()).await.unwrap();
    assert_eq!(handle.status(), RuntimeStatus::Paused);
    assert_eq!(handle.seek(1.5).await.unwrap(), 1.5);
}

#[tokio::test(start_paused = true)]
async fn test_open_and_save_through_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    replay_core_store::save_session(&path, &hello_world()).unwrap();

    let handle = spawn();
    handle.open(&path).await.unwrap();
    handle.seek(2.0).await.unwrap();
    assert!(handle.undo().await.is_ok_and(|undone| !undone));

    let copy = dir.path().join("copy.json");
    handle.save(&copy).await.unwrap();
    assert_eq!(
        replay_core_store::load_session(&copy).unwrap().events(),
        hello_world().events()
    );

    assert!(matches!(
        handle.open(dir.path().join("absent.json")).await,
        Err(RuntimeError::Store(_))
    ));
    assert_eq!(handle.status(), RuntimeStatus::Paused);
}
