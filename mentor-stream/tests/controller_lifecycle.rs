use mentor_stream::{
    CumulativeStream, Phase, SessionMsg, StreamController, StreamOptions, Transport,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Transport that replays a fixed script of cumulative snapshots, then
/// optionally fails instead of closing cleanly.
struct ScriptedTransport {
    snapshots: Vec<String>,
    fail_with: Option<String>,
}

impl ScriptedTransport {
    fn ok<S: Into<String>>(snapshots: impl IntoIterator<Item = S>) -> Self {
        Self {
            snapshots: snapshots.into_iter().map(Into::into).collect(),
            fail_with: None,
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            snapshots: vec!["partial out".into()],
            fail_with: Some(message.to_string()),
        }
    }
}

impl Transport for ScriptedTransport {
    fn open(&self, _prompt: &str, _system: Option<&str>) -> CumulativeStream {
        let snapshots = self.snapshots.clone();
        let fail_with = self.fail_with.clone();
        Box::pin(async_stream::stream! {
            for snap in snapshots {
                yield Ok(snap);
            }
            if let Some(message) = fail_with {
                yield Err(anyhow::anyhow!(message));
            }
        })
    }
}

/// Pump mailbox events into the controller until the session leaves the
/// streaming phase.
async fn drain_until_settled(
    controller: &mut StreamController,
    rx: &mut mpsc::Receiver<SessionMsg>,
) {
    while controller.phase() == Phase::Streaming {
        let msg = rx.recv().await.expect("transport task sends a terminal event");
        controller.apply(msg);
    }
}

#[tokio::test]
async fn loading_is_set_before_any_transport_output() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = StreamController::new();

    controller.start(
        Arc::new(ScriptedTransport::ok(["hi"])),
        "teach me something",
        StreamOptions::default(),
        tx,
    );

    // Synchronously after start, before any mailbox event is applied.
    assert!(controller.is_loading());
    assert_eq!(controller.state().content, "");

    drain_until_settled(&mut controller, &mut rx).await;
    assert_eq!(controller.state().content, "hi");
}

#[tokio::test]
async fn clean_stream_end_completes_the_session() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = StreamController::new();

    controller.start(
        Arc::new(ScriptedTransport::ok(["An", "An answer", "An answer arrives"])),
        "question",
        StreamOptions::with_status_messages(["Thinking...", "Writing..."]),
        tx,
    );
    drain_until_settled(&mut controller, &mut rx).await;

    let state = controller.state();
    assert_eq!(state.content, "An answer arrives");
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.progress, 100.0);
    assert_eq!(state.status, "Complete");
    assert!(state.is_complete());
    assert_eq!(controller.phase(), Phase::Completed);
}

#[tokio::test]
async fn transport_failure_fails_the_session() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = StreamController::new();

    controller.start(
        Arc::new(ScriptedTransport::failing("connection reset by peer")),
        "question",
        StreamOptions::default(),
        tx,
    );
    drain_until_settled(&mut controller, &mut rx).await;

    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("connection reset by peer"));
    assert_eq!(state.status, "Error");
    assert!(!state.is_complete());
    // The partial chunk landed before the failure and is preserved.
    assert_eq!(state.content, "partial out");
    assert_eq!(controller.phase(), Phase::Failed);
}

#[tokio::test]
async fn restarting_mid_flight_is_last_writer_safe() {
    let (tx, mut rx) = mpsc::channel(32);
    let mut controller = StreamController::new();

    controller.start(
        Arc::new(ScriptedTransport::ok(["old 1", "old 1 old 2"])),
        "first question",
        StreamOptions::default(),
        tx.clone(),
    );
    // Overwrite before draining anything: the first session's events are
    // all stale by the time they are applied.
    controller.start(
        Arc::new(ScriptedTransport::ok(["new text"])),
        "second question",
        StreamOptions::default(),
        tx,
    );

    drain_until_settled(&mut controller, &mut rx).await;
    assert_eq!(controller.state().content, "new text");
    assert!(controller.state().is_complete());

    // Late stragglers from the first session still change nothing.
    while let Ok(msg) = rx.try_recv() {
        controller.apply(msg);
    }
    assert_eq!(controller.state().content, "new text");
    assert_eq!(controller.phase(), Phase::Completed);
}

#[tokio::test]
async fn clear_during_flight_leaves_idle_state() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = StreamController::new();

    controller.start(
        Arc::new(ScriptedTransport::ok(["will be discarded"])),
        "question",
        StreamOptions::default(),
        tx,
    );
    controller.clear();

    // Apply everything the orphaned task managed to send.
    while let Some(msg) = rx.recv().await {
        controller.apply(msg);
    }

    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.state().content, "");
    assert!(!controller.state().loading);
    assert_eq!(controller.state().status, "");
    assert_eq!(controller.state().progress, 0.0);
    assert!(controller.state().error.is_none());
}
