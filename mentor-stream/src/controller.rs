//! Drives a single request/response streaming cycle.
//!
//! The controller owns the session state for one panel. `start` performs
//! the synchronous state reset, bumps the generation token, and spawns a
//! task that reads the transport and forwards [`SessionMsg`] events back
//! to the owner (typically an actor mailbox). The owner folds each event
//! in with [`StreamController::apply`], which drops anything stamped with
//! a stale generation, so starting a new session, or clearing, while a
//! previous transport read is still in flight cannot corrupt state.
//! The in-flight network call itself is never cancelled.

use crate::session::{Generation, Phase, SessionState};
use crate::status::StatusTrack;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default label shown before the first status message (or when the
/// caller supplied none).
pub const STARTING_STATUS: &str = "Starting...";
const COMPLETE_STATUS: &str = "Complete";
const ERROR_STATUS: &str = "Error";
const FALLBACK_ERROR: &str = "An error occurred during streaming";

/// A stream of cumulative text snapshots: every item carries the full
/// text so far, not a delta. Stream close without error is the
/// completion signal.
pub type CumulativeStream = Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send>>;

/// The transport contract: some external client that can turn a prompt
/// into a [`CumulativeStream`]. Wire framing (SSE, NDJSON, one-shot) is
/// entirely the implementor's business.
pub trait Transport: Send + Sync {
    fn open(&self, prompt: &str, system: Option<&str>) -> CumulativeStream;
}

/// Explicit configuration for one streaming session.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Ordered phase labels; empty means no phase tracking.
    pub status_messages: Vec<String>,
    /// Gates phase-advancement side effects (default true).
    pub show_progress: bool,
    /// Optional system prompt forwarded to the transport.
    pub system_prompt: Option<String>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            status_messages: Vec::new(),
            show_progress: true,
            system_prompt: None,
        }
    }
}

impl StreamOptions {
    pub fn with_status_messages<S: Into<String>>(
        messages: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            status_messages: messages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// One transport event, stamped with the generation that produced it.
#[derive(Debug)]
pub struct SessionMsg {
    pub generation: Generation,
    pub event: SessionEvent,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// Full accumulated text so far (cumulative, not a delta).
    Chunk(String),
    /// The stream ended without error.
    Completed,
    /// The transport failed; the message is terminal for the session.
    Failed(String),
}

/// What the UI should react to after folding in an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// The phase label advanced.
    Progress { step: usize, label: String },
    Completed,
    Failed(String),
}

/// Session controller: state, phase machine, and transport glue.
pub struct StreamController {
    state: SessionState,
    phase: Phase,
    generation: Generation,
    track: StatusTrack,
    show_progress: bool,
    step: usize,
}

impl Default for StreamController {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamController {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            phase: Phase::Idle,
            generation: 0,
            track: StatusTrack::default(),
            show_progress: true,
            step: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Synchronous start of a new session: resets all fields, seeds the
    /// status line, and invalidates any in-flight predecessor. No I/O
    /// happens here; callers observe `loading == true` before the first
    /// byte is requested.
    pub fn begin(&mut self, options: &StreamOptions) -> Generation {
        self.generation += 1;
        self.track = StatusTrack::new(options.status_messages.clone());
        self.show_progress = options.show_progress;
        self.step = 0;
        self.phase = Phase::Streaming;
        self.state = SessionState {
            content: String::new(),
            loading: true,
            status: self.track.first().unwrap_or(STARTING_STATUS).to_string(),
            progress: 0.0,
            error: None,
        };
        self.generation
    }

    /// Begin a session and spawn the transport reader. Events arrive on
    /// `tx` stamped with the returned generation; feed them back through
    /// [`apply`](Self::apply).
    pub fn start(
        &mut self,
        transport: Arc<dyn Transport>,
        prompt: impl Into<String>,
        options: StreamOptions,
        tx: mpsc::Sender<SessionMsg>,
    ) -> Generation {
        let generation = self.begin(&options);
        let prompt = prompt.into();
        let system = options.system_prompt;

        tokio::spawn(async move {
            let mut stream = transport.open(&prompt, system.as_deref());
            while let Some(item) = stream.next().await {
                let event = match item {
                    Ok(text) => SessionEvent::Chunk(text),
                    Err(e) => {
                        tracing::warn!(generation, error = %e, "stream.transport.failed");
                        let _ = tx
                            .send(SessionMsg {
                                generation,
                                event: SessionEvent::Failed(e.to_string()),
                            })
                            .await;
                        return;
                    }
                };
                if tx.send(SessionMsg { generation, event }).await.is_err() {
                    // Owner went away; nothing left to report to.
                    return;
                }
            }
            let _ = tx
                .send(SessionMsg {
                    generation,
                    event: SessionEvent::Completed,
                })
                .await;
        });

        generation
    }

    /// Fold one transport event into the session.
    ///
    /// Events from stale generations (an earlier session, or anything
    /// after `clear`) are dropped. Chunk ordering is taken as delivered;
    /// the controller neither reorders nor deduplicates.
    pub fn apply(&mut self, msg: SessionMsg) -> Option<SessionSignal> {
        if msg.generation != self.generation || self.phase != Phase::Streaming {
            tracing::trace!(
                stale = msg.generation,
                current = self.generation,
                "stream.event.dropped"
            );
            return None;
        }

        let signal = match msg.event {
            SessionEvent::Chunk(text) => {
                self.state.content = text;
                self.advance_track()
            }
            SessionEvent::Completed => {
                self.state.status = COMPLETE_STATUS.to_string();
                self.state.progress = 100.0;
                self.phase = Phase::Completed;
                Some(SessionSignal::Completed)
            }
            SessionEvent::Failed(message) => {
                let message = if message.is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                };
                self.state.error = Some(message.clone());
                self.state.status = ERROR_STATUS.to_string();
                self.phase = Phase::Failed;
                Some(SessionSignal::Failed(message))
            }
        };

        // Single exit point for the loading flag: terminal phases clear
        // it here, success and failure alike.
        if matches!(self.phase, Phase::Completed | Phase::Failed) {
            self.state.loading = false;
        }

        signal
    }

    fn advance_track(&mut self) -> Option<SessionSignal> {
        if self.track.is_empty() || !self.show_progress {
            return None;
        }
        let len = self.state.content.chars().count();
        let step = self.track.step_for_len(len);
        if step == self.step {
            return None;
        }
        self.step = step;
        let label = self
            .track
            .label(step)
            .unwrap_or(STARTING_STATUS)
            .to_string();
        self.state.status = label.clone();
        self.state.progress = self.track.progress_for_step(step);
        Some(SessionSignal::Progress { step, label })
    }

    /// Reset to `Idle` regardless of any in-flight work. The transport
    /// task keeps running; its remaining events fail the generation
    /// check and are dropped.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.step = 0;
        self.track = StatusTrack::default();
        self.state = SessionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(generation: Generation, text: &str) -> SessionMsg {
        SessionMsg {
            generation,
            event: SessionEvent::Chunk(text.to_string()),
        }
    }

    #[test]
    fn begin_is_synchronous_and_seeds_status() {
        let mut c = StreamController::new();
        let options = StreamOptions::with_status_messages(["Analyzing topic...", "Writing..."]);
        c.begin(&options);

        assert!(c.state().loading);
        assert_eq!(c.state().status, "Analyzing topic...");
        assert_eq!(c.state().progress, 0.0);
        assert_eq!(c.phase(), Phase::Streaming);
    }

    #[test]
    fn begin_without_labels_uses_default_status() {
        let mut c = StreamController::new();
        c.begin(&StreamOptions::default());
        assert_eq!(c.state().status, STARTING_STATUS);
    }

    #[test]
    fn successful_session_completes() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::default());

        assert!(c.apply(chunk(generation, "partial")).is_none());
        let signal = c.apply(SessionMsg {
            generation,
            event: SessionEvent::Completed,
        });

        assert_eq!(signal, Some(SessionSignal::Completed));
        assert!(!c.state().loading);
        assert!(c.state().error.is_none());
        assert_eq!(c.state().progress, 100.0);
        assert_eq!(c.state().status, "Complete");
        assert!(c.state().is_complete());
    }

    #[test]
    fn failed_session_reports_error_and_clears_loading() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::default());

        let signal = c.apply(SessionMsg {
            generation,
            event: SessionEvent::Failed("connection reset".into()),
        });

        assert_eq!(signal, Some(SessionSignal::Failed("connection reset".into())));
        assert!(!c.state().loading);
        assert_eq!(c.state().status, "Error");
        assert_eq!(c.state().error.as_deref(), Some("connection reset"));
        assert!(!c.state().is_complete());
    }

    #[test]
    fn empty_failure_message_gets_a_fallback() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::default());
        c.apply(SessionMsg {
            generation,
            event: SessionEvent::Failed(String::new()),
        });
        assert_eq!(c.state().error.as_deref(), Some(FALLBACK_ERROR));
    }

    #[test]
    fn clear_resets_everything() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::with_status_messages(["a", "b"]));
        c.apply(chunk(generation, "some output text"));
        c.clear();

        assert_eq!(c.state(), &SessionState::default());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn stale_generation_events_are_dropped() {
        let mut c = StreamController::new();
        let old = c.begin(&StreamOptions::default());
        let new = c.begin(&StreamOptions::default());
        assert_ne!(old, new);

        assert!(c.apply(chunk(old, "stale text")).is_none());
        assert_eq!(c.state().content, "");

        // A stale completion must not end the new session either.
        c.apply(SessionMsg {
            generation: old,
            event: SessionEvent::Completed,
        });
        assert!(c.state().loading);

        c.apply(chunk(new, "fresh"));
        assert_eq!(c.state().content, "fresh");
    }

    #[test]
    fn events_after_clear_are_dropped() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::default());
        c.clear();
        assert!(c.apply(chunk(generation, "late arrival")).is_none());
        assert_eq!(c.state(), &SessionState::default());
    }

    #[test]
    fn progress_steps_follow_output_length() {
        let mut c = StreamController::new();
        let generation = c.begin(&StreamOptions::with_status_messages([
            "one", "two", "three", "four",
        ]));

        // 30 chars: floor(30/100*4) = 1 -> first advance.
        let signal = c.apply(chunk(generation, &"x".repeat(30)));
        assert_eq!(
            signal,
            Some(SessionSignal::Progress {
                step: 1,
                label: "two".into()
            })
        );

        // Same step again: no signal.
        assert!(c.apply(chunk(generation, &"x".repeat(40))).is_none());

        // 250 chars saturates at the last label.
        let signal = c.apply(chunk(generation, &"x".repeat(250)));
        assert_eq!(
            signal,
            Some(SessionSignal::Progress {
                step: 3,
                label: "four".into()
            })
        );
        assert_eq!(c.state().progress, 100.0);
        // Saturated progress does not imply completion.
        assert!(c.state().loading);
    }

    #[test]
    fn show_progress_false_suppresses_stepping() {
        let mut c = StreamController::new();
        let options = StreamOptions {
            status_messages: vec!["a".into(), "b".into()],
            show_progress: false,
            system_prompt: None,
        };
        let generation = c.begin(&options);
        assert!(c.apply(chunk(generation, &"x".repeat(500))).is_none());
        assert_eq!(c.state().status, "a");
        assert_eq!(c.state().progress, 0.0);
    }
}
