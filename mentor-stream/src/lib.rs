//! Streaming-response presentation pipeline.
//!
//! Every content panel in Mentor drives the same cycle: open a streaming
//! generation against the backend, fold cumulative text snapshots into a
//! [`session::SessionState`], advance a coarse status/progress track as
//! the output grows, and let the UI replay the text through a
//! fixed-cadence typewriter [`reveal::Reveal`].
//!
//! The pieces are deliberately separable:
//!
//! - [`session`]: the per-invocation state and its phase machine
//!   (`Idle → Streaming → {Completed | Failed}`, `Idle` again via clear)
//! - [`status`]: output-length based phase stepping
//! - [`controller`]: drives one transport read per session and guards
//!   against overlapping sessions with a generation token
//! - [`reveal`]: character-by-character display of an already-available
//!   (possibly still growing) string
pub mod controller;
pub mod reveal;
pub mod session;
pub mod status;

pub use controller::{
    CumulativeStream, SessionEvent, SessionMsg, SessionSignal, StreamController, StreamOptions,
    Transport,
};
pub use reveal::Reveal;
pub use session::{Generation, Phase, SessionState};
pub use status::StatusTrack;
