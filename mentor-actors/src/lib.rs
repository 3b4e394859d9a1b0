pub mod actor;
pub mod builder;
pub mod registry;
pub mod search;
pub mod store;
pub mod system;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

/// A completed panel response the user chose to keep.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedSession {
    pub id: Uuid,
    /// Panel id the response came from (e.g. `skills-forecast`).
    pub panel: String,
    /// What the user typed to produce it.
    pub input: String,
    /// The full generated text.
    pub content: String,
    pub saved_at: DateTime<Utc>,
}

pub enum StoreMsg {
    SaveSession {
        record: SavedSession,
        reply: oneshot::Sender<Result<()>>,
    },
    ListSessions {
        /// Restrict to one panel id, or all when `None`.
        panel: Option<String>,
        limit: usize,
        reply: oneshot::Sender<Result<Vec<SavedSession>>>,
    },
    GetSession {
        id: Uuid,
        reply: oneshot::Sender<Result<SavedSession>>,
    },
    DeleteSession {
        id: Uuid,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// One query for the web-search proxy; the result text (or failure)
/// comes back on `reply`.
pub struct SearchCmd {
    pub query: String,
    pub reply: oneshot::Sender<Result<String>>,
}
