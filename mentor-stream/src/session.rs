//! Per-invocation streaming session state.

/// Monotonic token identifying one streaming session within a controller.
///
/// Starting a new session (or clearing) bumps the token; transport events
/// stamped with an older token are dropped instead of overwriting the
/// current session's state.
pub type Generation = u64;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Streaming,
    Completed,
    Failed,
}

/// Mutable state of one request/response streaming cycle.
///
/// `content` always holds the full accumulated text delivered so far;
/// truncation for display purposes is entirely the reveal presenter's
/// business and never feeds back into this struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Accumulated text received so far; reset at session start.
    pub content: String,
    /// True from session start until completion or error.
    pub loading: bool,
    /// Human-readable phase label.
    pub status: String,
    /// Coarse completion estimate in `[0, 100]`.
    pub progress: f64,
    /// Terminal failure message, if the transport failed.
    pub error: Option<String>,
}

impl SessionState {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// A session that finished, produced output, and did not fail.
    ///
    /// Computed from `loading`/`content`/`error` rather than the status
    /// label, so the length-based phase heuristic undershooting has no
    /// bearing on completion.
    pub fn is_complete(&self) -> bool {
        !self.loading && self.has_content() && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_not_complete() {
        let s = SessionState::default();
        assert!(!s.has_content());
        assert!(!s.is_complete());
    }

    #[test]
    fn completion_requires_content_and_no_error() {
        let mut s = SessionState {
            content: "done".into(),
            loading: false,
            ..Default::default()
        };
        assert!(s.is_complete());

        s.error = Some("boom".into());
        assert!(!s.is_complete());

        s.error = None;
        s.loading = true;
        assert!(!s.is_complete());
    }
}
