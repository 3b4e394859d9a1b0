//! Common types and utilities shared across Mentor crates.
//!
//! This crate defines the shared error type, the observability bootstrap,
//! and the key-value storage abstraction used for saved learning sessions.
//! It is intentionally lightweight so every crate in the workspace can
//! depend on it without pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`MentorError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`kv`]: last-write-wins keyed storage behind the [`kv::KvStore`] trait
use uuid::Uuid;

pub mod kv;
pub mod observability;

/// Error types used across the Mentor system.
#[derive(thiserror::Error, Debug)]
pub enum MentorError {
    /// The text-generation backend failed to produce output.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The saved-session store reported an error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The web-search proxy reported an error.
    #[error("Search error: {0}")]
    Search(String),

    /// A referenced saved session could not be located.
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Filesystem failure underneath the store or log sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient alias for results that use [`MentorError`].
pub type Result<T> = std::result::Result<T, MentorError>;
