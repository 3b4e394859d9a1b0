//! Provider-agnostic text-generation clients for Mentor.
//!
//! This crate exposes a common [`traits::LlmClient`] interface (one-shot
//! generation plus a cumulative-text streaming mode) and concrete
//! provider implementations for OpenAI-compatible endpoints and Ollama.
//! [`MockClient`] serves keyless demo runs and tests.
//!
//! The streaming contract is the one the presentation pipeline consumes:
//! each stream item is the **full accumulated text so far** (never a
//! delta), and the stream closing without error is the completion signal.
//! [`ClientTransport`] bridges any client into the
//! [`mentor_stream::Transport`] seam.
pub mod mock;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
pub mod traits;

use mentor_stream::{CumulativeStream, Transport};
use std::sync::Arc;
use traits::LlmClient;

pub use mock::MockClient;

/// Default model recommendations for coaching/lesson generation.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Adapts an [`LlmClient`] into the presentation pipeline's transport
/// seam. The wire framing (SSE, NDJSON, one-shot) stays inside the
/// client; the pipeline only ever sees cumulative snapshots.
#[derive(Clone)]
pub struct ClientTransport {
    client: Arc<dyn LlmClient + Send + Sync>,
}

impl ClientTransport {
    pub fn new(client: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<dyn LlmClient + Send + Sync> {
        self.client.clone()
    }
}

impl Transport for ClientTransport {
    fn open(&self, prompt: &str, system: Option<&str>) -> CumulativeStream {
        // Panels that do not bring their own persona get the coach one.
        match system {
            Some(s) => self.client.generate_stream(prompt, Some(s)),
            None => self
                .client
                .generate_stream(prompt, Some(self.client.default_coach_system_prompt())),
        }
    }
}
