use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use mentor_common::Result;
use mentor_stream::CumulativeStream;
use std::time::Duration;

const DEFAULT_REPLY: &str = "This is the offline coach speaking. Configure an OpenAI-compatible \
or Ollama provider in mentor.yaml to get real lessons.\n\n\
- review your configuration\n\
- set an auth token or start a local model server\n\
- rerun your last request";

/// Keyless demo client: streams a canned reply word by word so the whole
/// presentation pipeline can be exercised without any backend.
pub struct MockClient {
    reply: String,
    chunk_delay: Duration,
}

impl MockClient {
    pub fn new(reply: Option<String>) -> Self {
        Self {
            reply: reply.unwrap_or_else(|| DEFAULT_REPLY.to_string()),
            chunk_delay: Duration::from_millis(30),
        }
    }

    /// Remove the inter-chunk delay (used by tests).
    pub fn without_delay(mut self) -> Self {
        self.chunk_delay = Duration::ZERO;
        self
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        tracing::debug!(prompt_len = prompt.len(), "mock.generate");
        Ok(LlmResponse {
            text: self.reply.clone(),
            model: Some("mock".into()),
            tokens_used: None,
        })
    }

    fn generate_stream(&self, _prompt: &str, _system_prompt: Option<&str>) -> CumulativeStream {
        let reply = self.reply.clone();
        let delay = self.chunk_delay;

        Box::pin(async_stream::try_stream! {
            let mut accumulated = String::with_capacity(reply.len());
            // Split on spaces but keep them, so the cumulative snapshots
            // rebuild the reply byte for byte.
            for piece in reply.split_inclusive(' ') {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                accumulated.push_str(piece);
                yield accumulated.clone();
            }
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn snapshots_are_cumulative_and_rebuild_the_reply() {
        let client = MockClient::new(Some("one two three".into())).without_delay();
        let mut stream = client.generate_stream("anything", None);

        let mut last = String::new();
        while let Some(item) = stream.next().await {
            let snapshot = item.unwrap();
            assert!(snapshot.starts_with(&last), "snapshots only ever extend");
            last = snapshot;
        }
        assert_eq!(last, "one two three");
    }
}
