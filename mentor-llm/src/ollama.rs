use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use futures::StreamExt;
use mentor_common::{MentorError, Result};
use mentor_stream::CumulativeStream;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

/// One NDJSON line of a streamed `/api/generate` response.
#[derive(Debug, Deserialize)]
struct GenerateLine {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MentorError::Generation(format!("Failed to create HTTP client: {}", e)))?;

        let ollama_client = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            default_temperature: None,
            default_max_tokens: None,
        };

        ollama_client.probe_server().await?;
        ollama_client.ensure_model_available().await?;

        Ok(ollama_client)
    }

    /// Generation parameters applied when a call site passes none.
    pub fn with_defaults(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.default_temperature = temperature;
        self.default_max_tokens = max_tokens;
        self
    }

    fn options_map(&self, temperature: Option<f32>, max_tokens: Option<u32>) -> serde_json::Map<String, JsonValue> {
        let mut options = serde_json::Map::new();
        if let Some(temp) = temperature.or(self.default_temperature) {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tok) = max_tokens.or(self.default_max_tokens) {
            options.insert("num_predict".to_string(), json!(max_tok));
        }
        options
    }

    async fn probe_server(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| MentorError::Generation(OLLAMA_CONNECTION_ERROR.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(MentorError::Generation(OLLAMA_CONNECTION_ERROR.to_string()))
        }
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = self.fetch_available_models().await?;

        if !models.contains(&self.model) {
            tracing::info!("Model {} not found locally, pulling...", self.model);
            self.pull_model(&self.model).await?;
        }

        Ok(())
    }

    async fn fetch_available_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MentorError::Generation(format!("Failed to fetch models: {}", e)))?;

        if !resp.status().is_success() {
            return Ok(Vec::new());
        }

        let val: JsonValue = resp.json().await.map_err(|e| {
            MentorError::Generation(format!("Failed to parse models response: {}", e))
        })?;

        let models = val
            .get("models")
            .and_then(|m| m.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);
        let payload = json!({
            "model": model,
            "stream": false
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MentorError::Generation(format!("Failed to pull model: {}", e)))?;

        if resp.status().is_success() {
            tracing::info!("Successfully pulled model: {}", model);
            Ok(())
        } else {
            Err(MentorError::Generation(format!(
                "Failed to pull model: HTTP {}",
                resp.status()
            )))
        }
    }

    /// Ollama takes a single prompt string, so the system prompt is
    /// folded in as a conversation preamble.
    fn full_prompt(prompt: &str, system_prompt: Option<&str>) -> String {
        if let Some(sys_prompt) = system_prompt {
            format!("{}\n\nUser: {}\n\nAssistant:", sys_prompt, prompt)
        } else {
            prompt.to_string()
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let options = self.options_map(temperature, max_tokens);

        let payload = json!({
            "model": self.model,
            "prompt": Self::full_prompt(prompt, system_prompt),
            "stream": false,
            "options": options
        });
        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MentorError::Generation(format!("Generate request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(MentorError::Generation(format!(
                "Generate failed: HTTP {}",
                resp.status()
            )));
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| MentorError::Generation(format!("Failed to parse response: {}", e)))?;

        let text = val
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        let tokens_used = val
            .get("eval_count")
            .and_then(|c| c.as_u64())
            .map(|c| c as u32);

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
        })
    }

    fn generate_stream(&self, prompt: &str, system_prompt: Option<&str>) -> CumulativeStream {
        let client = self.client.clone();
        let url = format!("{}/api/generate", self.base_url);
        let payload = json!({
            "model": self.model,
            "prompt": Self::full_prompt(prompt, system_prompt),
            "stream": true,
            "options": self.options_map(None, None)
        });

        Box::pin(async_stream::try_stream! {
            let resp = client.post(&url).json(&payload).send().await?;
            let status = resp.status();
            if !status.is_success() {
                Err(anyhow::anyhow!("streamed generate failed: HTTP {status}"))?;
            }

            let mut pending = String::new();
            let mut accumulated = String::new();
            let mut frames = resp.bytes_stream();
            'read: while let Some(chunk) = frames.next().await {
                let chunk = chunk?;
                pending.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = pending.find('\n') {
                    let line = pending[..pos].trim().to_string();
                    pending.drain(..=pos);
                    if line.is_empty() {
                        continue;
                    }
                    let parsed: GenerateLine = match serde_json::from_str(&line) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::trace!(error = %e, "ollama.stream.unparsed_line");
                            continue;
                        }
                    };
                    if !parsed.response.is_empty() {
                        accumulated.push_str(&parsed.response);
                        yield accumulated.clone();
                    }
                    if parsed.done {
                        break 'read;
                    }
                }
            }
        })
    }

    async fn health_check(&self) -> Result<bool> {
        self.probe_server().await.map(|_| true).or(Ok(false))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
