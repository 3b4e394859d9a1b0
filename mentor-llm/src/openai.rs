use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use futures::StreamExt;
use mentor_common::{MentorError, Result};
use mentor_http::{HttpClient, HttpError};
use mentor_stream::CumulativeStream;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for OpenAI-compatible chat-completion endpoints.
///
/// One-shot generation goes through [`mentor_http::HttpClient`] (retries,
/// redacted logging); the streaming path holds its own `reqwest::Client`
/// because it consumes the response body incrementally as SSE frames.
pub struct OpenAiClient {
    http: HttpClient,
    raw: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

/// One SSE frame of a streamed completion.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client for the given API key, model, and endpoint
    /// (any OpenAI-compatible base URL, e.g. a gateway or Azure).
    pub fn new(api_key: String, model: String, endpoint: String) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let http = HttpClient::new(&format!("{endpoint}/"))
            .map_err(|e| MentorError::Generation(format!("HttpClient init failed: {e}")))?;
        let raw = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| MentorError::Generation(format!("reqwest init failed: {e}")))?;

        Ok(Self {
            http,
            raw,
            endpoint,
            api_key,
            model,
            default_temperature: None,
            default_max_tokens: None,
        })
    }

    /// Generation parameters applied when a call site passes none.
    pub fn with_defaults(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.default_temperature = temperature;
        self.default_max_tokens = max_tokens;
        self
    }

    fn messages(prompt: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });
        messages
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: Self::messages(prompt, system_prompt),
            max_tokens: max_tokens.or(self.default_max_tokens),
            temperature: temperature.or(self.default_temperature),
            stream: false,
        };

        let resp: ChatCompletionResponse = self
            .http
            .post_json("chat/completions", Some(&self.api_key), &req)
            .await
            .map_err(http_to_mentor)?;

        let text = resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn generate_stream(&self, prompt: &str, system_prompt: Option<&str>) -> CumulativeStream {
        let client = self.raw.clone();
        let url = format!("{}/chat/completions", self.endpoint);
        let api_key = self.api_key.clone();
        let req = ChatRequest {
            model: self.model.clone(),
            messages: Self::messages(prompt, system_prompt),
            max_tokens: self.default_max_tokens,
            temperature: self.default_temperature,
            stream: true,
        };

        Box::pin(async_stream::try_stream! {
            let resp = client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&req)
                .send()
                .await?;

            let status = resp.status();
            let mut frames = if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                Err(anyhow::anyhow!(
                    "chat completion stream failed: HTTP {status}: {}",
                    snip(&body)
                ))?;
                unreachable!()
            } else {
                resp.bytes_stream()
            };

            let mut pending = String::new();
            let mut accumulated = String::new();
            'read: while let Some(chunk) = frames.next().await {
                let chunk = chunk?;
                pending.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = pending.find('\n') {
                    let line = pending[..pos].trim().to_string();
                    pending.drain(..=pos);
                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();
                    if data == "[DONE]" {
                        break 'read;
                    }
                    match serde_json::from_str::<StreamChunk>(data) {
                        Ok(frame) => {
                            let delta = frame
                                .choices
                                .first()
                                .and_then(|c| c.delta.content.as_deref())
                                .unwrap_or_default();
                            if !delta.is_empty() {
                                accumulated.push_str(delta);
                                yield accumulated.clone();
                            }
                        }
                        Err(e) => {
                            // Keep-alives and unknown frames are skipped.
                            tracing::trace!(error = %e, "openai.stream.unparsed_frame");
                        }
                    }
                }
            }
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let test_prompt = "Respond with just 'OK'";
        match self.generate(test_prompt, None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAi health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_mentor(e: HttpError) -> MentorError {
    MentorError::Generation(format!("{e}"))
}

fn snip(body: &str) -> String {
    let mut s = body.to_string();
    if s.len() > 300 {
        let mut end = 300;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
        s.push_str("...");
    }
    s
}
