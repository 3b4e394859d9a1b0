use async_trait::async_trait;
use mentor_common::Result;
use mentor_stream::CumulativeStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a full response to the given prompt with optional system prompt.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Open a streaming generation. Every item carries the complete text
    /// accumulated so far; stream close without error means done.
    fn generate_stream(&self, prompt: &str, system_prompt: Option<&str>) -> CumulativeStream;

    /// Check if the backing service is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Default persona for workplace-learning generation.
    fn default_coach_system_prompt(&self) -> &str {
        r#"You are an experienced workplace-learning coach helping professionals grow their skills.

Your role:
- Explain workplace concepts clearly, with concrete on-the-job examples
- Build short, actionable lessons rather than long lectures
- Tailor advice to the learner's stated role, experience, and goals
- Be encouraging but honest about skill gaps

Guidelines:
- Use plain, professional language
- Prefer numbered steps and short bullet lists for anything actionable
- When giving recommendations, say why each one matters
- Never invent credentials, statistics, or named sources"#
    }
}

/// Pull `-`/`•`/`*` bulleted lines out of generated text.
///
/// Coaching output leans on bullet lists for action items; panels use
/// this to surface a "next steps" footer after a session completes.
pub fn extract_bullets(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with('-') || trimmed.starts_with('•') || trimmed.starts_with('*') {
                let cleaned = trimmed
                    .trim_start_matches(['-', '•', '*'])
                    .trim()
                    .to_string();
                if !cleaned.is_empty() {
                    Some(cleaned)
                } else {
                    None
                }
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bullets_handles_mixed_markers() {
        let text = "Plan:\n- practice active listening\n• schedule a 1:1\n* draft the deck\nnot a bullet\n-   \n";
        assert_eq!(
            extract_bullets(text),
            vec![
                "practice active listening",
                "schedule a 1:1",
                "draft the deck"
            ]
        );
    }

    #[test]
    fn extract_bullets_empty_for_prose() {
        assert!(extract_bullets("Just a paragraph of advice.").is_empty());
    }
}
