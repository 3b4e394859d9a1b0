use crate::types::{WebSearchRequest, WebSearchResponse};
use mentor_common::{MentorError, Result};
use mentor_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;

/// Client anchored to one search-proxy instance.
#[derive(Clone)]
pub struct SearchClient {
    http: HttpClient,
}

impl SearchClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let http = HttpClient::new(&base)
            .map_err(|e| MentorError::Search(format!("search client init failed: {e}")))?;
        Ok(Self { http })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.http = self.http.with_timeout(dur);
        self
    }

    /// Run one query through the proxy and return its result text.
    pub async fn search(&self, query: &str) -> Result<String> {
        let query_snippet = if query.len() > 160 {
            format!("{}…", &query[..160])
        } else {
            query.to_string()
        };
        let started = std::time::Instant::now();
        tracing::info!(
            target: "web.search",
            query = %query_snippet,
            "search.query.start"
        );

        let req = WebSearchRequest {
            query: query.to_string(),
        };
        let resp: WebSearchResponse = match self
            .http
            .post_json_opts("web-search", &req, RequestOpts::default())
            .await
        {
            Ok(resp) => {
                tracing::info!(
                    target: "web.search",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "search.query.success"
                );
                resp
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.search",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "search.query.error"
                );
                return Err(search_error(e));
            }
        };

        Ok(resp.result)
    }
}

/// The proxy surfaces failures as HTTP 500 with `{error: message}`;
/// `mentor-http` already extracts that message for us.
fn search_error(e: HttpError) -> MentorError {
    match e {
        HttpError::Api { message, .. } => MentorError::Search(message),
        other => MentorError::Search(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_result_text_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/web-search"))
            .and(body_json(serde_json::json!({"query": "rust actor model"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"result":"Actors pass messages."}"#),
            )
            .mount(&server)
            .await;

        let client = SearchClient::new(&server.uri()).unwrap();
        let result = client.search("rust actor model").await.unwrap();
        assert_eq!(result, "Actors pass messages.");
    }

    #[tokio::test]
    async fn maps_proxy_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/web-search"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"error":"provider exploded"}"#),
            )
            .mount(&server)
            .await;

        // Retries are on by default for 5xx; the error must still surface
        // once the budget is exhausted.
        let client = SearchClient::new(&server.uri()).unwrap();
        let err = client.search("anything").await.unwrap_err();
        assert!(err.to_string().contains("provider exploded"));
    }
}
