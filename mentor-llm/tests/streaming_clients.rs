mod common;

use futures::StreamExt;
use mentor_llm::ollama::OllamaClient;
use mentor_llm::openai::OpenAiClient;
use mentor_llm::traits::LlmClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn collect_snapshots(
    mut stream: mentor_stream::CumulativeStream,
) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::new();
    while let Some(item) = stream.next().await {
        out.push(item?);
    }
    Ok(out)
}

#[tokio::test]
async fn openai_stream_accumulates_sse_deltas() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client =
        OpenAiClient::new("test-key".into(), "gpt-4o-mini".into(), server.uri()).unwrap();
    let snapshots = collect_snapshots(client.generate_stream("hi", None))
        .await
        .unwrap();

    // Cumulative, not deltas: the second snapshot contains the first.
    assert_eq!(snapshots, vec!["Hel".to_string(), "Hello".to_string()]);
}

#[tokio::test]
async fn openai_stream_surfaces_http_errors() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"bad key"}}"#),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new("bad".into(), "gpt-4o-mini".into(), server.uri()).unwrap();
    let err = collect_snapshots(client.generate_stream("hi", None))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn ollama_stream_accumulates_ndjson_lines() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"models":[{"name":"llama3.2:3b"}]}"#),
        )
        .mount(&server)
        .await;

    let body = concat!(
        "{\"response\":\"Hel\",\"done\":false}\n",
        "{\"response\":\"lo\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama3.2:3b".into())
        .await
        .unwrap();
    let snapshots = collect_snapshots(client.generate_stream("hi", None))
        .await
        .unwrap();

    assert_eq!(snapshots, vec!["Hel".to_string(), "Hello".to_string()]);
}

#[tokio::test]
async fn ollama_one_shot_generate_parses_response() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"models":[{"name":"llama3.2:3b"}]}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"response":"OK","eval_count":5,"done":true}"#),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama3.2:3b".into())
        .await
        .unwrap();
    let resp = client.generate("say ok", None, Some(8), Some(0.1)).await.unwrap();
    assert_eq!(resp.text, "OK");
    assert_eq!(resp.tokens_used, Some(5));
}
