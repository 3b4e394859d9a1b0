use mentor_config::{LlmConfig, MentorConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: 0.1
llm:
  provider: openai
  model: "gpt-4o-mini"
  auth_token: "${OPENAI_API_KEY}"
  temperature: 0.4
  max_tokens: 512
search:
  endpoint: "http://127.0.0.1:8080"
  timeout_secs: 20
ui:
  reveal_ms: 35
storage:
  path: "./mentor-sessions.json"
panels:
  - id: micro-lesson
    enabled: true
  - id: web-search
    enabled: false
  "#;
    let p = write_yaml(&tmp, "mentor.yaml", file_yaml);

    let config = MentorConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load system config");

    assert!(matches!(config.llm, LlmConfig::Openai { .. }));
    assert_eq!(config.ui.reveal_ms, 35);
    // tick_ms falls back to its default when the file omits it.
    assert_eq!(config.ui.tick_ms, 80);
    assert_eq!(config.storage.path, "./mentor-sessions.json");
    assert_eq!(config.panels.len(), 2);
    assert_eq!(config.panels[1].enabled, Some(false));
}

#[test]
#[serial]
fn mock_provider_needs_no_credentials() {
    let config = MentorConfigLoader::new()
        .with_yaml_str("llm:\n  provider: mock\n")
        .load()
        .expect("mock config loads");

    match config.llm {
        LlmConfig::Mock { reply } => assert!(reply.is_none()),
        other => panic!("expected mock provider, got {other:?}"),
    }
}
