//! Loader for workspace configuration with YAML + environment overlays.
//!
//! `mentor.yaml` describes the text-generation provider, the optional
//! web-search proxy, UI pacing, saved-session storage, and which content
//! panels are enabled. `MENTOR_`-prefixed environment variables override
//! file values, and `${VAR}` placeholders are expanded recursively before
//! the merged tree is materialised into typed structs.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct MentorConfig {
    pub version: Option<String>,
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub panels: Vec<PanelToggle>,
}

/// Text-generation provider; the tag is `provider`.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Openai {
        model: String,
        auth_token: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
    },
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    /// Keyless demo mode: streams a canned response instead of calling out.
    Mock {
        #[serde(default)]
        reply: Option<String>,
    },
}

/// External web-search proxy (`POST /web-search`).
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Presentation pacing knobs.
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    /// Milliseconds per revealed character in the typewriter animation.
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: u64,
    /// UI tick interval driving redraw, spinner, and reveal advancement.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            reveal_ms: default_reveal_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// Where saved sessions live.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Per-panel enablement override; unknown ids are ignored at wiring time.
#[derive(Debug, Deserialize)]
pub struct PanelToggle {
    pub id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_reveal_ms() -> u64 {
    50
}
fn default_tick_ms() -> u64 {
    80
}
fn default_store_path() -> String {
    "~/.local/share/mentor/sessions.json".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct MentorConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MentorConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MentorConfigLoader {
    /// Start with sensible defaults: YAML file + `MENTOR_` env overrides.
    ///
    /// ```
    /// use mentor_config::MentorConfigLoader;
    ///
    /// let config = MentorConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nllm:\n  provider: mock")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.ui.reveal_ms, 50);
    /// assert_eq!(config.ui.tick_ms, 80);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("MENTOR").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use mentor_config::{LlmConfig, MentorConfigLoader};
    ///
    /// let cfg = MentorConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// llm:
    ///   provider: ollama
    ///   model: "llama3.2:3b"
    /// panels:
    ///   - id: "skills-forecast"
    ///     enabled: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(matches!(cfg.llm, LlmConfig::Ollama { .. }));
    /// assert_eq!(cfg.panels.len(), 1);
    /// assert_eq!(cfg.panels[0].enabled, Some(false));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use mentor_config::{LlmConfig, MentorConfigLoader};
    ///
    /// unsafe { std::env::set_var("COACH_TOKEN", "injected-from-env"); }
    ///
    /// let config = MentorConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// version: "1"
    /// llm:
    ///   provider: openai
    ///   model: "gpt-4o-mini"
    ///   auth_token: "${COACH_TOKEN}"
    /// search:
    ///   endpoint: "http://127.0.0.1:8080"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.llm {
    ///     LlmConfig::Openai { model, auth_token, endpoint, .. } => {
    ///         assert_eq!(model, "gpt-4o-mini");
    ///         assert_eq!(auth_token, "injected-from-env");
    ///         assert_eq!(endpoint, "https://api.openai.com/v1");
    ///     }
    ///     _ => panic!("expected OpenAI configuration"),
    /// }
    /// assert_eq!(config.search.unwrap().endpoint, "http://127.0.0.1:8080");
    ///
    /// unsafe { std::env::remove_var("COACH_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<MentorConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Go through serde_json::Value so `${VAR}` placeholders can be
        // expanded anywhere in the tree before typing it.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: MentorConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("TOPIC", Some("negotiation"), || {
            let mut v = json!("lesson-${TOPIC}-draft");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("lesson-negotiation-draft"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("ROLE", Some("manager")), ("TEAM", Some("sales"))], || {
            let mut v = json!([
                "coach-$ROLE",
                { "scope": "${ROLE}-${TEAM}" },
                7,
                false,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["coach-manager", { "scope": "manager-sales" }, 7, false, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                // INNER references LEAF; OUTER references INNER: two hops.
                ("LEAF", Some("end")),
                ("INNER", Some("mid-${LEAF}")),
                ("OUTER", Some("start-${INNER}")),
            ],
            || {
                let mut v = json!("X=${OUTER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // The depth cap guarantees termination; the exact remainder is
            // unspecified beyond still containing an unresolved placeholder.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
