use anyhow::Result;
use mentor_actors::{
    actor::Addr,
    builder::Builder,
    search::SearchActor,
    store::StoreActor,
};
use mentor_common::kv::{JsonFileKv, KvStore};
use mentor_config::{LlmConfig, MentorConfig};
use mentor_llm::{
    mock::MockClient, ollama::OllamaClient, openai::OpenAiClient, traits::LlmClient,
    ClientTransport,
};
use mentor_search::SearchClient;
use mentor_stream::Transport;
use mentor_tui::{spawn_tui_feeders, TuiActor, UiTuning};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAILBOX: usize = 1024;
const DEFAULT_SEARCH_ENDPOINT: &str = "http://127.0.0.1:8080";

pub struct Tether {
    builder: Builder,
}

impl Default for Tether {
    fn default() -> Self {
        Self::new()
    }
}

impl Tether {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }
    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }
    pub async fn run(self) -> Result<()> {
        self.builder.run_until_ctrl_c().await
    }
}

pub async fn build_from_config(t: &mut Tether, cfg: MentorConfig) -> Result<()> {
    let b = t.builder_mut();
    let shutdown = b.shutdown_handle();

    // -------- PHASE 1: RESERVE EVERYTHING --------
    let r_store = b.reserve::<StoreActor>("store:main", DEFAULT_MAILBOX);
    let r_search = b.reserve::<SearchActor>("search:main", DEFAULT_MAILBOX);
    // ui (start last)
    let r_tui = b.reserve::<TuiActor>("tui:main", 256);

    // -------- PHASE 2a: START INFRA FIRST --------
    let store_path = expand_home(Path::new(&cfg.storage.path));
    let kv: Arc<dyn KvStore> = Arc::new(JsonFileKv::open(&store_path)?);
    tracing::info!(path = %store_path.display(), "store.open");
    b.start_reserved(r_store, StoreActor::new(kv));
    let store_addr: Addr<StoreActor> = b.addr("store:main").expect("store addr");

    // -------- PHASE 2b: START APP ACTORS (deps injected) --------
    let (search_endpoint, search_timeout) = match &cfg.search {
        Some(s) => (s.endpoint.clone(), s.timeout_secs),
        None => (DEFAULT_SEARCH_ENDPOINT.to_string(), None),
    };
    let mut search_client = SearchClient::new(&search_endpoint)?;
    if let Some(secs) = search_timeout {
        search_client = search_client.with_timeout(Duration::from_secs(secs));
    }
    b.start_reserved(r_search, SearchActor::new(search_client));
    let search_addr: Addr<SearchActor> = b.addr("search:main").expect("search addr");

    let llm_client = build_llm_client(&cfg.llm).await?;
    tracing::info!(model = llm_client.model_name(), "llm.ready");
    let transport: Arc<dyn Transport> = Arc::new(ClientTransport::new(llm_client));

    // -------- PHASE 3: START TUI LAST --------
    let tuning = UiTuning {
        reveal: Duration::from_millis(cfg.ui.reveal_ms),
        tick: Duration::from_millis(cfg.ui.tick_ms),
    };
    let disabled_panels: Vec<String> = cfg
        .panels
        .iter()
        .filter(|t| t.enabled == Some(false))
        .map(|t| t.id.clone())
        .collect();
    let tui = TuiActor::new(
        transport,
        search_addr,
        store_addr,
        shutdown.clone(),
        tuning,
        disabled_panels,
    )?;
    b.start_reserved(r_tui, tui);

    let tui_addr: Addr<TuiActor> = b.addr("tui:main").expect("tui addr");
    spawn_tui_feeders(tui_addr, shutdown, tuning.tick);

    Ok(())
}

pub async fn build_llm_client(cfg: &LlmConfig) -> Result<Arc<dyn LlmClient + Send + Sync>> {
    match cfg {
        LlmConfig::Openai {
            model,
            auth_token,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OpenAiClient::new(auth_token.clone(), model.clone(), endpoint.clone())?
                .with_defaults(*temperature, *max_tokens);
            Ok(Arc::new(client))
        }
        LlmConfig::Ollama {
            model,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OllamaClient::new(endpoint.clone(), model.clone())
                .await?
                .with_defaults(*temperature, *max_tokens);
            Ok(Arc::new(client))
        }
        LlmConfig::Mock { reply } => Ok(Arc::new(MockClient::new(reply.clone()))),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
