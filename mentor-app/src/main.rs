use anyhow::Result;
use clap::Parser;
use mentor_common::observability::{init_logging, LogConfig};
use mentor_config::MentorConfigLoader;
use mentor_runtime::MentorRuntime;
use std::path::PathBuf;
use std::time::Duration;
use tether::{build_from_config, Tether};
mod tether;

#[derive(Parser)]
#[command(name = "mentor", about = "AI workplace learning coach in your terminal")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "mentor.yaml")]
    config: PathBuf,
    /// Override the log directory.
    #[arg(long, env = "MENTOR_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = MentorConfigLoader::new().with_file(&cli.config).load()?;

    init_logging(LogConfig {
        log_dir: cli.log_dir,
        ..LogConfig::default()
    })?;

    // Everything is event-driven; one thread is enough.
    let runtime = MentorRuntime::build_current_thread("mentor-ui")?;
    let result = runtime.block_on(async move {
        let mut tether = Tether::new();
        build_from_config(&mut tether, cfg).await?;
        tether.run().await
    });
    runtime.shutdown(Duration::from_millis(250));
    result
}
