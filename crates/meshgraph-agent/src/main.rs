mod config;
mod server;
mod snapshot;

use anyhow::Result;
use config::{parse_args, SourceMode};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = parse_args()?;

    match &config.source {
        SourceMode::Mock => tracing::info!("mock mode: serving generated mesh data"),
        SourceMode::StateFile(path) => {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "state file not found yet");
            }
        }
    }

    // Clean stale socket
    let _ = std::fs::remove_file(&config.sock_path);

    server::run(&config.sock_path, Arc::new(config.source)).await
}
