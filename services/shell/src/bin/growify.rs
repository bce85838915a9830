//! services/shell/src/bin/growify.rs

use shell_lib::{
    adapters::{FileStore, SystemClock},
    app::{Persistence, RootState},
    bridge::{self, ShellSession},
    config::Config,
    error::ShellError,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ShellError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting shell...");

    // --- 2. Open Local Storage & Mount the Root State ---
    let store = Arc::new(FileStore::open(config.storage_path.clone()).await?);
    info!("Local storage at {}", store.path().display());
    let clock = Arc::new(SystemClock);
    let root = RootState::mount(
        Persistence::new(store),
        clock.clone(),
        config.prefers_dark_scheme,
    )
    .await?;

    // --- 3. Serve the View over stdin/stdout ---
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = ShellSession::new(config.clone(), clock, root, events_tx);
    bridge::serve(
        session,
        events_rx,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    info!("Shell stopped.");
    Ok(())
}
