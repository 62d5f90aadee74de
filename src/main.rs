use crate::app_config::AppConfig;
use crate::registry::client::RegistryClient;
use crate::view::detail::{DetailCommand, DetailState};
use crate::view::list::ListState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task;
use tracing::info;

mod app_config;
mod dashboard;
mod domain;
mod registry;
mod view;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load();
    info!("✅  Loaded configuration");

    let registry_client = RegistryClient::new(&config)?;
    let buffer_size = config.core().channel_buffer_size();

    let (list_tx, list_rx) = watch::channel(ListState::Idle);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    task::spawn(view::list::sync_loop(
        registry_client.clone(),
        config.registry().poll_interval(),
        list_tx,
        shutdown_rx,
    ));
    info!("✅  Started device list sync loop");

    let (detail_tx, detail_rx) = watch::channel(DetailState::Closed);
    let (commands_tx, commands_rx) = mpsc::channel::<DetailCommand>(buffer_size);
    task::spawn(view::detail::run(Arc::new(registry_client), commands_rx, detail_tx, buffer_size));
    info!("✅  Started device detail view");

    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    dashboard::run(list_rx, detail_rx, commands_tx).await;

    // Dropping the shutdown sender deactivates the poll loop; dropping the
    // command sender ends the detail view.
    drop(shutdown_tx);

    Ok(())
}
