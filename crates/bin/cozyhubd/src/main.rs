//! # cozyhubd — cozyhub daemon
//!
//! Composition root that wires the device clients, switch adapters and the
//! poller together.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Build one device client per configured device (TCP and virtual)
//! - Run the switch setup routine over those clients
//! - Run the poller until SIGINT, then shut it down gracefully
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod clients;
mod config;

use anyhow::Context;
use cozyhub_app::ports::SystemClock;
use cozyhub_app::services::poller::Poller;
use cozyhub_app::services::setup::setup_switches;
use cozyhub_app::state_bus::InProcessStateBus;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const STATE_BUS_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Devices
    let clients = clients::build(&config).await;
    tracing::info!(devices = clients.len(), "device clients ready");

    // Switches
    let switches = setup_switches(clients, SystemClock, config.polling.update_interval()).await;

    // State bus
    let bus = InProcessStateBus::new(STATE_BUS_CAPACITY);
    let mut updates = bus.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(snapshot) = updates.recv().await {
            tracing::debug!(
                entity = %snapshot.unique_id,
                name = %snapshot.name,
                state = %snapshot.state(),
                "state update"
            );
        }
    });

    // Poller
    let (poller, handle) = Poller::new(switches, bus, config.polling.poll_interval());
    let poller_task = tokio::spawn(poller.run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");

    handle.shutdown().await;
    let switches = poller_task.await.context("poller task failed")?;
    listener.abort();

    tracing::info!(switches = switches.len(), "cozyhubd stopped");
    Ok(())
}
