//! Matrix Node - display controller for one matrix panel
//!
//! This is the entry point of the per-node binary.

use std::time::Instant;
use tracing::info;

use matrix_signage::{
    config::NodeConfig,
    display::LogRenderer,
    node::{NodeController, TriggerFile},
    services::{mqtt_options, ConnectivityController, HostLink, MqttBus},
    tasks::{run_node_loop, watchdog_task, StallWatchdog, WATCHDOG_TIMEOUT},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "matrix_signage={level},matrix_node={level}",
            level = config.log_level()
        ))
        .init();

    info!("Starting matrix-node v{}", env!("CARGO_PKG_VERSION"));

    // Missing broker or topic settings are fatal
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    info!(
        "Configuration: broker={}:{}, topic={}, profile={:?}",
        config.broker_host, config.broker_port, config.topic, config.profile
    );

    let bus = MqttBus::new(mqtt_options(
        &config.broker_host,
        config.broker_port,
        &config.client_id,
        config.credentials(),
    ));
    let connectivity = ConnectivityController::new(HostLink::new(), bus, config.topic.clone(), Instant::now());

    // Start the stall watchdog
    let watchdog = StallWatchdog::new();
    let observer = watchdog.clone();
    tokio::spawn(async move {
        watchdog_task(observer, WATCHDOG_TIMEOUT).await;
    });

    let mut node = NodeController::new(
        config.profile.profile(),
        connectivity,
        Box::new(LogRenderer::new()),
        Box::new(watchdog),
    )
    .with_trigger_file(config.trigger_file.clone().map(TriggerFile::new))
    .with_pump_wait(config.pump_wait());

    node.start(Instant::now()).await;
    run_node_loop(&mut node, config.tick_interval()).await;

    info!("Node shutdown complete");
    Ok(())
}
