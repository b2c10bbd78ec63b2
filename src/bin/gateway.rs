//! Matrix Gateway - HTTP front door for the display nodes
//!
//! Translates web requests into MQTT display commands.

use std::sync::{atomic::AtomicBool, Arc};
use rumqttc::AsyncClient;
use tokio::net::TcpListener;
use tracing::info;

use matrix_signage::{
    api::create_router,
    config::GatewayConfig,
    services::{mqtt_options, MqttPublisher},
    state::AppState,
    tasks::gateway_bus_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "matrix_signage={level},matrix_gateway={level},tower_http=info",
            level = config.log_level()
        ))
        .init();

    info!("Starting matrix-gateway v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    info!(
        "Configuration: host={}, port={}, broker={}:{}",
        config.host, config.port, config.broker_host, config.broker_port
    );

    // One long-lived broker session shared by all requests
    let (client, eventloop) = AsyncClient::new(
        mqtt_options(
            &config.broker_host,
            config.broker_port,
            &config.client_id,
            config.credentials(),
        ),
        64,
    );
    let connected = Arc::new(AtomicBool::new(false));
    let bus_connected = Arc::clone(&connected);
    tokio::spawn(async move {
        gateway_bus_task(eventloop, bus_connected).await;
    });

    let publisher = Arc::new(MqttPublisher::new(client, connected));
    let state = Arc::new(AppState::new(publisher, config.port, config.host.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET/POST /command - Publish a timer or preset command");
    info!("  GET/POST /sigfox  - Same as /command");
    info!("  GET      /status  - Gateway status and counters");
    info!("  GET      /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
