//! Event loop driver for the gateway's MQTT client

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use rumqttc::{Event, EventLoop, Packet};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::services::retry_interval;

/// Poll the client event loop forever, mirroring session state into `connected`
///
/// Failed connections back off the same way node reconnects do.
pub async fn gateway_bus_task(mut eventloop: EventLoop, connected: Arc<AtomicBool>) {
    info!("Starting gateway bus task");

    let mut retry_count = 0u32;

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Gateway connected to MQTT broker");
                connected.store(true, Ordering::SeqCst);
                retry_count = 0;
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                warn!("Broker closed the gateway session");
                connected.store(false, Ordering::SeqCst);
            }
            Ok(_) => {}
            Err(e) => {
                connected.store(false, Ordering::SeqCst);
                let delay = retry_interval(retry_count);
                retry_count = retry_count.saturating_add(1);
                warn!("Gateway bus error: {}, retrying in {:?}", e, delay);
                sleep(delay).await;
            }
        }
    }
}
