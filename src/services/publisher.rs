//! Command publishing for the HTTP gateway

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use rumqttc::{AsyncClient, QoS};

use crate::error::BusError;

/// Sink the gateway hands translated commands to
pub trait CommandPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;

    fn is_connected(&self) -> bool;
}

/// Publisher backed by a shared rumqttc client
///
/// `connected` is maintained by the task polling the client's event loop.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient, connected: Arc<AtomicBool>) -> Self {
        Self { client, connected }
    }
}

impl CommandPublisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(|e| BusError::SendFailed(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
