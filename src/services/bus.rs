//! Publish/subscribe bus session

use std::{
    io::ErrorKind,
    time::{Duration, Instant},
};

use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::BusError;

/// Keep-alive negotiated with the broker
pub const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Upper bound for a connect handshake
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const REQUEST_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Bus client primitives the connectivity controller orchestrates
#[allow(async_fn_in_trait)]
pub trait Bus {
    async fn connect(&mut self) -> Result<(), BusError>;

    fn is_connected(&self) -> bool;

    /// Queue a subscription on the current session
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError>;

    /// Queue a message on the current session
    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;

    /// Drive the session for at most `wait`, returning any inbound messages
    async fn pump(&mut self, wait: Duration) -> Result<Vec<InboundMessage>, BusError>;

    /// Liveness check of the session
    async fn ping(&mut self) -> Result<(), BusError>;

    async fn disconnect(&mut self) -> Result<(), BusError>;
}

/// Build client options shared by the node and the gateway
pub fn mqtt_options(
    host: &str,
    port: u16,
    client_id: &str,
    credentials: Option<(String, String)>,
) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, host, port);
    options.set_keep_alive(KEEP_ALIVE);
    options.set_clean_session(true);
    if let Some((username, password)) = credentials {
        options.set_credentials(username, password);
    }
    options
}

fn classify(error: ConnectionError) -> BusError {
    match error {
        ConnectionError::Io(e)
            if matches!(
                e.kind(),
                ErrorKind::BrokenPipe
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::WriteZero
            ) =>
        {
            BusError::SendFailed(e.to_string())
        }
        other => BusError::Connection(other.to_string()),
    }
}

/// MQTT session driven from the node loop
pub struct MqttBus {
    client: AsyncClient,
    eventloop: EventLoop,
    connected: bool,
    last_inbound: Option<Instant>,
}

impl MqttBus {
    pub fn new(options: MqttOptions) -> Self {
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        Self {
            client,
            eventloop,
            connected: false,
            last_inbound: None,
        }
    }

    fn on_event(&mut self, event: Event, inbox: &mut Vec<InboundMessage>) {
        let Event::Incoming(packet) = event else {
            return;
        };
        self.last_inbound = Some(Instant::now());
        match packet {
            Packet::Publish(publish) => {
                debug!(topic = %publish.topic, bytes = publish.payload.len(), "message received");
                inbox.push(InboundMessage {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                });
            }
            Packet::ConnAck(ack) => {
                self.connected = ack.code == ConnectReturnCode::Success;
            }
            Packet::Disconnect => {
                warn!("Broker closed the session");
                self.connected = false;
            }
            _ => {}
        }
    }
}

impl Bus for MqttBus {
    async fn connect(&mut self) -> Result<(), BusError> {
        let eventloop = &mut self.eventloop;
        let handshake = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        return if ack.code == ConnectReturnCode::Success {
                            Ok(())
                        } else {
                            Err(BusError::Connection(format!("broker refused: {:?}", ack.code)))
                        };
                    }
                    Ok(_) => continue,
                    Err(e) => return Err(BusError::Connection(e.to_string())),
                }
            }
        };

        let result = timeout(CONNECT_TIMEOUT, handshake)
            .await
            .map_err(|_| BusError::Timeout("connack"))?;
        self.connected = result.is_ok();
        if self.connected {
            self.last_inbound = Some(Instant::now());
            info!("Connected to MQTT broker");
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        self.client
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| BusError::SendFailed(e.to_string()))
    }

    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        // QoS 1 so every publish draws a PUBACK, which keeps `ping` meaningful
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(|e| BusError::SendFailed(e.to_string()))
    }

    async fn pump(&mut self, wait: Duration) -> Result<Vec<InboundMessage>, BusError> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        let deadline = tokio::time::Instant::now() + wait;
        let mut inbox = Vec::new();
        while inbox.is_empty() {
            match tokio::time::timeout_at(deadline, self.eventloop.poll()).await {
                Err(_) => break,
                Ok(Ok(event)) => self.on_event(event, &mut inbox),
                Ok(Err(e)) => {
                    self.connected = false;
                    return Err(classify(e));
                }
            }
        }
        Ok(inbox)
    }

    async fn ping(&mut self) -> Result<(), BusError> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        // The event loop sends PINGREQ on its own; a live broker answers
        // something at least once per keep-alive window.
        let silent = self
            .last_inbound
            .map_or(true, |last| last.elapsed() > KEEP_ALIVE * 3);
        if silent {
            Err(BusError::Timeout("broker traffic"))
        } else {
            Ok(())
        }
    }

    async fn disconnect(&mut self) -> Result<(), BusError> {
        self.connected = false;
        self.client
            .try_disconnect()
            .map_err(|e| BusError::SendFailed(e.to_string()))?;
        // Let the DISCONNECT go out; the next poll opens a fresh connection
        let _ = timeout(Duration::from_millis(500), self.eventloop.poll()).await;
        Ok(())
    }
}
