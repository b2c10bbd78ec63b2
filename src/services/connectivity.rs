//! Link and bus supervision with exponential backoff

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::{
    reports::{epoch_seconds, AckRecord, ErrorEvent, HealthEvent, LinkStatus, StatusReport, SystemSnapshot},
    Bus, InboundMessage, Link,
};
use crate::{
    error::{BusError, CommandError},
    state::ConnectionState,
};

pub const BASE_DELAY: Duration = Duration::from_secs(3);
pub const MAX_INTERVAL: Duration = Duration::from_secs(300);
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const PING_INTERVAL: Duration = Duration::from_secs(60);
pub const MAX_FAILED_PINGS: u32 = 3;

/// Delay before the next attempt after `retry_count` failures
pub fn retry_interval(retry_count: u32) -> Duration {
    let factor = 1u32.checked_shl(retry_count).unwrap_or(u32::MAX);
    BASE_DELAY.saturating_mul(factor).min(MAX_INTERVAL)
}

fn due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    last.map_or(true, |last| now.saturating_duration_since(last) >= interval)
}

/// Supervises the link and the bus session of one node
///
/// Every method takes `now` from the caller; nothing here reads the clock
/// except the wall-clock timestamp stamped on outbound records.
pub struct ConnectivityController<L, B> {
    link: L,
    bus: B,
    topic: String,
    state: ConnectionState,
    started_at: Instant,
}

impl<L: Link, B: Bus> ConnectivityController<L, B> {
    pub fn new(link: L, bus: B, topic: impl Into<String>, started_at: Instant) -> Self {
        Self {
            link,
            bus,
            topic: topic.into(),
            state: ConnectionState::new(),
            started_at,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn subtopic(&self, suffix: &str) -> String {
        format!("{}/{}", self.topic, suffix)
    }

    fn uptime(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started_at).as_secs_f64()
    }

    /// Boot-time attempt at both layers
    pub async fn start(&mut self, now: Instant) {
        info!(topic = %self.topic, "Starting connectivity");
        self.state.last_link_check = Some(now);
        match self.link.connect().await {
            Ok(()) => self.on_link_up(now),
            Err(e) => {
                self.state.link_up = false;
                self.state.link_retry_count += 1;
                warn!("Link unavailable at startup: {}", e);
                return;
            }
        }
        self.state.last_bus_check = Some(now);
        self.connect_bus(now).await;
    }

    /// Keep both layers up; returns whether the bus is usable
    pub async fn maintain(&mut self, now: Instant) -> bool {
        if !self.check_link(now).await {
            return false;
        }
        self.check_bus(now).await
    }

    pub async fn check_link(&mut self, now: Instant) -> bool {
        if !due(self.state.last_link_check, retry_interval(self.state.link_retry_count), now) {
            return self.state.link_up;
        }
        self.state.last_link_check = Some(now);

        if self.link.is_up().await {
            if self.state.link_up {
                self.state.link_retry_count = 0;
            } else {
                self.on_link_up(now);
            }
            return true;
        }

        if self.state.link_up {
            warn!("Link lost");
            self.report_error("link_disconnected", json!({ "retry_count": self.state.link_retry_count }), now);
        }
        self.state.link_up = false;
        // The session cannot outlive its link; the next bus check revalidates it
        self.state.bus_up = false;

        match self.link.connect().await {
            Ok(()) => {
                self.on_link_up(now);
                true
            }
            Err(e) => {
                self.state.link_retry_count += 1;
                warn!(
                    retry_count = self.state.link_retry_count,
                    "Link reconnect failed: {}, next attempt in {:?}",
                    e,
                    retry_interval(self.state.link_retry_count)
                );
                false
            }
        }
    }

    /// Bus checks short-circuit while the link is down
    pub async fn check_bus(&mut self, now: Instant) -> bool {
        if !self.state.link_up {
            return false;
        }
        if !due(self.state.last_bus_check, retry_interval(self.state.bus_retry_count), now) {
            return self.state.bus_up;
        }
        self.state.last_bus_check = Some(now);

        if self.bus.is_connected() {
            self.state.bus_up = true;
            self.state.bus_retry_count = 0;
            return true;
        }

        if self.state.bus_up {
            warn!("Bus session lost");
        }
        self.state.bus_up = false;
        self.connect_bus(now).await
    }

    fn on_link_up(&mut self, now: Instant) {
        self.state.link_up = true;
        self.state.link_retry_count = 0;
        self.state.last_successful_connection = Some(now);
        let address = self.link.address();
        info!(address = ?address, "Link connected");
        self.report_health("link_connected", json!({ "address": address }), now);
    }

    async fn connect_bus(&mut self, now: Instant) -> bool {
        if let Err(e) = self.bus.connect().await {
            self.state.bus_up = false;
            self.state.bus_retry_count += 1;
            warn!(
                retry_count = self.state.bus_retry_count,
                "Bus connect failed: {}, next attempt in {:?}",
                e,
                retry_interval(self.state.bus_retry_count)
            );
            return false;
        }

        self.state.bus_up = true;
        self.state.bus_retry_count = 0;
        self.state.failed_pings = 0;
        self.state.last_successful_connection = Some(now);
        info!(topic = %self.topic, "Bus connected");

        // The retry counter already reset; a failed subscribe is only reported
        let topic = self.topic.clone();
        if let Err(e) = self.bus.subscribe(&topic) {
            error!("Subscribe to {} failed: {}", topic, e);
            self.report_error("subscribe_failed", json!({ "topic": topic, "error": e.to_string() }), now);
        }
        self.report_health("bus_connected", json!({ "topic": topic }), now);
        true
    }

    /// Tear down the session; the next bus check reconnects after backoff
    async fn recycle_bus(&mut self, reason: &str, now: Instant) {
        warn!("Recycling bus session: {}", reason);
        if let Err(e) = self.bus.disconnect().await {
            debug!("Disconnect during recycle failed: {}", e);
        }
        self.state.bus_up = false;
        self.state.bus_retry_count += 1;
        self.state.last_bus_check = Some(now);
    }

    fn on_bus_error(&mut self, context: &str, e: &BusError) {
        warn!("Bus {} failed: {}", context, e);
        self.state.bus_retry_count += 1;
        if !self.bus.is_connected() {
            self.state.bus_up = false;
        }
    }

    /// Publish a status record every heartbeat interval
    pub async fn heartbeat(&mut self, now: Instant) {
        if !due(self.state.last_heartbeat, HEARTBEAT_INTERVAL, now) {
            return;
        }
        self.state.last_heartbeat = Some(now);
        let report = StatusReport {
            status: "online".to_string(),
            timestamp: epoch_seconds(),
            uptime: self.uptime(now),
            link: LinkStatus {
                connected: self.state.link_up,
                address: self.link.address(),
            },
            connection_quality: self.state.connection_quality(),
            message_success_rate: self.state.message_success_rate(),
        };
        let topic = self.subtopic("status");
        self.publish_record(&topic, &report, now).await;
    }

    /// Liveness check; repeated failures force a fresh session
    pub async fn check_ping(&mut self, now: Instant) {
        if !self.state.bus_up || !due(self.state.last_ping, PING_INTERVAL, now) {
            return;
        }
        self.state.last_ping = Some(now);

        match self.bus.ping().await {
            Ok(()) => self.state.failed_pings = 0,
            Err(e) => {
                self.state.failed_pings += 1;
                warn!(failed_pings = self.state.failed_pings, "Ping failed: {}", e);
                if self.state.failed_pings >= MAX_FAILED_PINGS {
                    self.state.failed_pings = 0;
                    self.recycle_bus("ping timeout", now).await;
                }
            }
        }
    }

    /// Drive the bus session for at most `wait` and hand back inbound messages
    pub async fn pump(&mut self, wait: Duration, now: Instant) -> Vec<InboundMessage> {
        if !self.state.bus_up {
            return Vec::new();
        }
        match self.bus.pump(wait).await {
            Ok(messages) => messages,
            Err(BusError::SendFailed(e)) => {
                error!("Failed to send on bus session: {}", e);
                self.recycle_bus("send failure", now).await;
                Vec::new()
            }
            Err(e) => {
                self.on_bus_error("pump", &e);
                Vec::new()
            }
        }
    }

    pub fn record_message(&mut self, succeeded: bool, now: Instant) {
        self.state.record_message(succeeded, now);
    }

    /// Publish the correlated acknowledgment for a processed command
    pub async fn acknowledge<T>(&mut self, message_id: &str, result: &Result<T, CommandError>, now: Instant) {
        let record = AckRecord::new(message_id, result);
        debug!(message_id, status = record.status, "Acknowledging command");
        let topic = self.subtopic("ack");
        self.publish_record(&topic, &record, now).await;
    }

    pub fn report_health(&mut self, event: &str, data: Value, now: Instant) {
        info!(event, "Health event");
        let record = HealthEvent {
            event: event.to_string(),
            timestamp: epoch_seconds(),
            uptime: self.uptime(now),
            data,
        };
        let topic = self.subtopic("health");
        if let Some(Err(e)) = self.publish_now(&topic, &record) {
            debug!("Health event not published: {}", e);
        }
    }

    pub fn report_error(&mut self, kind: &str, details: Value, now: Instant) {
        warn!(kind, details = %details, "Error event");
        let record = ErrorEvent {
            kind: kind.to_string(),
            timestamp: epoch_seconds(),
            uptime: self.uptime(now),
            details,
            system_state: SystemSnapshot {
                link_connected: self.state.link_up,
                bus_connected: self.state.bus_up,
                retry_count: self.state.bus_retry_count,
            },
        };
        let topic = self.subtopic("errors");
        if let Some(Err(e)) = self.publish_now(&topic, &record) {
            debug!("Error event not published: {}", e);
        }
    }

    /// Best-effort publish for local events; failures are left to the next pump
    fn publish_now<T: Serialize>(&mut self, topic: &str, record: &T) -> Option<Result<(), BusError>> {
        if !self.state.bus_up {
            debug!(topic, "Bus down, event kept local");
            return None;
        }
        let payload = match serde_json::to_vec(record) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode record for {}: {}", topic, e);
                return None;
            }
        };
        Some(self.bus.publish(topic, payload))
    }

    async fn publish_record<T: Serialize>(&mut self, topic: &str, record: &T, now: Instant) {
        match self.publish_now(topic, record) {
            None | Some(Ok(())) => {}
            Some(Err(BusError::SendFailed(e))) => {
                error!("Failed to send to {}: {}", topic, e);
                self.recycle_bus("send failure", now).await;
            }
            Some(Err(e)) => self.on_bus_error("publish", &e),
        }
    }
}
