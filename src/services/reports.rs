//! Outbound records published by a node

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::CommandError;

/// Wall-clock seconds since the Unix epoch
pub fn epoch_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Acknowledgment of a correlated command, published on `<topic>/ack`
#[derive(Debug, Clone, Serialize)]
pub struct AckRecord {
    pub message_id: String,
    pub status: &'static str,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckRecord {
    pub fn new<T>(message_id: &str, result: &Result<T, CommandError>) -> Self {
        let (status, error) = match result {
            Ok(_) => ("success", None),
            Err(e @ CommandError::Parse(_)) => (e.ack_status(), Some(e.to_string())),
            Err(e) => (e.ack_status(), None),
        };
        Self {
            message_id: message_id.to_string(),
            status,
            timestamp: epoch_seconds(),
            error,
        }
    }
}

/// Lifecycle event, published on `<topic>/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthEvent {
    pub event: String,
    pub timestamp: f64,
    pub uptime: f64,
    pub data: Value,
}

/// Snapshot of link and bus state attached to error events
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub link_connected: bool,
    pub bus_connected: bool,
    pub retry_count: u32,
}

/// Error event, published on `<topic>/errors`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: f64,
    pub uptime: f64,
    pub details: Value,
    pub system_state: SystemSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    pub connected: bool,
    pub address: Option<String>,
}

/// Periodic status heartbeat, published on `<topic>/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: String,
    pub timestamp: f64,
    pub uptime: f64,
    pub link: LinkStatus,
    pub connection_quality: f64,
    pub message_success_rate: f64,
}
