//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gateway status with publish counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub broker_connected: bool,
    pub targets: Vec<String>,
    pub published: u64,
    pub rejected: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_command: Option<String>,
    pub last_command_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
