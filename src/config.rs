//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{display::DisplayProfile, error::ConfigError};

/// Upper bound for the bus message-pump wait, keeps the loop responsive
pub const MAX_PUMP_MS: u64 = 1000;

pub const DEFAULT_PUMP_WAIT: Duration = Duration::from_millis(20);

/// Hardware variant of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileKind {
    /// 64x32 panel with background layer and radio icon
    Standard,
    /// Standard panel plus two-line scrolling for the music preset
    Music,
    /// Border and text only
    Basic,
}

impl ProfileKind {
    pub fn profile(self) -> DisplayProfile {
        match self {
            ProfileKind::Standard => DisplayProfile::standard(),
            ProfileKind::Music => DisplayProfile::music(),
            ProfileKind::Basic => DisplayProfile::basic(),
        }
    }
}

/// Display node CLI arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "matrix-node")]
#[command(about = "Matrix display node driven by MQTT commands")]
#[command(version)]
pub struct NodeConfig {
    /// MQTT broker host
    #[arg(long, env = "MQTT_BROKER")]
    pub broker_host: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_PORT", default_value = "1883")]
    pub broker_port: u16,

    /// MQTT username
    #[arg(long, env = "MQTT_USER")]
    pub username: Option<String>,

    /// MQTT password
    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Command topic of this display, e.g. home/displays/wc
    #[arg(long, env = "MQTT_TOPIC")]
    pub topic: String,

    /// MQTT client identifier
    #[arg(long, default_value = "matrix-node")]
    pub client_id: String,

    /// Hardware profile
    #[arg(long, value_enum, default_value = "standard")]
    pub profile: ProfileKind,

    /// JSON file polled for test commands while the display is idle
    #[arg(long)]
    pub trigger_file: Option<PathBuf>,

    /// Sleep between loop ticks in milliseconds
    #[arg(long, default_value = "10")]
    pub tick_ms: u64,

    /// Maximum time a tick waits for bus traffic in milliseconds
    #[arg(long, default_value = "20")]
    pub pump_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl NodeConfig {
    /// Parse configuration from command line arguments and environment
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Reject configurations the node cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_broker(&self.broker_host, &self.username, &self.password)?;

        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ConfigError::Missing("topic"));
        }
        if topic.contains('#') || topic.contains('+') {
            return Err(ConfigError::Invalid(format!(
                "command topic must not contain wildcards: {}",
                topic
            )));
        }
        if self.pump_ms == 0 || self.pump_ms > MAX_PUMP_MS {
            return Err(ConfigError::Invalid(format!(
                "pump-ms must be within 1..={}, got {}",
                MAX_PUMP_MS, self.pump_ms
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn pump_wait(&self) -> Duration {
        Duration::from_millis(self.pump_ms.min(MAX_PUMP_MS))
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        pair(&self.username, &self.password)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// HTTP gateway CLI arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "matrix-gateway")]
#[command(about = "HTTP gateway that publishes display commands to MQTT")]
#[command(version)]
pub struct GatewayConfig {
    /// Port to bind the server to
    #[arg(short, long, default_value = "52341")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// MQTT broker host
    #[arg(long, env = "MQTT_BROKER")]
    pub broker_host: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_PORT", default_value = "1883")]
    pub broker_port: u16,

    /// MQTT username
    #[arg(long, env = "MQTT_USER")]
    pub username: Option<String>,

    /// MQTT password
    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// MQTT client identifier
    #[arg(long, default_value = "matrix-gateway")]
    pub client_id: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl GatewayConfig {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_broker(&self.broker_host, &self.username, &self.password)
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        pair(&self.username, &self.password)
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn validate_broker(
    host: &str,
    username: &Option<String>,
    password: &Option<String>,
) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(ConfigError::Missing("broker host"));
    }
    match (username, password) {
        (Some(_), None) => Err(ConfigError::Missing("password")),
        (None, Some(_)) => Err(ConfigError::Missing("username")),
        _ => Ok(()),
    }
}

fn pair(username: &Option<String>, password: &Option<String>) -> Option<(String, String)> {
    match (username, password) {
        (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
        _ => None,
    }
}
