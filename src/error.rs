//! Error types shared across the node and the gateway

use thiserror::Error;

/// Fatal startup configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Network link failures
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no network address available")]
    NoAddress,
}

/// Message bus failures
#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus session is not connected")]
    NotConnected,
    /// The session accepted no more outbound packets; the session is treated as dead
    #[error("failed to send: {0}")]
    SendFailed(String),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("connection error: {0}")]
    Connection(String),
}

/// Why an inbound command was not applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Payload could not be decoded at all
    #[error("parse error: {0}")]
    Parse(String),
    /// Payload decoded but its fields are missing or out of range
    #[error("invalid command: {0}")]
    Invalid(String),
    /// Well-formed command that an engine refused
    #[error("command rejected: {0}")]
    Rejected(String),
}

impl CommandError {
    /// Status string reported in the acknowledgment record
    pub fn ack_status(&self) -> &'static str {
        match self {
            CommandError::Parse(_) => "error",
            CommandError::Invalid(_) | CommandError::Rejected(_) => "failed",
        }
    }
}

/// Failures surfaced at the tick boundary
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("trigger file: {0}")]
    Trigger(#[from] std::io::Error),
}
