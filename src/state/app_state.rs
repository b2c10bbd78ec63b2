//! Shared state of the HTTP gateway

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{error::BusError, services::CommandPublisher};

/// Gateway state shared by all request handlers
pub struct AppState {
    /// Where translated commands go
    pub publisher: Arc<dyn CommandPublisher>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last published command tracking
    pub last_command: Arc<Mutex<Option<String>>>,
    pub last_command_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    pub published: AtomicU64,
    pub rejected: AtomicU64,
}

impl AppState {
    pub fn new(publisher: Arc<dyn CommandPublisher>, port: u16, host: String) -> Self {
        Self {
            publisher,
            start_time: Instant::now(),
            port,
            host,
            last_command: Arc::new(Mutex::new(None)),
            last_command_time: Arc::new(Mutex::new(None)),
            published: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Publish a command payload and remember it as the last command
    pub fn publish_command(&self, topic: &str, payload: Vec<u8>, summary: &str) -> Result<(), BusError> {
        self.publisher.publish(topic, payload)?;
        info!(topic, "Published {}", summary);

        self.published.fetch_add(1, Ordering::Relaxed);
        match self.last_command.lock() {
            Ok(mut last_command) => *last_command = Some(format!("{} -> {}", summary, topic)),
            Err(e) => warn!("Failed to record last command: {}", e),
        }
        if let Ok(mut last_time) = self.last_command_time.lock() {
            *last_time = Some(Utc::now());
        }
        Ok(())
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn broker_connected(&self) -> bool {
        self.publisher.is_connected()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information
    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_command = self.last_command.lock().ok().and_then(|c| c.clone());
        let last_command_time = self.last_command_time.lock().ok().and_then(|t| *t);
        (last_command, last_command_time)
    }
}
