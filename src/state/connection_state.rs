//! Link and bus bookkeeping owned by the connectivity controller

use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    pub link_up: bool,
    pub bus_up: bool,
    pub link_retry_count: u32,
    pub bus_retry_count: u32,
    pub last_successful_connection: Option<Instant>,
    pub last_heartbeat: Option<Instant>,
    pub last_link_check: Option<Instant>,
    pub last_bus_check: Option<Instant>,
    pub last_ping: Option<Instant>,
    pub failed_pings: u32,
    pub last_message_received: Option<Instant>,
    pub messages_total: u64,
    pub messages_failed: u64,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_message(&mut self, succeeded: bool, now: Instant) {
        self.messages_total += 1;
        if !succeeded {
            self.messages_failed += 1;
        }
        self.last_message_received = Some(now);
    }

    /// Percentage of inbound commands that were applied, 100 before any arrive
    pub fn message_success_rate(&self) -> f64 {
        if self.messages_total == 0 {
            return 100.0;
        }
        (self.messages_total - self.messages_failed) as f64 / self.messages_total as f64 * 100.0
    }

    /// Reported quality is the command success rate, whatever the link state
    pub fn connection_quality(&self) -> f64 {
        self.message_success_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_defaults_to_full() {
        assert_eq!(ConnectionState::new().message_success_rate(), 100.0);
    }

    #[test]
    fn success_rate_tracks_failures() {
        let now = Instant::now();
        let mut state = ConnectionState::new();
        state.record_message(true, now);
        state.record_message(true, now);
        state.record_message(true, now);
        state.record_message(false, now);
        assert_eq!(state.messages_total, 4);
        assert_eq!(state.messages_failed, 1);
        assert_eq!(state.message_success_rate(), 75.0);
        assert_eq!(state.connection_quality(), 75.0);
    }

    #[test]
    fn quality_ignores_link_state() {
        let now = Instant::now();
        let mut state = ConnectionState::new();
        state.record_message(true, now);
        assert!(!state.link_up && !state.bus_up);
        assert_eq!(state.connection_quality(), 100.0);

        state.link_up = true;
        state.record_message(false, now);
        assert_eq!(state.connection_quality(), 50.0);
        assert_eq!(state.connection_quality(), state.message_success_rate());
    }
}
