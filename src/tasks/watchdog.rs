//! Stall watchdog for the node loop

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tokio::time::interval;
use tracing::{error, info};

/// Terminate the process if the loop stops feeding for this long
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(30);

const CHECK_PERIOD: Duration = Duration::from_secs(5);

/// Fed once per tick by the node loop
pub trait Watchdog {
    fn feed(&mut self);
}

/// Software stand-in for a hardware watchdog
#[derive(Debug, Clone)]
pub struct StallWatchdog {
    epoch: Instant,
    last_feed_ms: Arc<AtomicU64>,
}

impl StallWatchdog {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_feed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Time since the last feed
    pub fn starved_for(&self) -> Duration {
        let now_ms = self.epoch.elapsed().as_millis() as u64;
        Duration::from_millis(now_ms.saturating_sub(self.last_feed_ms.load(Ordering::Relaxed)))
    }

    pub fn is_starved(&self, timeout: Duration) -> bool {
        self.starved_for() > timeout
    }
}

impl Default for StallWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog for StallWatchdog {
    fn feed(&mut self) {
        let now_ms = self.epoch.elapsed().as_millis() as u64;
        self.last_feed_ms.store(now_ms, Ordering::Relaxed);
    }
}

/// Background task that kills a stalled node so its supervisor restarts it
pub async fn watchdog_task(watchdog: StallWatchdog, timeout: Duration) {
    info!("Starting watchdog task, timeout {:?}", timeout);

    let mut interval = interval(CHECK_PERIOD);

    loop {
        interval.tick().await;

        if watchdog.is_starved(timeout) {
            error!("Node loop stalled for {:?}, exiting", watchdog.starved_for());
            std::process::exit(1);
        }
    }
}
