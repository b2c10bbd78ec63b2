//! Polling loop that drives a node until shutdown

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    time::{Duration, Instant},
};
use futures::FutureExt;
use tokio::time::sleep;
use tracing::{error, info};

use crate::{
    node::NodeController,
    services::{Bus, Link},
    utils::shutdown_signal,
};

/// Pause after a failed tick before trying again
pub const ERROR_BACKOFF: Duration = Duration::from_millis(100);

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Tick the node every `tick` until SIGTERM/SIGINT
///
/// A failing or panicking tick is logged and the loop carries on after
/// [`ERROR_BACKOFF`].
pub async fn run_node_loop<L: Link, B: Bus>(node: &mut NodeController<L, B>, tick: Duration) {
    info!("Starting node loop, tick {:?}", tick);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let outcome = AssertUnwindSafe(node.tick(Instant::now())).catch_unwind().await;
        let pause = match outcome {
            Ok(Ok(())) => tick,
            Ok(Err(e)) => {
                error!("Tick failed: {}", e);
                ERROR_BACKOFF
            }
            Err(panic) => {
                error!("Tick panicked: {}", panic_message(panic.as_ref()));
                ERROR_BACKOFF
            }
        };

        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = sleep(pause) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_readable() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
