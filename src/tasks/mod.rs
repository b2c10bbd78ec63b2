//! Background tasks module
//!
//! The node polling loop, its stall watchdog and the gateway's bus driver.

pub mod gateway_bus;
pub mod node_loop;
pub mod watchdog;

// Re-export main functions
pub use gateway_bus::gateway_bus_task;
pub use node_loop::run_node_loop;
pub use watchdog::{watchdog_task, StallWatchdog, Watchdog, WATCHDOG_TIMEOUT};
