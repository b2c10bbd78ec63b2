//! Matrix Signage - MQTT-driven countdown and preset displays
//!
//! This library provides the per-node display controller (timer and preset
//! engines, border and text rendering state, connection supervision) and the
//! HTTP gateway that turns web requests into display commands.

pub mod api;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod node;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{GatewayConfig, NodeConfig};
pub use node::NodeController;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
