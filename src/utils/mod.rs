//! Utility functions module
//!
//! Helpers shared by the node and gateway binaries.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
