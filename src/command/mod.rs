//! Command decoding and dispatch

pub mod payload;
pub mod router;

pub use payload::{decode, Command, DecodedMessage};
pub use router::CommandRouter;
