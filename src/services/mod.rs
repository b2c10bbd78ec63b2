//! External collaborators of a node
//!
//! The network link and the bus session, plus the controller that keeps both
//! alive and publishes acknowledgments and health records. The gateway's
//! command publisher lives here too.

pub mod bus;
pub mod connectivity;
pub mod link;
pub mod publisher;
pub mod reports;

// Re-export main types
pub use bus::{mqtt_options, Bus, InboundMessage, MqttBus};
pub use connectivity::{retry_interval, ConnectivityController};
pub use link::{HostLink, Link};
pub use publisher::{CommandPublisher, MqttPublisher};
