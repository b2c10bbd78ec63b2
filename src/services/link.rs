//! Network link underneath the bus session

use std::net::IpAddr;

use tracing::debug;

use crate::error::LinkError;

/// The network link a node reaches its broker through
#[allow(async_fn_in_trait)]
pub trait Link {
    /// Whether the link currently carries traffic
    async fn is_up(&mut self) -> bool;

    /// Try to bring the link up
    async fn connect(&mut self) -> Result<(), LinkError>;

    /// Address assigned on this link, if any
    fn address(&self) -> Option<String>;
}

/// Link of a host with an OS-managed network stack
///
/// The OS owns association and DHCP; the link counts as up while the host
/// holds a routable local address.
#[derive(Debug, Default)]
pub struct HostLink {
    address: Option<IpAddr>,
}

impl HostLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self) -> Result<IpAddr, LinkError> {
        match local_ip_address::local_ip() {
            Ok(ip) => {
                self.address = Some(ip);
                Ok(ip)
            }
            Err(e) => {
                debug!("No local address: {}", e);
                self.address = None;
                Err(LinkError::NoAddress)
            }
        }
    }
}

impl Link for HostLink {
    async fn is_up(&mut self) -> bool {
        self.refresh().is_ok()
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        self.refresh().map(|_| ())
    }

    fn address(&self) -> Option<String> {
        self.address.map(|ip| ip.to_string())
    }
}
