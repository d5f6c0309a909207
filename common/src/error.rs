use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Error domain for interface inventory and port allocation.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Every port of the configured range was already in use.
    #[error("no more available port in range [{min}..{max}]")]
    PortExhaustion { min: u16, max: u16 },

    /// A bind failed for a reason other than contention inside a restricted range.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Rejected port range configuration (`min > max` or malformed text).
    #[error("invalid port range: {0}")]
    InvalidPortRange(String),

    /// Text that is not a numeric IP literal.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Netmask or broadcast address whose family differs from the interface address.
    #[error("address family mismatch on {name}: {address} vs {other}")]
    FamilyMismatch {
        name: String,
        address: IpAddr,
        other: IpAddr,
    },

    /// The platform refused to list its interfaces.
    #[error("interface enumeration failed: {0}")]
    Enumeration(String),
}

impl NetworkError {
    /// `true` when the failure is the transient "address already in use" condition.
    pub fn is_address_in_use(&self) -> bool {
        matches!(self, NetworkError::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}
