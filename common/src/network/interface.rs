//! # Network Interface Model
//!
//! The normalized record every platform enumerator produces, plus the address
//! arithmetic shared by those enumerators (prefix to netmask, broadcast derivation,
//! netmask lookup in an address table).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::{self, Ipv4Network};
use tracing::warn;

use crate::error::NetworkError;

/// Label carried by [`loopback_fake_ipv4`].
pub const FAKE_IPV4_LOOPBACK_NAME: &str = "<fake IPv4 localhost>";

/// Netmask used when an address has no entry in the platform address table.
pub const FALLBACK_IPV4_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 0, 0);

/// One usable network interface address.
///
/// Immutable once built. `netmask` and `broadcast_address`, when present, always share
/// the family of `address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkInterface {
    address: IpAddr,
    netmask: Option<IpAddr>,
    broadcast_address: Option<IpAddr>,
    name: String,
}

impl NetworkInterface {
    pub fn new(
        name: impl Into<String>,
        address: IpAddr,
        netmask: Option<IpAddr>,
        broadcast_address: Option<IpAddr>,
    ) -> Result<Self, NetworkError> {
        let name = name.into();

        for other in [netmask, broadcast_address].into_iter().flatten() {
            if other.is_ipv4() != address.is_ipv4() {
                return Err(NetworkError::FamilyMismatch {
                    name,
                    address,
                    other,
                });
            }
        }

        Ok(Self {
            address,
            netmask,
            broadcast_address,
            name,
        })
    }

    /// Builds an IPv4 record; cannot violate the family invariant.
    pub fn ipv4(
        name: impl Into<String>,
        address: Ipv4Addr,
        netmask: Option<Ipv4Addr>,
        broadcast_address: Option<Ipv4Addr>,
    ) -> Self {
        Self {
            address: IpAddr::V4(address),
            netmask: netmask.map(IpAddr::V4),
            broadcast_address: broadcast_address.map(IpAddr::V4),
            name: name.into(),
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn netmask(&self) -> Option<IpAddr> {
        self.netmask
    }

    pub fn broadcast_address(&self) -> Option<IpAddr> {
        self.broadcast_address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `127.0.0.0/8` for IPv4, exactly `::1` for IPv6.
    pub fn is_loopback(&self) -> bool {
        match self.address {
            IpAddr::V4(v4) => v4.octets()[0] == 127,
            IpAddr::V6(v6) => v6 == Ipv6Addr::LOCALHOST,
        }
    }

    /// Address and netmask as an IPv4 network.
    ///
    /// `None` for IPv6, when no netmask is known, or when the mask is not contiguous.
    pub fn ipv4_network(&self) -> Option<Ipv4Network> {
        let (IpAddr::V4(address), Some(IpAddr::V4(netmask))) = (self.address, self.netmask) else {
            return None;
        };
        let prefix = ipnetwork::ipv4_mask_to_prefix(netmask).ok()?;
        Ipv4Network::new(address, prefix).ok()
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.address)?;
        if let Some(netmask) = self.netmask {
            write!(f, "/{netmask}")?;
        }
        if let Some(broadcast) = self.broadcast_address {
            write!(f, " brd {broadcast}")?;
        }
        Ok(())
    }
}

/// Loopback test that also accepts a missing interface (never loopback).
pub fn is_loopback(interface: Option<&NetworkInterface>) -> bool {
    interface.is_some_and(NetworkInterface::is_loopback)
}

/// A hard-coded `127.0.0.1/8` record that needs no platform call.
///
/// Handy for self-tests against a local fake device when the real loopback interface
/// is not reported by the OS.
pub fn loopback_fake_ipv4() -> NetworkInterface {
    NetworkInterface::ipv4(
        FAKE_IPV4_LOOPBACK_NAME,
        Ipv4Addr::LOCALHOST,
        Some(Ipv4Addr::new(255, 0, 0, 0)),
        Some(Ipv4Addr::new(127, 255, 255, 255)),
    )
}

/// Contiguous netmask with `prefix` leading one-bits.
pub fn ipv4_netmask_from_prefix(prefix: u8) -> Result<Ipv4Addr, NetworkError> {
    Ipv4Network::new(Ipv4Addr::UNSPECIFIED, prefix)
        .map(|network| network.mask())
        .map_err(|e| NetworkError::InvalidAddress(format!("prefix length {prefix}: {e}")))
}

/// `address | !netmask`.
pub fn ipv4_broadcast(address: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(address) | !u32::from(netmask))
}

/// Finds the netmask of `address` in an `(address, netmask)` table.
///
/// Secondary addresses are usually missing from such tables; they get
/// [`FALLBACK_IPV4_NETMASK`].
pub fn lookup_ipv4_netmask(address: Ipv4Addr, table: &[(Ipv4Addr, Ipv4Addr)]) -> Ipv4Addr {
    match table.iter().find(|(entry, _)| *entry == address) {
        Some((_, netmask)) => *netmask,
        None => {
            warn!(
                "Failed to obtain netmask for {} (secondary address?), using {}",
                address, FALLBACK_IPV4_NETMASK
            );
            FALLBACK_IPV4_NETMASK
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
