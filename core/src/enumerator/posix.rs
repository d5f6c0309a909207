//! `getifaddrs(3)` backend.
//!
//! The OS returns one record per (interface, address) pair as a linked list. The list is
//! owned by the `nix` iterator and freed when it drops, whichever way the walk ends.

use std::net::{IpAddr, Ipv4Addr};

use gvnet_common::network::interface::NetworkInterface;

#[cfg(unix)]
use super::InterfaceEnumerator;

/// One raw `ifaddrs` entry, already decoded from its `sockaddr` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfAddrRecord {
    pub name: String,
    pub is_up: bool,
    pub address: Option<IpAddr>,
    pub netmask: Option<IpAddr>,
    pub broadcast: Option<IpAddr>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PosixEnumerator;

#[cfg(unix)]
impl InterfaceEnumerator for PosixEnumerator {
    fn enumerate(&self) -> Vec<NetworkInterface> {
        match sys::read_ifaddrs() {
            Ok(records) => interfaces_from_records(records),
            Err(e) => {
                tracing::warn!("Failed to enumerate network interfaces: {e}");
                Vec::new()
            }
        }
    }
}

/// Keeps the records that are up and carry an IPv4 address.
///
/// Interfaces without a broadcast address (loopback, point-to-point links) get their
/// own address in that slot so self-tests over `127.0.0.1` still have a target.
pub fn interfaces_from_records<I>(records: I) -> Vec<NetworkInterface>
where
    I: IntoIterator<Item = IfAddrRecord>,
{
    records
        .into_iter()
        .filter(|record| record.is_up)
        .filter_map(|record| {
            let Some(IpAddr::V4(address)) = record.address else {
                return None;
            };
            let netmask: Option<Ipv4Addr> = match record.netmask {
                Some(IpAddr::V4(netmask)) => Some(netmask),
                _ => None,
            };
            let broadcast: Ipv4Addr = match record.broadcast {
                Some(IpAddr::V4(broadcast)) => broadcast,
                _ => address,
            };
            Some(NetworkInterface::ipv4(
                record.name,
                address,
                netmask,
                Some(broadcast),
            ))
        })
        .collect()
}

#[cfg(unix)]
mod sys {
    use std::net::{IpAddr, SocketAddrV4, SocketAddrV6};

    use gvnet_common::error::NetworkError;
    use nix::ifaddrs::{self, InterfaceAddress};
    use nix::net::if_::InterfaceFlags;
    use nix::sys::socket::{SockaddrLike, SockaddrStorage};

    use super::IfAddrRecord;

    pub(super) fn read_ifaddrs() -> Result<Vec<IfAddrRecord>, NetworkError> {
        let list = ifaddrs::getifaddrs()
            .map_err(|errno| NetworkError::Enumeration(format!("getifaddrs: {errno}")))?;
        Ok(list.map(to_record).collect())
    }

    fn to_record(entry: InterfaceAddress) -> IfAddrRecord {
        IfAddrRecord {
            is_up: entry.flags.contains(InterfaceFlags::IFF_UP),
            address: entry.address.as_ref().and_then(to_ip),
            netmask: entry.netmask.as_ref().and_then(to_ip),
            broadcast: entry.broadcast.as_ref().and_then(to_ip),
            name: entry.interface_name,
        }
    }

    fn to_ip(storage: &SockaddrStorage) -> Option<IpAddr> {
        // BSD reports "no broadcast" as a zero-length sockaddr
        if storage.len() == 0 {
            return None;
        }
        if let Some(sin) = storage.as_sockaddr_in() {
            return Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()));
        }
        storage
            .as_sockaddr_in6()
            .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
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
