//! IP Helper API backend.
//!
//! `GetAdaptersAddresses` reports adapters, each carrying a list of unicast addresses.
//! Netmasks come either from the on-link prefix length stored with every unicast
//! address (Vista and later) or, on the legacy path, from a separate `GetIpAddrTable`
//! lookup. Only IPv4 is supported on both paths.

use std::net::{IpAddr, Ipv4Addr};

use gvnet_common::network::interface::{
    NetworkInterface, ipv4_broadcast, ipv4_netmask_from_prefix, lookup_ipv4_netmask,
};
use tracing::warn;

#[cfg(windows)]
use super::InterfaceEnumerator;

/// Where the netmask of a unicast address is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetmaskSource {
    /// `OnLinkPrefixLength` of the unicast entry.
    #[default]
    OnLinkPrefix,
    /// The IPv4 address table, matched on the raw address.
    AddressTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicastRecord {
    pub address: IpAddr,
    pub on_link_prefix: u8,
}

/// One adapter as reported by `GetAdaptersAddresses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRecord {
    pub friendly_name: String,
    pub is_up: bool,
    pub unicast: Vec<UnicastRecord>,
}

/// Netmask lookup resolved before the adapters are walked.
#[derive(Debug, Clone, Copy)]
pub enum Netmasks<'a> {
    OnLinkPrefix,
    Table(&'a [(Ipv4Addr, Ipv4Addr)]),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsEnumerator {
    netmask_source: NetmaskSource,
}

impl WindowsEnumerator {
    pub fn new(netmask_source: NetmaskSource) -> Self {
        Self { netmask_source }
    }

    pub fn netmask_source(&self) -> NetmaskSource {
        self.netmask_source
    }
}

#[cfg(windows)]
impl InterfaceEnumerator for WindowsEnumerator {
    fn enumerate(&self) -> Vec<NetworkInterface> {
        let table = match self.netmask_source {
            NetmaskSource::OnLinkPrefix => None,
            NetmaskSource::AddressTable => Some(ffi::read_address_table().unwrap_or_else(|e| {
                warn!("{e}");
                Vec::new()
            })),
        };
        let netmasks = match &table {
            Some(table) => Netmasks::Table(table),
            None => Netmasks::OnLinkPrefix,
        };

        match ffi::read_adapters() {
            Ok(adapters) => interfaces_from_adapters(adapters, netmasks),
            Err(e) => {
                warn!("Failed to enumerate network interfaces ({e})");
                Vec::new()
            }
        }
    }
}

/// Flattens operationally-up adapters into one record per IPv4 unicast address.
pub fn interfaces_from_adapters<I>(adapters: I, netmasks: Netmasks<'_>) -> Vec<NetworkInterface>
where
    I: IntoIterator<Item = AdapterRecord>,
{
    let mut interfaces: Vec<NetworkInterface> = Vec::new();

    for adapter in adapters.into_iter().filter(|adapter| adapter.is_up) {
        for unicast in &adapter.unicast {
            let address = match unicast.address {
                IpAddr::V4(address) => address,
                IpAddr::V6(address) => {
                    warn!("Skipping {address} on {}: IPv6 is not supported", adapter.friendly_name);
                    continue;
                }
            };

            let netmask = match netmasks {
                Netmasks::OnLinkPrefix => match ipv4_netmask_from_prefix(unicast.on_link_prefix) {
                    Ok(netmask) => netmask,
                    Err(e) => {
                        warn!("Skipping {address} on {}: {e}", adapter.friendly_name);
                        continue;
                    }
                },
                Netmasks::Table(table) => lookup_ipv4_netmask(address, table),
            };

            interfaces.push(NetworkInterface::ipv4(
                adapter.friendly_name.clone(),
                address,
                Some(netmask),
                Some(ipv4_broadcast(address, netmask)),
            ));
        }
    }

    interfaces
}

#[cfg(windows)]
mod ffi {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use gvnet_common::error::NetworkError;
    use windows::Win32::Foundation::{
        ERROR_BUFFER_OVERFLOW, ERROR_INSUFFICIENT_BUFFER, FALSE, NO_ERROR,
    };
    use windows::Win32::NetworkManagement::IpHelper::{
        GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
        GetAdaptersAddresses, GetIpAddrTable, IP_ADAPTER_ADDRESSES_LH, MIB_IPADDRTABLE,
    };
    use windows::Win32::NetworkManagement::Ndis::IfOperStatusUp;
    use windows::Win32::Networking::WinSock::{AF_INET, AF_INET6, SOCKADDR, SOCKADDR_IN, SOCKADDR_IN6};

    use super::{AdapterRecord, UnicastRecord};

    const INITIAL_BUFFER_SIZE: u32 = 15_000;
    const MAX_ATTEMPTS: usize = 3;

    /// Buffer of `size` bytes aligned for the IP Helper structures.
    fn aligned_buffer(size: u32) -> Vec<u64> {
        vec![0u64; (size as usize).div_ceil(size_of::<u64>()).max(1)]
    }

    pub(super) fn read_adapters() -> Result<Vec<AdapterRecord>, NetworkError> {
        let flags = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST | GAA_FLAG_SKIP_DNS_SERVER;
        let mut size = INITIAL_BUFFER_SIZE;
        let mut attempt = 0;

        let (buffer, status) = loop {
            attempt += 1;
            let mut buffer = aligned_buffer(size);
            // `size` is updated to the required length on ERROR_BUFFER_OVERFLOW
            let status = unsafe {
                GetAdaptersAddresses(
                    u32::from(AF_INET.0),
                    flags,
                    None,
                    Some(buffer.as_mut_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>()),
                    &mut size,
                )
            };
            if status != ERROR_BUFFER_OVERFLOW.0 || attempt == MAX_ATTEMPTS {
                break (buffer, status);
            }
        };

        if status != NO_ERROR.0 {
            return Err(NetworkError::Enumeration(format!(
                "GetAdaptersAddresses returned {status}"
            )));
        }

        let mut adapters: Vec<AdapterRecord> = Vec::new();
        let mut cursor = buffer.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();
        while !cursor.is_null() {
            let adapter = unsafe { &*cursor };

            let friendly_name = if adapter.FriendlyName.is_null() {
                String::new()
            } else {
                String::from_utf16_lossy(unsafe { adapter.FriendlyName.as_wide() })
            };

            let mut unicast: Vec<UnicastRecord> = Vec::new();
            let mut entry = adapter.FirstUnicastAddress;
            while !entry.is_null() {
                let record = unsafe { &*entry };
                if let Some(address) = unsafe { sockaddr_to_ip(record.Address.lpSockaddr) } {
                    unicast.push(UnicastRecord {
                        address,
                        on_link_prefix: record.OnLinkPrefixLength,
                    });
                }
                entry = record.Next;
            }

            adapters.push(AdapterRecord {
                friendly_name,
                is_up: adapter.OperStatus == IfOperStatusUp,
                unicast,
            });
            cursor = adapter.Next;
        }

        Ok(adapters)
    }

    pub(super) fn read_address_table() -> Result<Vec<(Ipv4Addr, Ipv4Addr)>, NetworkError> {
        let mut size = 0u32;
        let status = unsafe { GetIpAddrTable(None, &mut size, FALSE) };
        if status != ERROR_INSUFFICIENT_BUFFER.0 && status != NO_ERROR.0 {
            return Err(NetworkError::Enumeration(format!("GetIpAddrTable returned {status}")));
        }

        let mut buffer = aligned_buffer(size);
        let status = unsafe {
            GetIpAddrTable(
                Some(buffer.as_mut_ptr().cast::<MIB_IPADDRTABLE>()),
                &mut size,
                FALSE,
            )
        };
        if status != NO_ERROR.0 {
            return Err(NetworkError::Enumeration(format!("GetIpAddrTable returned {status}")));
        }

        let table = unsafe { &*buffer.as_ptr().cast::<MIB_IPADDRTABLE>() };
        let rows = unsafe {
            std::slice::from_raw_parts(table.table.as_ptr(), table.dwNumEntries as usize)
        };

        // both fields are in network byte order
        Ok(rows
            .iter()
            .map(|row| {
                (
                    Ipv4Addr::from(row.dwAddr.to_ne_bytes()),
                    Ipv4Addr::from(row.dwMask.to_ne_bytes()),
                )
            })
            .collect())
    }

    unsafe fn sockaddr_to_ip(sockaddr: *const SOCKADDR) -> Option<IpAddr> {
        if sockaddr.is_null() {
            return None;
        }
        let family = unsafe { (*sockaddr).sa_family };
        if family == AF_INET {
            let sin = unsafe { &*sockaddr.cast::<SOCKADDR_IN>() };
            let raw = unsafe { sin.sin_addr.S_un.S_addr };
            Some(IpAddr::V4(Ipv4Addr::from(raw.to_ne_bytes())))
        } else if family == AF_INET6 {
            let sin6 = unsafe { &*sockaddr.cast::<SOCKADDR_IN6>() };
            Some(IpAddr::V6(Ipv6Addr::from(unsafe { sin6.sin6_addr.u.Byte })))
        } else {
            None
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
