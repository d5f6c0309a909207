//! The **abstraction** over the operating system's interface table.
//!
//! Each platform walks a structurally different API (`getifaddrs` on POSIX systems,
//! `GetAdaptersAddresses` on Windows). Both backends reduce their raw records to the
//! same [`NetworkInterface`] model, keep only interfaces that are up and carry an IPv4
//! address, and preserve the order the OS reports them in.
//!
//! Callers should depend on [`InterfaceEnumerator`] rather than a concrete backend so
//! lookups can run against a fixed table in tests.

use gvnet_common::network::interface::NetworkInterface;

pub mod posix;
pub mod windows;

pub use gvnet_common::network::interface::loopback_fake_ipv4;

/// Produces the set of usable interfaces.
pub trait InterfaceEnumerator {
    /// Lists interfaces that are up and have a supported address.
    ///
    /// A platform failure yields an empty list (and a warning), never an error.
    fn enumerate(&self) -> Vec<NetworkInterface>;
}

/// Backend for the platform this crate was built for.
#[cfg(unix)]
pub type PlatformEnumerator = posix::PosixEnumerator;

/// Backend for the platform this crate was built for.
#[cfg(windows)]
pub type PlatformEnumerator = windows::WindowsEnumerator;

/// A fixed interface table.
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    interfaces: Vec<NetworkInterface>,
}

impl StaticEnumerator {
    pub fn new(interfaces: Vec<NetworkInterface>) -> Self {
        Self { interfaces }
    }
}

impl InterfaceEnumerator for StaticEnumerator {
    fn enumerate(&self) -> Vec<NetworkInterface> {
        self.interfaces.clone()
    }
}

impl<E: InterfaceEnumerator + ?Sized> InterfaceEnumerator for &E {
    fn enumerate(&self) -> Vec<NetworkInterface> {
        (**self).enumerate()
    }
}

/// Lists the usable interfaces of this host.
pub fn enumerate_interfaces() -> Vec<NetworkInterface> {
    PlatformEnumerator::default().enumerate()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn static_enumerator_keeps_order() {
        let table: Vec<NetworkInterface> = vec![
            NetworkInterface::ipv4("eth0", Ipv4Addr::new(192, 168, 1, 2), None, None),
            loopback_fake_ipv4(),
        ];
        let enumerator: StaticEnumerator = StaticEnumerator::new(table.clone());
        assert_eq!(enumerator.enumerate(), table);
        assert_eq!((&enumerator).enumerate(), table);
    }

    #[test]
    fn live_interfaces_hold_ipv4_invariants() {
        for iface in enumerate_interfaces() {
            assert!(iface.address().is_ipv4(), "{iface} is not IPv4");
            for other in [iface.netmask(), iface.broadcast_address()].into_iter().flatten() {
                assert!(matches!(other, IpAddr::V4(_)), "{iface} mixes families");
            }
        }
    }
}
