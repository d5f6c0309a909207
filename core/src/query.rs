//! Interface lookups by name or by address.
//!
//! Every lookup enumerates afresh; the matching record is moved out of the list and
//! the rest is dropped with it.

use std::net::IpAddr;

use gvnet_common::network::interface::NetworkInterface;
use tracing::debug;

use crate::enumerator::{InterfaceEnumerator, PlatformEnumerator};

#[derive(Debug, Clone, Default)]
pub struct InterfaceQuery<E = PlatformEnumerator> {
    enumerator: E,
}

impl<E: InterfaceEnumerator> InterfaceQuery<E> {
    pub fn new(enumerator: E) -> Self {
        Self { enumerator }
    }

    /// First interface whose name equals `name` byte for byte.
    pub fn find_by_name(&self, name: &str) -> Option<NetworkInterface> {
        self.enumerator
            .enumerate()
            .into_iter()
            .find(|iface| iface.name() == name)
    }

    /// First interface carrying the address written in `text`.
    ///
    /// `text` must be a numeric IPv4 or IPv6 literal. Host names are rejected without
    /// any resolution attempt.
    pub fn find_by_address(&self, text: &str) -> Option<NetworkInterface> {
        let Ok(address) = text.parse::<IpAddr>() else {
            debug!("{text:?} is not an IP address literal");
            return None;
        };
        self.find_by_ip(address)
    }

    pub fn find_by_ip(&self, address: IpAddr) -> Option<NetworkInterface> {
        self.enumerator
            .enumerate()
            .into_iter()
            .find(|iface| iface.address() == address)
    }
}

pub fn find_interface_by_name(name: &str) -> Option<NetworkInterface> {
    InterfaceQuery::<PlatformEnumerator>::default().find_by_name(name)
}

pub fn find_interface_by_address(text: &str) -> Option<NetworkInterface> {
    InterfaceQuery::<PlatformEnumerator>::default().find_by_address(text)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
