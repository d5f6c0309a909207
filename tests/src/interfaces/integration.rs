#![cfg(test)]
use std::net::IpAddr;

use gvnet_common::network::interface::{self, FAKE_IPV4_LOOPBACK_NAME};
use gvnet_core::allocator::PortAllocator;
use gvnet_core::enumerator::{self, loopback_fake_ipv4};
use gvnet_core::query;

use crate::utils::udp_socket;

#[test]
fn enumerated_interfaces_can_be_looked_up_again() {
    for iface in enumerator::enumerate_interfaces() {
        let by_name = query::find_interface_by_name(iface.name());
        assert!(by_name.is_some(), "{} not found by name", iface.name());

        let by_address = query::find_interface_by_address(&iface.address().to_string())
            .expect("enumerated address should be found again");
        assert_eq!(by_address.address(), iface.address());
    }
}

#[test]
fn loopback_interfaces_use_loopback_addresses() {
    for iface in enumerator::enumerate_interfaces().iter().filter(|i| i.is_loopback()) {
        match iface.address() {
            IpAddr::V4(v4) => assert!(v4.is_loopback()),
            IpAddr::V6(v6) => assert!(v6.is_loopback()),
        }
    }
}

#[test]
fn host_names_are_never_resolved() {
    assert!(query::find_interface_by_address("localhost").is_none());
    assert!(query::find_interface_by_address("example.com").is_none());
    assert!(query::find_interface_by_address("not-an-ip").is_none());
}

#[test]
fn fake_loopback_is_bindable() -> anyhow::Result<()> {
    let fake = loopback_fake_ipv4();
    assert_eq!(fake.name(), FAKE_IPV4_LOOPBACK_NAME);
    assert!(interface::is_loopback(Some(&fake)));

    let socket = udp_socket();
    let bound = PortAllocator::new().bind_with_range(&socket, fake.address(), 0, false)?;
    assert_eq!(bound.ip(), fake.address());
    Ok(())
}
