use std::net::IpAddr;

use colored::*;
use gvnet_common::network::interface::NetworkInterface;

use crate::terminal::{colors, print};

fn address_value(address: IpAddr) -> ColoredString {
    match address {
        IpAddr::V4(v4) => v4.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(v6) => v6.to_string().color(colors::IPV6_ADDR),
    }
}

pub fn to_key_value_pair(interface: &NetworkInterface) -> Vec<(String, ColoredString)> {
    let mut pairs: Vec<(String, ColoredString)> = Vec::new();

    let address: ColoredString = match interface.ipv4_network() {
        Some(network) => {
            let ip: ColoredString = network.ip().to_string().color(colors::IPV4_ADDR);
            let prefix: ColoredString = network.prefix().to_string().color(colors::IPV4_PREFIX);
            format!("{ip}/{prefix}").color(colors::SEPARATOR)
        }
        None => address_value(interface.address()),
    };
    let key = if interface.address().is_ipv4() { "IPv4" } else { "IPv6" };
    pairs.push((key.to_string(), address));

    if let Some(netmask) = interface.netmask() {
        pairs.push(("Netmask".to_string(), address_value(netmask)));
    }
    if let Some(broadcast) = interface.broadcast_address() {
        pairs.push(("Broadcast".to_string(), address_value(broadcast)));
    }
    if interface.is_loopback() {
        pairs.push(("Scope".to_string(), "loopback".color(colors::ACCENT)));
    }

    pairs
}

pub fn print_interface(interface: &NetworkInterface, idx: usize) {
    print::tree_head(idx, interface.name());
    print::as_tree_one_level(to_key_value_pair(interface));
}
