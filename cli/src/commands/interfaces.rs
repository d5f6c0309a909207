use gvnet_common::network::interface::NetworkInterface;
use gvnet_core::enumerator::{self, loopback_fake_ipv4};

use crate::terminal::{network_fmt, print};

pub fn interfaces(fake_loopback: bool) {
    let mut interfaces: Vec<NetworkInterface> = enumerator::enumerate_interfaces();
    if fake_loopback {
        interfaces.push(loopback_fake_ipv4());
    }

    if interfaces.is_empty() {
        print::no_results("usable interfaces");
        return;
    }

    for (idx, interface) in interfaces.iter().enumerate() {
        network_fmt::print_interface(interface, idx);
    }
    print::print_status(format!("{} interface address(es)", interfaces.len()));
}
