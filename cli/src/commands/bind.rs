use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, ensure};
use colored::*;
use gvnet_common::config::Config;
use gvnet_core::{allocator, tuning};
use socket2::{Domain, Protocol, Socket, Type};

use crate::terminal::{colors, print};

pub fn bind(address: IpAddr, port: u16, count: usize, cfg: &Config) -> anyhow::Result<()> {
    let range = cfg.port_range;
    ensure!(
        allocator::set_port_range(range.minimum(), range.maximum()),
        "rejected port range {range}"
    );

    if range.is_unrestricted() {
        print::print_status("no port range, the OS picks free ports");
    } else {
        print::print_status(format!(
            "allocating from {} ({} ports)",
            range.to_string().color(colors::PORT),
            range.span()
        ));
    }

    let mut sockets: Vec<Socket> = Vec::with_capacity(count);
    for _ in 0..count {
        let domain = Domain::for_address(SocketAddr::new(address, 0));
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
            .context("creating UDP socket")?;

        let bound = allocator::bind_with_range(&socket, address, port, cfg.allow_reuse)
            .with_context(|| format!("binding socket {} of {count}", sockets.len() + 1))?;

        let mut line = format!("bound {}", bound.to_string().color(colors::PORT));
        if let Some(size) = cfg.recv_buffer_size {
            let verdict = if tuning::set_receive_buffer_size(&socket, size) {
                "ok".green()
            } else {
                "capped".yellow()
            };
            line.push_str(&format!(" rcvbuf {size} {verdict}"));
        }
        print::print_status(line);

        sockets.push(socket);
    }

    print::end_of_program();
    Ok(())
}
