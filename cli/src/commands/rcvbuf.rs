use std::net::UdpSocket;

use anyhow::{Context, bail};
use gvnet_common::config::{Config, DEFAULT_RECV_BUFFER_SIZE};
use gvnet_core::tuning::{self, ReceiveBuffer};

use crate::terminal::print;

/// Size given on the command, else the global `--recv-buffer`, else the default.
pub fn requested_size(size: Option<usize>, cfg: &Config) -> usize {
    size.or(cfg.recv_buffer_size).unwrap_or(DEFAULT_RECV_BUFFER_SIZE)
}

pub fn rcvbuf(size: Option<usize>, cfg: &Config) -> anyhow::Result<()> {
    let size: usize = requested_size(size, cfg);
    let socket = UdpSocket::bind("0.0.0.0:0").context("binding UDP socket")?;

    let honoured = tuning::set_receive_buffer_size(&socket, size);
    let reported = socket
        .reported_recv_buffer_size()
        .context("reading SO_RCVBUF")?;
    print::print_status(format!("requested {size} bytes, kernel reports {reported}"));

    if !honoured {
        bail!("receive buffer of {size} bytes not available");
    }
    Ok(())
}
