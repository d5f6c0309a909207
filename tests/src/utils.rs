use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub fn udp_socket() -> Socket {
    Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).expect("UDP socket")
}

/// Binds a plain UDP socket to `127.0.0.1:port`, `None` if the port is taken.
pub fn occupy(port: u16) -> Option<Socket> {
    let socket = udp_socket();
    socket
        .bind(&SocketAddr::new(LOCALHOST, port).into())
        .ok()
        .map(|_| socket)
}
