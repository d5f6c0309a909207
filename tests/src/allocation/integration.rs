#![cfg(test)]
use std::collections::HashSet;
use std::io;

use gvnet_common::error::NetworkError;
use gvnet_common::network::range::PortRange;
use gvnet_core::allocator::{self, PortAllocator};
use gvnet_core::tuning;
use socket2::Socket;

use crate::utils::{LOCALHOST, occupy, udp_socket};

/// Every bound socket gets its own port from the range.
#[test]
fn restricted_range_hands_out_distinct_ports() -> anyhow::Result<()> {
    let range = PortRange::new(38100, 38131)?;
    let allocator = PortAllocator::with_range(range);

    let mut sockets: Vec<Socket> = Vec::new();
    let mut ports: HashSet<u16> = HashSet::new();
    for _ in 0..8 {
        let socket = udp_socket();
        let bound = allocator.bind_with_range(&socket, LOCALHOST, 0, false)?;
        assert!(range.contains(bound.port()), "{bound} outside {range}");
        assert_eq!(bound.ip(), LOCALHOST);
        ports.insert(bound.port());
        sockets.push(socket);
    }

    assert_eq!(ports.len(), sockets.len());
    Ok(())
}

#[test]
fn occupied_range_is_exhausted() -> anyhow::Result<()> {
    let range = PortRange::new(38200, 38203)?;
    // ports someone else already holds count as occupied too
    let _holders: Vec<Socket> = range.ports().filter_map(occupy).collect();

    let allocator = PortAllocator::with_range(range);
    let err = allocator
        .bind_with_range(&udp_socket(), LOCALHOST, 0, false)
        .unwrap_err();

    assert!(
        matches!(err, NetworkError::PortExhaustion { min: 38200, max: 38203 }),
        "unexpected error: {err:?}"
    );
    Ok(())
}

#[test]
fn freed_port_is_reused_after_exhaustion() -> anyhow::Result<()> {
    let range = PortRange::new(38250, 38252)?;
    let mut holders: Vec<Socket> = range.ports().filter_map(occupy).collect();
    let allocator = PortAllocator::with_range(range);
    assert!(allocator.bind_with_range(&udp_socket(), LOCALHOST, 0, false).is_err());

    let Some(released) = holders.pop() else {
        return Ok(());
    };
    let released_port = released.local_addr()?.as_socket().map(|a| a.port());
    drop(released);

    let bound = allocator.bind_with_range(&udp_socket(), LOCALHOST, 0, false)?;
    assert_eq!(Some(bound.port()), released_port);
    Ok(())
}

/// A range starting at 0 never hands out an OS-chosen port from outside it.
#[test]
fn range_starting_at_zero_stays_in_range() -> anyhow::Result<()> {
    let range = PortRange::new(0, 10)?;
    let allocator = PortAllocator::with_range(range);
    let socket = udp_socket();

    // low ports may need privileges, an error is fine as long as nothing escapes
    match allocator.bind_with_range(&socket, LOCALHOST, 0, false) {
        Ok(bound) => {
            assert_ne!(bound.port(), 0);
            assert!(range.contains(bound.port()), "{bound} outside {range}");
        }
        Err(err) => assert!(
            !matches!(err, NetworkError::Bind { address, .. } if address.port() == 0),
            "port 0 was tried: {err:?}"
        ),
    }
    Ok(())
}

#[test]
fn unrestricted_allocator_lets_the_os_choose() -> anyhow::Result<()> {
    let allocator = PortAllocator::new();
    let socket = udp_socket();

    let bound = allocator.bind_with_range(&socket, LOCALHOST, 0, false)?;
    assert_ne!(bound.port(), 0);
    assert_eq!(socket.local_addr()?.as_socket(), Some(bound));
    Ok(())
}

#[test]
fn explicit_port_in_use_is_reported() -> anyhow::Result<()> {
    let holder = udp_socket();
    holder.bind(&std::net::SocketAddr::new(LOCALHOST, 0).into())?;
    let port = holder.local_addr()?.as_socket().map(|a| a.port()).unwrap_or_default();

    let allocator = PortAllocator::with_range(PortRange::new(38300, 38309)?);
    let err = allocator
        .bind_with_range(&udp_socket(), LOCALHOST, port, false)
        .unwrap_err();

    assert!(err.is_address_in_use(), "unexpected error: {err:?}");
    match err {
        NetworkError::Bind { address, source } => {
            assert_eq!(address.port(), port);
            assert_eq!(source.kind(), io::ErrorKind::AddrInUse);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn process_wide_allocator_follows_configuration() -> anyhow::Result<()> {
    assert!(allocator::set_port_range_from_string("38400-38409"));
    assert!(!allocator::set_port_range(9, 1));

    let socket = udp_socket();
    let bound = allocator::bind_with_range(&socket, LOCALHOST, 0, false)?;
    assert!((38400..=38409).contains(&bound.port()));

    assert!(allocator::set_port_range(0, 0));
    let bound = allocator::bind_with_range(&udp_socket(), LOCALHOST, 0, false)?;
    assert_ne!(bound.port(), 0);
    Ok(())
}

#[test]
fn allocated_socket_accepts_buffer_tuning() -> anyhow::Result<()> {
    let allocator = PortAllocator::with_range(PortRange::new(38500, 38509)?);
    let socket = udp_socket();
    allocator.bind_with_range(&socket, LOCALHOST, 0, true)?;

    assert!(tuning::set_receive_buffer_size(&socket, 4096));
    Ok(())
}
