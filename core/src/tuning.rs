//! Best-effort socket receive buffer tuning.

use std::io;
use std::net::UdpSocket;

use socket2::{SockRef, Socket};
use tracing::warn;

#[cfg(unix)]
const REMEDIATION: &str = "You might see missing packets and timeouts. \
    Most likely /proc/sys/net/core/rmem_max is too low, see the socket(7) manpage";

#[cfg(not(unix))]
const REMEDIATION: &str = "You might see missing packets and timeouts";

/// Access to the `SO_RCVBUF` option of a socket.
pub trait ReceiveBuffer {
    fn request_recv_buffer_size(&self, size: usize) -> io::Result<()>;
    fn reported_recv_buffer_size(&self) -> io::Result<usize>;
}

impl ReceiveBuffer for Socket {
    fn request_recv_buffer_size(&self, size: usize) -> io::Result<()> {
        self.set_recv_buffer_size(size)
    }

    fn reported_recv_buffer_size(&self) -> io::Result<usize> {
        self.recv_buffer_size()
    }
}

impl ReceiveBuffer for UdpSocket {
    fn request_recv_buffer_size(&self, size: usize) -> io::Result<()> {
        SockRef::from(self).set_recv_buffer_size(size)
    }

    fn reported_recv_buffer_size(&self) -> io::Result<usize> {
        SockRef::from(self).recv_buffer_size()
    }
}

/// Requests a receive buffer of `size` bytes and checks the kernel honoured it.
///
/// Returns `false` (after logging a warning) when the option could not be set or read
/// back, or when the kernel silently capped it below `size`. Callers may carry on with
/// the smaller buffer.
pub fn set_receive_buffer_size<S>(socket: &S, size: usize) -> bool
where
    S: ReceiveBuffer + ?Sized,
{
    if let Err(e) = socket.request_recv_buffer_size(size) {
        warn!("Setting socket buffer to {size} bytes failed ({e})");
        return false;
    }

    let reported = match socket.reported_recv_buffer_size() {
        Ok(reported) => reported,
        Err(e) => {
            warn!("Read of socket buffer size (SO_RCVBUF) failed ({e})");
            return false;
        }
    };

    if reported < size {
        warn!(
            "Unexpected socket buffer size (SO_RCVBUF): actual {reported} < expected {size} bytes. {REMEDIATION}"
        );
        return false;
    }

    true
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
