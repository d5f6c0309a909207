use crate::network::range::PortRange;

/// Receive buffer requested by `gvnet rcvbuf` when no size is given.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ports the allocator may hand out when the caller lets it choose.
    ///
    /// `0-0` leaves the choice to the operating system.
    pub port_range: PortRange,
    /// Receive buffer to request on freshly bound sockets, if any.
    pub recv_buffer_size: Option<usize>,
    /// Sets `SO_REUSEADDR` before binding.
    pub allow_reuse: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_range: PortRange::UNRESTRICTED,
            recv_buffer_size: None,
            allow_reuse: false,
        }
    }
}
