//! Contention-aware port allocation.
//!
//! A [`PortAllocator`] holds a port range and a rotating cursor behind one lock. When a
//! caller asks for port 0 while a range is configured, candidates are tried in
//! round-robin order starting just after the last port handed out, skipping ports that
//! are already in use, until one binds or the whole range has been tried once.
//!
//! Binds run entirely under the lock, so every allocation through the same allocator is
//! serialized. [`PortAllocator::global`] is the process-wide instance behind the free
//! functions of this module.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gvnet_common::config::Config;
use gvnet_common::error::NetworkError;
use gvnet_common::network::range::PortRange;
use socket2::{SockAddr, Socket};
use tracing::{debug, warn};

/// Something that can be bound to a local address.
pub trait BindSocket {
    /// Binds to `address` and returns the address actually bound (the OS fills in port 0).
    fn bind_to(&self, address: SocketAddr, allow_reuse: bool) -> io::Result<SocketAddr>;
}

impl BindSocket for Socket {
    fn bind_to(&self, address: SocketAddr, allow_reuse: bool) -> io::Result<SocketAddr> {
        apply_reuse_options(self, allow_reuse);
        self.bind(&SockAddr::from(address))?;
        Ok(self.local_addr()?.as_socket().unwrap_or(address))
    }
}

/// Sets the address reuse options before a bind. Failures are logged and ignored.
///
/// Windows never gets `SO_REUSEADDR`, it would let the bind succeed on a port another
/// socket holds. Datagram sockets on unix also get `SO_REUSEPORT`.
pub fn apply_reuse_options(socket: &Socket, allow_reuse: bool) {
    #[cfg(not(windows))]
    {
        if let Err(e) = socket.set_reuse_address(allow_reuse) {
            debug!("Setting SO_REUSEADDR to {allow_reuse} failed ({e})");
        }
    }

    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    {
        let is_datagram: bool =
            matches!(socket.r#type(), Ok(kind) if kind == socket2::Type::DGRAM);
        let reuse_port: bool = allow_reuse && is_datagram;
        if let Err(e) = socket.set_reuse_port(reuse_port) {
            debug!("Setting SO_REUSEPORT to {reuse_port} failed ({e})");
        }
    }

    #[cfg(windows)]
    {
        let _ = (socket, allow_reuse);
    }
}

/// Configured range plus the rotating cursor.
///
/// `last_offset` stays within `[0, maximum - minimum]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRangeState {
    range: PortRange,
    last_offset: u32,
}

impl PortRangeState {
    pub const fn unrestricted() -> Self {
        Self {
            range: PortRange::UNRESTRICTED,
            last_offset: 0,
        }
    }

    /// Fresh state whose first candidate is `range.minimum()`.
    pub fn new(range: PortRange) -> Self {
        Self {
            range,
            last_offset: range.span() - 1,
        }
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn last_offset(&self) -> u32 {
        self.last_offset
    }

    /// Advances the cursor and returns the port it now points at.
    pub fn next_candidate(&mut self) -> u16 {
        self.last_offset = (self.last_offset + 1) % self.range.span();
        // last_offset <= maximum - minimum, so the sum stays within u16
        self.range.minimum() + self.last_offset as u16
    }
}

impl Default for PortRangeState {
    fn default() -> Self {
        Self::unrestricted()
    }
}

#[derive(Debug)]
pub struct PortAllocator {
    state: Mutex<PortRangeState>,
}

static GLOBAL_ALLOCATOR: PortAllocator = PortAllocator::new();

impl PortAllocator {
    /// An allocator without range restriction.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(PortRangeState::unrestricted()),
        }
    }

    pub fn with_range(range: PortRange) -> Self {
        Self {
            state: Mutex::new(PortRangeState::new(range)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_range(config.port_range)
    }

    /// The process-wide allocator.
    pub fn global() -> &'static PortAllocator {
        &GLOBAL_ALLOCATOR
    }

    fn lock(&self) -> MutexGuard<'_, PortRangeState> {
        // every write leaves the state consistent, a panicking holder cannot corrupt it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PortRangeState {
        *self.lock()
    }

    pub fn range(&self) -> PortRange {
        self.lock().range
    }

    /// Restricts allocation to `[minimum, maximum]`; `0-0` lifts the restriction.
    ///
    /// Returns `false` and leaves the allocator untouched when `minimum > maximum`.
    pub fn set_range(&self, minimum: u16, maximum: u16) -> bool {
        match PortRange::new(minimum, maximum) {
            Ok(range) => {
                self.apply(range);
                true
            }
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }

    /// Same as [`PortAllocator::set_range`] with a `<min>-<max>` string.
    pub fn set_range_from_str(&self, text: &str) -> bool {
        match text.parse::<PortRange>() {
            Ok(range) => {
                self.apply(range);
                true
            }
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }

    fn apply(&self, range: PortRange) {
        *self.lock() = PortRangeState::new(range);
        debug!("Port range set to {}", range);
    }

    /// Binds `socket` to `address`, picking the port from the configured range when
    /// `requested_port` is 0.
    ///
    /// A non-zero `requested_port`, or an unrestricted allocator, results in exactly one
    /// bind attempt. Otherwise every port of the range is tried at most once; ports in
    /// use are skipped, any other bind error stops the search. Port 0 is never bound
    /// from a range, so the result always lies within it.
    pub fn bind_with_range<S>(
        &self,
        socket: &S,
        address: IpAddr,
        requested_port: u16,
        allow_reuse: bool,
    ) -> Result<SocketAddr, NetworkError>
    where
        S: BindSocket + ?Sized,
    {
        let mut state: MutexGuard<'_, PortRangeState> = self.lock();
        let range: PortRange = state.range;

        if requested_port != 0 || range.is_unrestricted() {
            let target: SocketAddr = SocketAddr::new(address, requested_port);
            return socket
                .bind_to(target, allow_reuse)
                .map_err(|source| NetworkError::Bind {
                    address: target,
                    source,
                });
        }

        for _ in 0..range.span() {
            let port: u16 = state.next_candidate();
            if port == 0 {
                // binding port 0 would let the OS pick a port outside the range
                continue;
            }
            debug!(
                "Try port {} in range [{}..{}]",
                port,
                range.minimum(),
                range.maximum()
            );

            let target: SocketAddr = SocketAddr::new(address, port);
            match socket.bind_to(target, allow_reuse) {
                Ok(bound) => return Ok(bound),
                Err(e) if e.kind() == io::ErrorKind::AddrInUse => continue,
                Err(source) => {
                    return Err(NetworkError::Bind {
                        address: target,
                        source,
                    });
                }
            }
        }

        warn!(
            "No more port available in range [{}..{}]",
            range.minimum(),
            range.maximum()
        );
        Err(NetworkError::PortExhaustion {
            min: range.minimum(),
            max: range.maximum(),
        })
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the range of the process-wide allocator.
pub fn set_port_range(minimum: u16, maximum: u16) -> bool {
    PortAllocator::global().set_range(minimum, maximum)
}

/// Sets the range of the process-wide allocator from `<min>-<max>`.
pub fn set_port_range_from_string(range: &str) -> bool {
    PortAllocator::global().set_range_from_str(range)
}

/// Binds through the process-wide allocator.
pub fn bind_with_range<S>(
    socket: &S,
    address: IpAddr,
    requested_port: u16,
    allow_reuse: bool,
) -> Result<SocketAddr, NetworkError>
where
    S: BindSocket + ?Sized,
{
    PortAllocator::global().bind_with_range(socket, address, requested_port, allow_reuse)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
