pub mod bind;
pub mod find;
pub mod interfaces;
pub mod rcvbuf;

use std::net::{IpAddr, Ipv4Addr};

use clap::{Parser, Subcommand};
use gvnet_common::config::Config;
use gvnet_common::network::range::PortRange;

#[derive(Parser)]
#[command(name = "gvnet")]
#[command(about = "Network interface inventory and port range allocation for camera hosts.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Ports the allocator may choose from, as <min>-<max> (0-0 disables the restriction)
    #[arg(long, global = true, env = "GVNET_PORT_RANGE", default_value_t = PortRange::UNRESTRICTED)]
    pub port_range: PortRange,

    /// Receive buffer to request, in bytes (every socket of `bind`, default size of `rcvbuf`)
    #[arg(long, global = true)]
    pub recv_buffer: Option<usize>,

    /// Allow address reuse when binding (SO_REUSEADDR, plus SO_REUSEPORT on unix)
    #[arg(long, global = true)]
    pub allow_reuse: bool,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List usable network interfaces
    #[command(alias = "i")]
    Interfaces {
        /// Append the synthetic 127.0.0.1/8 interface
        #[arg(long)]
        fake_loopback: bool,
    },
    /// Look up one interface by name or address
    #[command(alias = "f")]
    Find {
        /// Interface name, matched exactly
        #[arg(long, conflicts_with = "address", required_unless_present = "address")]
        name: Option<String>,
        /// Numeric IPv4 or IPv6 address
        #[arg(long)]
        address: Option<String>,
    },
    /// Bind UDP sockets through the port allocator
    #[command(alias = "b")]
    Bind {
        /// Local address to bind to
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        address: IpAddr,
        /// Explicit port; 0 lets the allocator choose
        #[arg(long, default_value_t = 0)]
        port: u16,
        /// Number of sockets to bind, all kept open until the end
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Request a receive buffer on a UDP socket and verify it
    #[command(alias = "r")]
    Rcvbuf {
        /// Requested size in bytes, defaults to --recv-buffer or 8 MiB
        size: Option<usize>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            port_range: self.port_range,
            recv_buffer_size: self.recv_buffer,
            allow_reuse: self.allow_reuse,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
