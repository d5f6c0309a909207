//! Shared model for the gvnet workspace.
//!
//! Holds the normalized [`network::interface::NetworkInterface`] record, the
//! [`network::range::PortRange`] configuration value and the [`error::NetworkError`]
//! domain used by every other crate.

pub mod config;
pub mod error;
pub mod network;
