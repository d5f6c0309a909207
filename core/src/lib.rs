//! Network interface inventory and contention-aware port allocation.
//!
//! * [`enumerator`] lists the usable interfaces of the host.
//! * [`query`] finds one interface by name or address.
//! * [`allocator`] binds sockets inside a configured port range.
//! * [`tuning`] applies and verifies socket receive buffers.

pub mod allocator;
pub mod enumerator;
pub mod query;
pub mod tuning;
