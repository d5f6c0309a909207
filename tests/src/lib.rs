//! Cross-crate tests against the live interface table and real loopback sockets.

#[cfg(test)]
mod allocation;
#[cfg(test)]
mod interfaces;
#[cfg(test)]
mod utils;
