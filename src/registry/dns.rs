//! Best-effort forward DNS lookup for inventory hosts.

use std::collections::HashMap;
use std::net::{IpAddr, ToSocketAddrs};
use tracing::debug;

/// Resolves a host name to an address.
///
/// A failed lookup is `None`, never an error: an unresolvable host is still
/// listed, with an unknown address.
pub trait AddressResolver: std::fmt::Debug {
    /// Resolve `host` to its first address
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

impl<R: AddressResolver + ?Sized> AddressResolver for &R {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        (**self).resolve(host)
    }
}

/// Resolver backed by the system's name service.
///
/// Prefers an IPv4 address when the name has both families.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        let addrs: Vec<IpAddr> = match (host, 0u16).to_socket_addrs() {
            Ok(addrs) => addrs.map(|a| a.ip()).collect(),
            Err(e) => {
                debug!(host = %host, error = %e, "DNS lookup failed");
                return None;
            }
        };

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
    }
}

/// Resolver answering from a fixed table.
///
/// Useful for offline runs and tests; unknown names resolve to `None`.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, IpAddr>,
}

impl StaticResolver {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn with_entry(mut self, host: impl Into<String>, address: IpAddr) -> Self {
        self.entries.insert(host.into(), address);
        self
    }
}

impl AddressResolver for StaticResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        self.entries.get(host).copied()
    }
}
