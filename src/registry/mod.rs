//! Remote registry access.
//!
//! The registry exposes two read endpoints: hosts matching a selector, and tag
//! strings for a batch of hosts. [`RegistryClient`] is the seam the refresh
//! phases talk to; [`HttpRegistryClient`] is the production implementation.
//! [`AddressResolver`] covers the other outbound lookup the refresh makes,
//! forward DNS for each host.

pub mod client;
pub mod dns;

pub use client::{HttpRegistryClient, RegistryEndpoints};
pub use dns::{AddressResolver, StaticResolver, SystemResolver};

use indexmap::IndexMap;
use std::fmt;

use crate::error::Result;

/// Separator used to join host names into one tag request
pub const HOST_SEPARATOR: &str = "_";

/// Host name to raw tag string, in the order the registry returned them
pub type TagList = IndexMap<String, String>;

/// Read access to the host/tag registry.
///
/// Implementations perform exactly one request per call and never retry.
pub trait RegistryClient: fmt::Debug {
    /// Host names matching `selector`.
    ///
    /// Fails with `Transport`, `Response` (non-200) or `Decode` (no `hosts`
    /// array in the payload).
    fn fetch_hosts_for_selector(&self, selector: &str) -> Result<Vec<String>>;

    /// Raw tag strings for `hosts`.
    ///
    /// Fails with `Transport`, `Response` (not 200/304), `Query` (non-zero
    /// `succ` or an empty `tag_list`) or `Decode`.
    fn fetch_tags_for_batch(&self, hosts: &[&str]) -> Result<TagList>;
}

impl<C: RegistryClient + ?Sized> RegistryClient for &C {
    fn fetch_hosts_for_selector(&self, selector: &str) -> Result<Vec<String>> {
        (**self).fetch_hosts_for_selector(selector)
    }

    fn fetch_tags_for_batch(&self, hosts: &[&str]) -> Result<TagList> {
        (**self).fetch_tags_for_batch(hosts)
    }
}
