//! Per-host detail record for the tagbox inventory.
//!
//! A [`HostRecord`] is what `--host <name>` prints: the resolved address plus
//! every tag key the registry reported, each with its de-duplicated values.
//! On the wire it is a single flat object:
//!
//! ```json
//! { "ip": ["10.0.0.5"], "cop": ["example"], "service": ["web", "api"] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

use super::OrderedSet;

/// Address recorded when forward DNS resolution fails
pub const UNKNOWN_IP: &str = "Unknown";

/// Key under which the resolved address is stored
pub const IP_KEY: &str = "ip";

/// Address and tag variables for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Resolved address, or [`UNKNOWN_IP`]
    #[serde(default, skip_serializing_if = "OrderedSet::is_empty")]
    pub ip: OrderedSet<String>,

    /// Tag key to values, keys kept sorted for stable output
    #[serde(flatten)]
    pub tags: BTreeMap<String, OrderedSet<String>>,
}

impl HostRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record carrying the result of a DNS lookup
    pub fn with_address(address: Option<IpAddr>) -> Self {
        let mut record = Self::new();
        record.set_address(address);
        record
    }

    /// Record the result of a DNS lookup, falling back to [`UNKNOWN_IP`]
    pub fn set_address(&mut self, address: Option<IpAddr>) {
        let ip = address.map_or_else(|| UNKNOWN_IP.to_string(), |a| a.to_string());
        self.ip.push(ip);
    }

    /// Append a tag value unless already present.
    ///
    /// A tag named `ip` shares the address slot, the same way a single
    /// key/value host document would merge them.
    pub fn push_tag(&mut self, key: &str, value: &str) -> bool {
        if key == IP_KEY {
            return self.ip.push(value.to_string());
        }
        self.tags
            .entry(key.to_string())
            .or_default()
            .push(value.to_string())
    }

    /// Values recorded for a tag key
    pub fn tag(&self, key: &str) -> Option<&OrderedSet<String>> {
        if key == IP_KEY {
            return Some(&self.ip);
        }
        self.tags.get(key)
    }

    /// True when the record carries no address and no tags
    pub fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.tags.is_empty()
    }
}
