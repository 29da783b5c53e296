//! Group definition for the tagbox inventory.
//!
//! A group is a name plus the ordered list of hosts that belong to it. Group
//! names come from three places: the literal `all`, a single `key.value` tag,
//! or a full `_`-joined tag group exactly as the registry returned it.

use serde::{Deserialize, Serialize};

use super::OrderedSet;

/// Name of the group every resolved host belongs to
pub const ALL_GROUP: &str = "all";

/// Hosts belonging to one inventory group, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    hosts: OrderedSet<String>,
}

impl Group {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host unless it is already a member.
    ///
    /// Returns `true` if the host was new to this group.
    pub fn add_host(&mut self, host: impl Into<String>) -> bool {
        self.hosts.push(host.into())
    }

    /// Check if a host belongs to this group
    pub fn has_host(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Member host names in first-seen order
    pub fn hosts(&self) -> &OrderedSet<String> {
        &self.hosts
    }

    /// Number of member hosts
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

impl<S: Into<String>> FromIterator<S> for Group {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().map(Into::into).collect(),
        }
    }
}
