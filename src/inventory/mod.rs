//! Inventory documents for tagbox.
//!
//! This module provides the two documents the pipeline builds and caches:
//! - [`Inventory`]: group name to member hosts (what `--list` prints)
//! - [`HostCache`]: host name to [`HostRecord`] (what `--host` prints)
//!
//! and the two refresh phases that fill them:
//! - [`hosts`]: resolve selectors into the de-duplicated `all` group
//! - [`tags`]: fetch tags in batches and derive groups and host variables

pub mod group;
pub mod host;
pub mod hosts;
pub mod ordered_set;
pub mod tags;

pub use group::{Group, ALL_GROUP};
pub use host::{HostRecord, IP_KEY, UNKNOWN_IP};
pub use hosts::resolve_hosts;
pub use ordered_set::OrderedSet;
pub use tags::{batch_ranges, parse_tag_string, TagBatcher, TagGroup, DEFAULT_BATCH_SIZE};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group name to member hosts.
///
/// Serializes as a JSON object of arrays with sorted keys, which is the
/// `--list` format dynamic inventory consumers expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    groups: BTreeMap<String, Group>,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `host` to `group`, creating the group on first use.
    ///
    /// Returns `true` if the host was new to the group.
    pub fn add_to_group(&mut self, group: &str, host: &str) -> bool {
        match self.groups.get_mut(group) {
            Some(existing) => existing.add_host(host),
            None => {
                let mut created = Group::new();
                created.add_host(host);
                self.groups.insert(group.to_string(), created);
                true
            }
        }
    }

    /// Get a group by name
    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Members of the `all` group, empty when nothing was resolved
    pub fn all_hosts(&self) -> &OrderedSet<String> {
        static EMPTY: std::sync::OnceLock<OrderedSet<String>> = std::sync::OnceLock::new();
        self.groups
            .get(ALL_GROUP)
            .map(Group::hosts)
            .unwrap_or_else(|| EMPTY.get_or_init(OrderedSet::new))
    }

    /// Number of groups, including `all`
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of hosts in `all`
    pub fn host_count(&self) -> usize {
        self.all_hosts().len()
    }

    /// True when no group exists
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group members that have no entry in `hosts`, each reported once.
    ///
    /// A fully refreshed pair of documents never has any; a non-empty result
    /// means the cache files were edited or written by different runs.
    pub fn orphaned_members<'a>(&'a self, hosts: &HostCache) -> Vec<&'a str> {
        let mut orphans = OrderedSet::new();
        for group in self.groups.values() {
            for host in group.hosts() {
                if !hosts.contains(host) {
                    orphans.push(host.as_str());
                }
            }
        }
        orphans.into_iter().collect()
    }
}

impl std::fmt::Display for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Inventory ({} hosts, {} groups)",
            self.host_count(),
            self.group_count()
        )?;

        for (name, group) in &self.groups {
            writeln!(f, "  [{}]", name)?;
            for host in group.hosts() {
                writeln!(f, "    {}", host)?;
            }
        }

        Ok(())
    }
}

/// Host name to per-host detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostCache {
    hosts: BTreeMap<String, HostRecord>,
}

impl HostCache {
    /// Create an empty host cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a host record by name
    pub fn get(&self, name: &str) -> Option<&HostRecord> {
        self.hosts.get(name)
    }

    /// Check whether a host has a record
    pub fn contains(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    /// Store a record, replacing any previous record for the host
    pub fn insert(&mut self, name: impl Into<String>, record: HostRecord) {
        self.hosts.insert(name.into(), record);
    }

    /// Number of host records
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// True when there are no host records
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// The pair of documents produced by one refresh or one cache load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Group memberships
    pub inventory: Inventory,
    /// Per-host details
    pub hosts: HostCache,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }
}
