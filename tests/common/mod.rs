//! Shared test utilities for the tagbox-inventory test suite.
//!
//! This module provides:
//! - [`FakeRegistry`], an in-memory [`RegistryClient`] that counts calls and
//!   can be told to fail
//! - settings and cache helpers rooted in a temporary directory
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;
use url::Url;

use tagbox_inventory::cache::CacheStore;
use tagbox_inventory::config::Settings;
use tagbox_inventory::error::{Error, Result};
use tagbox_inventory::registry::{RegistryClient, RegistryEndpoints, StaticResolver, TagList};

// ============================================================================
// Fake registry
// ============================================================================

/// In-memory registry with call counters.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    selectors: HashMap<String, Vec<String>>,
    tags: RefCell<HashMap<String, String>>,
    fail_tags: Cell<bool>,
    pub host_calls: Cell<usize>,
    pub tag_calls: Cell<usize>,
    pub batches: RefCell<Vec<Vec<String>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hosts returned for `selector`
    pub fn with_selector(mut self, selector: &str, hosts: &[&str]) -> Self {
        self.selectors.insert(
            selector.to_string(),
            hosts.iter().map(|h| h.to_string()).collect(),
        );
        self
    }

    /// Tag string returned for `host`
    pub fn with_tags(self, host: &str, tag_string: &str) -> Self {
        self.set_tags(host, tag_string);
        self
    }

    pub fn set_tags(&self, host: &str, tag_string: &str) {
        self.tags
            .borrow_mut()
            .insert(host.to_string(), tag_string.to_string());
    }

    /// Make every tag request fail with a transport error
    pub fn fail_tags(&self, fail: bool) {
        self.fail_tags.set(fail);
    }

    pub fn total_calls(&self) -> usize {
        self.host_calls.get() + self.tag_calls.get()
    }
}

impl RegistryClient for FakeRegistry {
    fn fetch_hosts_for_selector(&self, selector: &str) -> Result<Vec<String>> {
        self.host_calls.set(self.host_calls.get() + 1);
        Ok(self.selectors.get(selector).cloned().unwrap_or_default())
    }

    fn fetch_tags_for_batch(&self, hosts: &[&str]) -> Result<TagList> {
        self.tag_calls.set(self.tag_calls.get() + 1);
        self.batches
            .borrow_mut()
            .push(hosts.iter().map(|h| h.to_string()).collect());

        if self.fail_tags.get() {
            return Err(Error::transport(
                "http://registry.test/tags",
                "connection refused",
                None,
            ));
        }

        let tags = self.tags.borrow();
        let list: TagList = hosts
            .iter()
            .filter_map(|h| tags.get(*h).map(|t| (h.to_string(), t.clone())))
            .collect();
        if list.is_empty() {
            return Err(Error::query("no tags", "http://registry.test/tags"));
        }
        Ok(list)
    }
}

// ============================================================================
// Settings and cache helpers
// ============================================================================

pub const TEST_TTL: Duration = Duration::from_secs(30);

/// Settings with the cache rooted in `dir`
pub fn test_settings(dir: &Path, selectors: &[&str], batch_size: usize) -> Settings {
    Settings {
        endpoints: RegistryEndpoints {
            host_list_url: Url::parse("http://registry.test/api/hosts").unwrap(),
            tag_list_url: Url::parse("http://registry.test/api/tags").unwrap(),
            token: "test-token".to_string(),
        },
        selectors: selectors.iter().map(|s| s.to_string()).collect(),
        batch_size: NonZeroUsize::new(batch_size).unwrap(),
        timeout: Duration::from_secs(5),
        store: CacheStore::in_dir(dir),
        ttl: TEST_TTL,
    }
}

pub fn temp_cache_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Resolver that knows every host name in `hosts`, numbered from 10.0.0.1
pub fn resolver_for(hosts: &[&str]) -> StaticResolver {
    hosts
        .iter()
        .enumerate()
        .fold(StaticResolver::new(), |resolver, (i, host)| {
            resolver.with_entry(*host, IpAddr::V4(Ipv4Addr::new(10, 0, 0, i as u8 + 1)))
        })
}

/// Set a file's modification time to `age` ago
pub fn age_file(path: &Path, age: Duration) {
    let when = FileTime::from_system_time(SystemTime::now() - age);
    filetime::set_file_mtime(path, when).expect("Failed to set mtime");
}
