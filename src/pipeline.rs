//! Inventory pipeline: cache-or-refresh, then answer queries.
//!
//! ```text
//!            force or stale            ┌──────────┐
//!   Start ────────────────────────────▶│ Refresh  │──┐
//!     │                                └──────────┘  │
//!     │ fresh cache                                  ▼
//!     └──────────────▶ UseCache ─────────────────▶ Ready ──▶ list / host
//! ```
//!
//! A [`Pipeline`] only exists in the `Ready` state: [`Pipeline::open`] runs the
//! first transition and either returns a pipeline holding both documents or
//! the error that stopped it. A refresh replaces the persisted cache only
//! after every request and every tag string succeeded.

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::inventory::{
    resolve_hosts, HostRecord, Inventory, Snapshot, TagBatcher, ALL_GROUP,
};
use crate::registry::{AddressResolver, HttpRegistryClient, RegistryClient, SystemResolver};

/// Where the documents currently held by a pipeline came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Loaded from a fresh cache
    Cache,
    /// Rebuilt from the registry during this run
    Registry,
}

/// What one refresh produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Hosts in `all`
    pub hosts: usize,
    /// Groups in the inventory, including `all`
    pub groups: usize,
    /// Tag requests issued
    pub batches: usize,
    /// Tag requests that returned fewer hosts than sent
    pub short_batches: usize,
}

/// A ready inventory pipeline.
#[derive(Debug)]
pub struct Pipeline<C, R> {
    settings: Settings,
    client: C,
    resolver: R,
    snapshot: Snapshot,
    origin: Origin,
    refreshes: usize,
}

impl Pipeline<HttpRegistryClient, SystemResolver> {
    /// Open a pipeline that talks to the configured registry over HTTP
    pub fn connect(settings: Settings, force_refresh: bool) -> Result<Self> {
        let client = HttpRegistryClient::new(settings.endpoints.clone(), settings.timeout)?;
        Self::open(settings, client, SystemResolver, force_refresh)
    }
}

impl<C, R> Pipeline<C, R>
where
    C: RegistryClient,
    R: AddressResolver,
{
    /// Load the cache or refresh from the registry.
    ///
    /// Refreshes when `force_refresh` is set or the cache is not valid for
    /// the configured TTL; otherwise loads both cache documents.
    pub fn open(settings: Settings, client: C, resolver: R, force_refresh: bool) -> Result<Self> {
        let mut pipeline = Self {
            settings,
            client,
            resolver,
            snapshot: Snapshot::new(),
            origin: Origin::Cache,
            refreshes: 0,
        };

        if force_refresh || !pipeline.settings.store.is_valid(pipeline.settings.ttl) {
            pipeline.refresh()?;
        } else {
            pipeline.use_cache()?;
        }

        Ok(pipeline)
    }

    fn use_cache(&mut self) -> Result<()> {
        let snapshot = self.settings.store.load()?;

        let orphans = snapshot.inventory.orphaned_members(&snapshot.hosts);
        if !orphans.is_empty() {
            warn!(
                count = orphans.len(),
                first = %orphans[0],
                "cached inventory lists hosts missing from the detail cache"
            );
        }

        self.snapshot = snapshot;
        self.origin = Origin::Cache;
        Ok(())
    }

    /// Rebuild both documents from the registry and persist them.
    ///
    /// On error the previously held documents and the cache files are left
    /// untouched.
    pub fn refresh(&mut self) -> Result<RefreshSummary> {
        let all = resolve_hosts(&self.client, &self.settings.selectors)?;

        let mut snapshot = Snapshot::new();
        for host in &all {
            snapshot.inventory.add_to_group(ALL_GROUP, host);
        }

        let tags = TagBatcher::new(&self.client, &self.resolver, self.settings.batch_size)
            .fetch(&all, &mut snapshot)?;

        self.settings.store.save(&snapshot)?;

        let summary = RefreshSummary {
            hosts: snapshot.inventory.host_count(),
            groups: snapshot.inventory.group_count(),
            batches: tags.batches,
            short_batches: tags.short_batches,
        };
        info!(
            hosts = summary.hosts,
            groups = summary.groups,
            batches = summary.batches,
            "refreshed inventory from registry"
        );

        self.snapshot = snapshot;
        self.origin = Origin::Registry;
        self.refreshes += 1;
        Ok(summary)
    }

    /// The full inventory document
    pub fn list(&self) -> &Inventory {
        &self.snapshot.inventory
    }

    /// Variables for one host.
    ///
    /// A host missing from the detail cache triggers one full refresh. If it
    /// is still missing afterwards it is treated as gone and an empty record
    /// is returned.
    pub fn host(&mut self, name: &str) -> Result<HostRecord> {
        if let Some(record) = self.snapshot.hosts.get(name) {
            return Ok(record.clone());
        }

        info!(host = %name, "host not in cache, refreshing");
        self.refresh()?;

        Ok(self.snapshot.hosts.get(name).cloned().unwrap_or_default())
    }

    /// Both documents as currently held
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Where the current documents came from
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Number of refreshes run by this pipeline
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Settings the pipeline runs with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
