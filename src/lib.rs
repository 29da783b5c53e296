//! # tagbox-inventory - Dynamic Inventory from a Host/Tag Registry
//!
//! tagbox-inventory turns a remote host/tag registry into the JSON inventory
//! document Ansible-compatible tools expect from a dynamic inventory script,
//! and caches the result on disk so most runs make no network calls at all.
//!
//! ## Core Concepts
//!
//! - **Selectors**: registry queries (class or tag names) whose hosts make up
//!   the inventory
//! - **Tags**: `key.value` pairs the registry attaches to a host; `_` joins
//!   tags into a tag group, `,` separates tag groups
//! - **Inventory**: group name to hosts; groups are `all`, every `key.value`
//!   and every full tag group
//! - **Host cache**: host name to address and tag variables
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     CLI (--list / --host / --refresh-cache)          │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              Pipeline                                │
//! │               (fresh cache? load : refresh, then query)              │
//! └─────────────────────────────────────────────────────────────────────┘
//!          │                         │                         │
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │  Host resolver  │──▶│  Tag batcher and    │──▶│    Cache store      │
//! │  (selectors ->  │   │  parser (groups +   │   │  (index + detail,   │
//! │   all group)    │   │   host variables)   │   │   TTL on mtime)     │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!          │                         │
//!          └────────────┬────────────┘
//!                       ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                Registry client (blocking HTTP) + DNS                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use tagbox_inventory::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Config::from_file("tagbox.toml")?.settings()?;
//!     let mut pipeline = Pipeline::connect(settings, false)?;
//!
//!     println!("{}", output::to_pretty_json(pipeline.list())?);
//!     println!("{}", output::to_pretty_json(&pipeline.host("web01")?)?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error handling
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{Config, Settings};

    // Inventory documents
    pub use crate::inventory::{Group, HostCache, HostRecord, Inventory, OrderedSet, Snapshot};

    // Registry access
    pub use crate::registry::{
        AddressResolver, HttpRegistryClient, RegistryClient, RegistryEndpoints, SystemResolver,
    };

    // Cache
    pub use crate::cache::CacheStore;

    // Pipeline
    pub use crate::pipeline::{Origin, Pipeline, RefreshSummary};

    // Output
    pub use crate::output;
}

/// Error types and result aliases.
///
/// Provides the [`Error`](error::Error) enum covering registry, decoding,
/// cache and configuration failures, and the exit code each one maps to.
pub mod error;

/// Configuration loading, TTL clamping and validated pipeline settings.
pub mod config;

/// Inventory documents and the refresh phases that build them.
pub mod inventory;

/// Registry client and DNS resolution.
pub mod registry;

/// Time-boxed on-disk cache for the inventory documents.
pub mod cache;

/// Cache-or-refresh orchestration and the list/host queries.
pub mod pipeline;

/// JSON rendering and stderr diagnostics.
pub mod output;

/// Version of the tagbox-inventory library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
