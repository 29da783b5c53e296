//! Time-boxed on-disk cache for inventory documents.
//!
//! A refresh is expensive (one request per selector plus one per tag batch),
//! so its result is persisted and reused until it is older than the
//! configured TTL. See [`CacheStore`] for the file layout and validity rules.

pub mod store;

pub use store::{CacheStore, DETAIL_FILE_NAME, INDEX_FILE_NAME};
