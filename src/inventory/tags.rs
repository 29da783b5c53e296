//! Tag fetching and tag-string parsing.
//!
//! The registry describes a host with one tag string:
//!
//! ```text
//! cop.example_owt.inf,service.web
//! └──── tag group ─────┘ └ group ┘
//!  └ tag ┘ └ tag ┘
//! ```
//!
//! `,` separates tag groups, `_` separates tags inside a group and `.` splits
//! a tag into its key and value. Each tag becomes a host variable and a
//! `key.value` group; each whole tag group also becomes a group of its own, so
//! an exact combination of tags can be targeted.
//!
//! Tags are requested in batches cut from the global `all` list so a single
//! request never carries more than the configured number of host names.

use std::num::NonZeroUsize;
use std::ops::Range;
use tracing::{debug, warn};

use super::{HostRecord, OrderedSet, Snapshot};
use crate::error::{Error, Result};
use crate::registry::{AddressResolver, RegistryClient};

/// Hosts per tag request unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Separates tag groups within a tag string
pub const GROUP_SEPARATOR: char = ',';

/// Separates tags within a tag group
pub const TAG_SEPARATOR: char = '_';

/// Separates a tag's key from its value
pub const KEY_VALUE_SEPARATOR: char = '.';

/// Split `0..total` into consecutive ranges of at most `batch_size` items.
///
/// Produces `ceil(total / batch_size)` ranges; together they cover every
/// index exactly once.
pub fn batch_ranges(total: usize, batch_size: NonZeroUsize) -> Vec<Range<usize>> {
    let size = batch_size.get();
    let count = total.div_ceil(size);

    (0..count)
        .map(|i| {
            let start = i * size;
            start..(start + size).min(total)
        })
        .collect()
}

/// One comma-delimited tag group and the key/value pairs it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    /// The group exactly as it appeared in the tag string
    pub raw: String,
    /// `(key, value)` pairs in order of appearance
    pub tags: Vec<(String, String)>,
}

impl TagGroup {
    /// Group names this tag group contributes: one `key.value` per tag
    pub fn tag_group_names(&self) -> impl Iterator<Item = String> + '_ {
        self.tags
            .iter()
            .map(|(key, value)| format!("{}{}{}", key, KEY_VALUE_SEPARATOR, value))
    }
}

/// Parse a registry tag string into its tag groups.
///
/// Every tag must be exactly `key.value` with both parts non-empty; anything
/// else is a [`Error::Decode`].
pub fn parse_tag_string(tag_string: &str) -> Result<Vec<TagGroup>> {
    tag_string
        .split(GROUP_SEPARATOR)
        .map(|raw| {
            let tags = raw
                .split(TAG_SEPARATOR)
                .map(|tag| parse_tag(tag, tag_string))
                .collect::<Result<Vec<_>>>()?;
            Ok(TagGroup {
                raw: raw.to_string(),
                tags,
            })
        })
        .collect()
}

fn parse_tag(tag: &str, tag_string: &str) -> Result<(String, String)> {
    let mut parts = tag.split(KEY_VALUE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(Error::decode(format!(
            "malformed tag '{}' in tag string '{}', expected 'key.value'",
            tag, tag_string
        ))),
    }
}

/// What one tag phase did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSummary {
    /// Requests issued
    pub batches: usize,
    /// Hosts the registry returned tags for
    pub hosts_tagged: usize,
    /// Batches that came back with fewer hosts than were sent
    pub short_batches: usize,
}

/// Fetches tags for the resolved host list and folds them into a snapshot.
#[derive(Debug)]
pub struct TagBatcher<'a, C: ?Sized, R: ?Sized> {
    client: &'a C,
    resolver: &'a R,
    batch_size: NonZeroUsize,
}

impl<'a, C, R> TagBatcher<'a, C, R>
where
    C: RegistryClient + ?Sized,
    R: AddressResolver + ?Sized,
{
    /// Create a batcher sending at most `batch_size` hosts per request
    pub fn new(client: &'a C, resolver: &'a R, batch_size: NonZeroUsize) -> Self {
        Self {
            client,
            resolver,
            batch_size,
        }
    }

    /// Fetch tags for every host in `all` and record them in `snapshot`.
    ///
    /// Batches are processed in order and the first failing request or
    /// malformed tag string aborts the whole phase.
    pub fn fetch(&self, all: &OrderedSet<String>, snapshot: &mut Snapshot) -> Result<TagSummary> {
        let ranges = batch_ranges(all.len(), self.batch_size);
        let mut summary = TagSummary::default();

        for (index, range) in ranges.iter().enumerate() {
            debug!(
                all = all.len(),
                per = self.batch_size.get(),
                batch = index + 1,
                batches = ranges.len(),
                "requesting tags for hosts [{}:{})",
                range.start,
                range.end
            );

            let batch: Vec<&str> = all.range(range.clone()).map(String::as_str).collect();
            let tag_list = self.client.fetch_tags_for_batch(&batch)?;
            summary.batches += 1;

            if tag_list.len() < batch.len() {
                summary.short_batches += 1;
                warn!(
                    sent = batch.len(),
                    returned = tag_list.len(),
                    "registry returned fewer hosts than requested, some hosts may be missing"
                );
            }

            for (host, tag_string) in &tag_list {
                self.apply(snapshot, host, tag_string)?;
                summary.hosts_tagged += 1;
            }
        }

        Ok(summary)
    }

    /// Record one host's address and tags, replacing any earlier record.
    pub fn apply(&self, snapshot: &mut Snapshot, host: &str, tag_string: &str) -> Result<()> {
        let groups = parse_tag_string(tag_string)?;
        let mut record = HostRecord::with_address(self.resolver.resolve(host));

        for group in &groups {
            for ((key, value), name) in group.tags.iter().zip(group.tag_group_names()) {
                record.push_tag(key, value);
                snapshot.inventory.add_to_group(&name, host);
            }
            snapshot.inventory.add_to_group(&group.raw, host);
        }

        snapshot.hosts.insert(host, record);
        Ok(())
    }
}
