//! On-disk cache for the inventory documents.
//!
//! Two JSON files make up the cache:
//! - the index (`.tagbox.index`): the [`Inventory`], whose modification time
//!   decides freshness
//! - the detail cache (`.tagbox.cache`): the [`HostCache`]
//!
//! Both must exist for the cache to be valid. A save writes the detail cache
//! first and the index last, each through a temporary file renamed into place,
//! so a fresh index always has its companion already on disk.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::inventory::{HostCache, Inventory, Snapshot};

/// File name of the inventory index inside a cache directory
pub const INDEX_FILE_NAME: &str = ".tagbox.index";

/// File name of the host detail cache inside a cache directory
pub const DETAIL_FILE_NAME: &str = ".tagbox.cache";

/// Reads, writes and validates the two cache documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    index_path: PathBuf,
    detail_path: PathBuf,
}

impl CacheStore {
    /// Create a store over explicit document paths
    pub fn new(index_path: impl Into<PathBuf>, detail_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            detail_path: detail_path.into(),
        }
    }

    /// Create a store using the default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(INDEX_FILE_NAME), dir.join(DETAIL_FILE_NAME))
    }

    /// Path of the inventory index document
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Path of the host detail document
    pub fn detail_path(&self) -> &Path {
        &self.detail_path
    }

    /// Time since the index was last written, `None` if it cannot be read.
    ///
    /// A modification time in the future counts as age zero.
    pub fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.index_path)
            .and_then(|m| m.modified())
            .ok()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Check whether the cache can be used instead of refreshing.
    ///
    /// True only if the index exists, was written less than `ttl` ago, and
    /// the detail cache exists as well.
    pub fn is_valid(&self, ttl: Duration) -> bool {
        let valid = match self.age() {
            Some(age) => age < ttl && self.detail_path.is_file(),
            None => false,
        };
        debug!(
            index = %self.index_path.display(),
            ttl_secs = ttl.as_secs(),
            valid,
            "checked cache freshness"
        );
        valid
    }

    /// Load both documents.
    ///
    /// Malformed content is reported as [`Error::CorruptCache`]; nothing is
    /// repaired.
    pub fn load(&self) -> Result<Snapshot> {
        let inventory: Inventory = read_json(&self.index_path)?;
        let hosts: HostCache = read_json(&self.detail_path)?;
        debug!(
            groups = inventory.group_count(),
            hosts = hosts.len(),
            "loaded inventory from cache"
        );
        Ok(Snapshot { inventory, hosts })
    }

    /// Persist both documents, detail cache first.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        write_json(&self.detail_path, &snapshot.hosts)?;
        write_json(&self.index_path, &snapshot.inventory)?;
        debug!(
            index = %self.index_path.display(),
            detail = %self.detail_path.display(),
            "wrote inventory cache"
        );
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::CorruptCache {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_private_dir(parent)?;

    let temp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    encode_json(BufWriter::new(temp.as_file()), temp.path(), value)?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Pretty JSON plus a trailing newline; write failures are reported against `path`
fn encode_json<W: Write, T: Serialize>(mut writer: W, path: &Path, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        if e.is_io() {
            Error::io(path, e.into())
        } else {
            Error::Json(e)
        }
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io(path, e))
}

/// Create `dir` and its parents, readable only by the owner on unix
fn create_private_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(|e| Error::io(dir, e))
}
