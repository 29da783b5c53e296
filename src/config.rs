//! Configuration for tagbox-inventory
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/tagbox/tagbox.toml)
//! - User configuration (~/.tagbox.toml, ~/.config/tagbox/tagbox.toml)
//! - Project configuration (./tagbox.toml)
//! - Environment variables
//!
//! The pipeline never reads configuration itself; the binary loads a
//! [`Config`] and hands the validated [`Settings`] to it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cache::CacheStore;
use crate::error::Error;
use crate::inventory::DEFAULT_BATCH_SIZE;
use crate::registry::RegistryEndpoints;

/// Token value shipped in the configuration template
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN_STRING";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CACHE_DIR: &str = "~/.cache/tagbox";
const DEFAULT_TTL: u64 = 300;
const DEFAULT_TTL_MIN: u64 = 60;
const DEFAULT_TTL_MAX: u64 = 3600;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry endpoints, credentials and selectors
    pub registry: RegistryConfig,

    /// Cache location and lifetime
    pub cache: CacheConfig,

    /// Who may run the inventory
    pub access: AccessConfig,
}

/// Registry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the host-list-by-selector endpoint
    pub host_list_url: Option<String>,

    /// Base URL of the tags-by-host-batch endpoint
    pub tag_list_url: Option<String>,

    /// Static access token
    pub token: Option<String>,

    /// Selectors whose hosts make up the inventory, in priority order
    pub selectors: Vec<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum hosts per tag request
    pub batch_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host_list_url: None,
            tag_list_url: None,
            token: None,
            selectors: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the index and detail cache files (`~` is expanded)
    pub dir: String,

    /// Requested cache lifetime in seconds
    pub ttl: u64,

    /// Lower bound the requested lifetime is clamped to
    pub ttl_min: u64,

    /// Upper bound the requested lifetime is clamped to
    pub ttl_max: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_CACHE_DIR.to_string(),
            ttl: DEFAULT_TTL,
            ttl_min: DEFAULT_TTL_MIN,
            ttl_max: DEFAULT_TTL_MAX,
        }
    }
}

/// Access settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Users not allowed to run the inventory
    pub deny_users: Vec<String>,
}

/// Validated values the pipeline runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Registry location and token
    pub endpoints: RegistryEndpoints,
    /// Selectors in configured order
    pub selectors: Vec<String>,
    /// Maximum hosts per tag request
    pub batch_size: NonZeroUsize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Cache document locations
    pub store: CacheStore,
    /// Effective cache lifetime, already clamped
    pub ttl: Duration,
}

/// Clamp a requested TTL into `[min, max]`
pub fn clamp_ttl(requested: u64, min: u64, max: u64) -> u64 {
    if requested < min {
        min
    } else if requested > max {
        max
    } else {
        requested
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            } else if config_path.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("/etc/tagbox/tagbox.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tagbox.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tagbox/tagbox.toml"));
        }

        paths.push(PathBuf::from("tagbox.toml"));
        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file_config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one
    fn merge(&self, other: Config) -> Config {
        let defaults = Config::default();

        Config {
            registry: RegistryConfig {
                host_list_url: other
                    .registry
                    .host_list_url
                    .or_else(|| self.registry.host_list_url.clone()),
                tag_list_url: other
                    .registry
                    .tag_list_url
                    .or_else(|| self.registry.tag_list_url.clone()),
                token: other.registry.token.or_else(|| self.registry.token.clone()),
                selectors: if other.registry.selectors.is_empty() {
                    self.registry.selectors.clone()
                } else {
                    other.registry.selectors
                },
                timeout: if other.registry.timeout != defaults.registry.timeout {
                    other.registry.timeout
                } else {
                    self.registry.timeout
                },
                batch_size: if other.registry.batch_size != defaults.registry.batch_size {
                    other.registry.batch_size
                } else {
                    self.registry.batch_size
                },
            },
            cache: CacheConfig {
                dir: if other.cache.dir != defaults.cache.dir {
                    other.cache.dir
                } else {
                    self.cache.dir.clone()
                },
                ttl: if other.cache.ttl != defaults.cache.ttl {
                    other.cache.ttl
                } else {
                    self.cache.ttl
                },
                ttl_min: if other.cache.ttl_min != defaults.cache.ttl_min {
                    other.cache.ttl_min
                } else {
                    self.cache.ttl_min
                },
                ttl_max: if other.cache.ttl_max != defaults.cache.ttl_max {
                    other.cache.ttl_max
                } else {
                    self.cache.ttl_max
                },
            },
            access: AccessConfig {
                deny_users: {
                    let mut users = self.access.deny_users.clone();
                    users.extend(
                        other
                            .access
                            .deny_users
                            .into_iter()
                            .filter(|u| !self.access.deny_users.contains(u)),
                    );
                    users
                },
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // TAGBOX_TOKEN
        if let Ok(token) = std::env::var("TAGBOX_TOKEN") {
            self.registry.token = Some(token);
        }

        // TAGBOX_SELECTORS
        if let Ok(selectors) = std::env::var("TAGBOX_SELECTORS") {
            self.registry.selectors = split_list(&selectors);
        }

        // TAGBOX_CACHE_DIR
        if let Ok(dir) = std::env::var("TAGBOX_CACHE_DIR") {
            self.cache.dir = dir;
        }

        // TAGBOX_CACHE_TTL
        if let Ok(ttl) = std::env::var("TAGBOX_CACHE_TTL") {
            if let Ok(n) = ttl.parse() {
                self.cache.ttl = n;
            }
        }
    }

    /// Check if `user` appears in the deny list
    pub fn is_denied(&self, user: &str) -> bool {
        self.access.deny_users.iter().any(|u| u == user)
    }

    /// Check if the token is still the template placeholder
    pub fn has_placeholder_token(&self) -> bool {
        self.registry.token.as_deref() == Some(PLACEHOLDER_TOKEN)
    }

    /// Cache lifetime after clamping into the configured bounds
    pub fn effective_ttl(&self) -> Duration {
        Duration::from_secs(clamp_ttl(
            self.cache.ttl,
            self.cache.ttl_min,
            self.cache.ttl_max,
        ))
    }

    /// Expanded cache directory
    pub fn cache_dir(&self) -> crate::error::Result<PathBuf> {
        shellexpand::full(&self.cache.dir)
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .map_err(|e| Error::invalid_config("cache.dir", e.to_string()))
    }

    /// Validate and resolve into the values the pipeline needs
    pub fn settings(&self) -> crate::error::Result<Settings> {
        let host_list_url = parse_url("registry.host_list_url", &self.registry.host_list_url)?;
        let tag_list_url = parse_url("registry.tag_list_url", &self.registry.tag_list_url)?;

        let token = match self.registry.token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(Error::invalid_config("registry.token", "must be set")),
        };

        if self.registry.selectors.is_empty() {
            return Err(Error::invalid_config(
                "registry.selectors",
                "at least one selector is required",
            ));
        }

        let batch_size = NonZeroUsize::new(self.registry.batch_size).ok_or_else(|| {
            Error::invalid_config("registry.batch_size", "must be at least 1")
        })?;

        if self.cache.ttl_min > self.cache.ttl_max {
            return Err(Error::invalid_config(
                "cache.ttl_min",
                format!(
                    "{} is greater than cache.ttl_max ({})",
                    self.cache.ttl_min, self.cache.ttl_max
                ),
            ));
        }

        Ok(Settings {
            endpoints: RegistryEndpoints {
                host_list_url,
                tag_list_url,
                token,
            },
            selectors: self.registry.selectors.clone(),
            batch_size,
            timeout: self.registry.timeout,
            store: CacheStore::in_dir(self.cache_dir()?),
            ttl: self.effective_ttl(),
        })
    }

    /// Load from a specific file, without search paths or environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

fn parse_url(key: &str, value: &Option<String>) -> crate::error::Result<Url> {
    let raw = value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::invalid_config(key, "must be set"))?;
    Url::parse(raw).map_err(|e| Error::invalid_config(key, format!("'{}': {}", raw, e)))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
