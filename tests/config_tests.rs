//! Integration tests for tagbox-inventory configuration
//!
//! These tests verify:
//! - Loading configuration from TOML and JSON files
//! - Default values for every section
//! - Environment variable overrides
//! - Validation into pipeline settings

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

use tagbox_inventory::cache::{DETAIL_FILE_NAME, INDEX_FILE_NAME};
use tagbox_inventory::config::Config;
use tagbox_inventory::error::Error;

const FULL_TOML: &str = r#"
[registry]
host_list_url = "http://registry.example.com/api/hosts?"
tag_list_url = "http://registry.example.com/api/tags?"
token = "secret"
selectors = ["service.web", "service.db"]
timeout = "10s"
batch_size = 50

[cache]
dir = "/var/cache/tagbox"
ttl = 120
ttl_min = 30
ttl_max = 600

[access]
deny_users = ["root"]
"#;

fn write_config(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_toml_config() {
    let (_dir, path) = write_config("tagbox.toml", FULL_TOML);

    let config = Config::from_file(&path).unwrap();

    assert_eq!(
        config.registry.host_list_url.as_deref(),
        Some("http://registry.example.com/api/hosts?")
    );
    assert_eq!(config.registry.selectors, vec!["service.web", "service.db"]);
    assert_eq!(config.registry.timeout, Duration::from_secs(10));
    assert_eq!(config.registry.batch_size, 50);
    assert_eq!(config.cache.dir, "/var/cache/tagbox");
    assert_eq!(config.cache.ttl, 120);
    assert!(config.is_denied("root"));
    assert!(!config.is_denied("deploy"));
}

#[test]
fn test_load_json_config() {
    let (_dir, path) = write_config(
        "tagbox.json",
        r#"{"registry": {"token": "secret", "selectors": ["service.web"]}, "cache": {"ttl": 90}}"#,
    );

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.registry.token.as_deref(), Some("secret"));
    assert_eq!(config.cache.ttl, 90);
    assert_eq!(config.cache.ttl_max, 3600);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let (_dir, path) = write_config("tagbox.toml", "[cache]\nttl = 45\n");

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.cache.ttl, 45);
    assert_eq!(config.cache.dir, "~/.cache/tagbox");
    assert_eq!(config.registry.batch_size, 200);
    assert_eq!(config.registry.timeout, Duration::from_secs(30));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let (_dir, path) = write_config("tagbox.toml", "[registry\ntoken = ");

    assert!(Config::from_file(&path).is_err());
}

#[test]
#[serial]
fn test_explicit_missing_path_fails() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// ============================================================================
// Settings Validation Tests
// ============================================================================

#[test]
fn test_settings_from_full_config() {
    let (_dir, path) = write_config("tagbox.toml", FULL_TOML);
    let settings = Config::from_file(&path).unwrap().settings().unwrap();

    assert_eq!(settings.endpoints.token, "secret");
    assert_eq!(settings.endpoints.host_list_url.host_str(), Some("registry.example.com"));
    assert_eq!(settings.batch_size.get(), 50);
    assert_eq!(settings.ttl, Duration::from_secs(120));
    assert_eq!(
        settings.store.index_path(),
        PathBuf::from("/var/cache/tagbox").join(INDEX_FILE_NAME)
    );
    assert_eq!(
        settings.store.detail_path(),
        PathBuf::from("/var/cache/tagbox").join(DETAIL_FILE_NAME)
    );
}

#[test]
fn test_ttl_is_clamped_into_bounds() {
    let (_dir, path) = write_config("tagbox.toml", FULL_TOML);
    let mut config = Config::from_file(&path).unwrap();

    config.cache.ttl = 5;
    assert_eq!(config.settings().unwrap().ttl, Duration::from_secs(30));

    config.cache.ttl = 100_000;
    assert_eq!(config.settings().unwrap().ttl, Duration::from_secs(600));
}

#[test]
fn test_settings_require_token_and_selectors() {
    let (_dir, path) = write_config("tagbox.toml", FULL_TOML);
    let config = Config::from_file(&path).unwrap();

    let mut no_token = config.clone();
    no_token.registry.token = None;
    let err = no_token.settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "registry.token"));
    assert_eq!(err.exit_code(), 2);

    let mut no_selectors = config;
    no_selectors.registry.selectors.clear();
    assert!(no_selectors.settings().is_err());
}

#[test]
fn test_placeholder_token_detected() {
    let (_dir, path) = write_config(
        "tagbox.toml",
        "[registry]\ntoken = \"YOUR_TOKEN_STRING\"\n",
    );

    assert!(Config::from_file(&path).unwrap().has_placeholder_token());
}

// ============================================================================
// Environment Variable Tests
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_file_values() {
    let (dir, path) = write_config("tagbox.toml", FULL_TOML);
    let cache_dir = dir.path().join("cache");

    std::env::set_var("TAGBOX_TOKEN", "from-env");
    std::env::set_var("TAGBOX_SELECTORS", "service.api, service.db ,");
    std::env::set_var("TAGBOX_CACHE_DIR", &cache_dir);
    std::env::set_var("TAGBOX_CACHE_TTL", "240");

    let config = Config::load(Some(&path));

    std::env::remove_var("TAGBOX_TOKEN");
    std::env::remove_var("TAGBOX_SELECTORS");
    std::env::remove_var("TAGBOX_CACHE_DIR");
    std::env::remove_var("TAGBOX_CACHE_TTL");

    let config = config.unwrap();
    assert_eq!(config.registry.token.as_deref(), Some("from-env"));
    assert_eq!(config.registry.selectors, vec!["service.api", "service.db"]);
    assert_eq!(config.cache.dir, cache_dir.to_string_lossy());
    assert_eq!(config.cache.ttl, 240);
}

#[test]
#[serial]
fn test_unparseable_env_ttl_is_ignored() {
    let (_dir, path) = write_config("tagbox.toml", FULL_TOML);

    std::env::set_var("TAGBOX_CACHE_TTL", "soon");
    let config = Config::load(Some(&path));
    std::env::remove_var("TAGBOX_CACHE_TTL");

    assert_eq!(config.unwrap().cache.ttl, 120);
}

#[test]
#[serial]
fn test_cache_dir_expands_home() {
    let (_dir, path) = write_config("tagbox.toml", "[cache]\ndir = \"~/inventory-cache\"\n");
    let config = Config::from_file(&path).unwrap();

    let expanded = config.cache_dir().unwrap();
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("inventory-cache"));
}
