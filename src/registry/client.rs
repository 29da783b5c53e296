//! Blocking HTTP client for the host/tag registry.
//!
//! Both endpoints are plain GETs whose parameters travel in the query string:
//!
//! - host list: `<host_list_url>token=<token>&tag=<selector>`
//!   returns `{"hosts": ["web01", ...]}`
//! - tag list: `<tag_list_url>token=<token>&hosts=<h1_h2_...>`
//!   returns `{"succ": 0, "tag_list": {"web01": "k.v_k2.v2,k3.v3"}}`

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{RegistryClient, TagList, HOST_SEPARATOR};
use crate::error::{Error, Result};

/// User agent sent with every registry request
const USER_AGENT: &str = concat!("tagbox-inventory/", env!("CARGO_PKG_VERSION"));

/// Where the registry lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct RegistryEndpoints {
    /// Base URL of the host-list-by-selector endpoint
    pub host_list_url: Url,
    /// Base URL of the tags-by-host-batch endpoint
    pub tag_list_url: Url,
    /// Static access token
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct HostListResponse {
    hosts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagListResponse {
    succ: i64,
    #[serde(default)]
    tag_list: Option<TagList>,
    #[serde(default)]
    err_note: Option<String>,
}

/// [`RegistryClient`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    endpoints: RegistryEndpoints,
}

impl HttpRegistryClient {
    /// Build a client with the given request timeout
    pub fn new(endpoints: RegistryEndpoints, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    /// Issue one GET and return the status and body.
    ///
    /// The returned display URL omits the token so it is safe to log and to
    /// embed in errors.
    fn get(&self, base: &Url, params: &[(&str, &str)]) -> Result<(StatusCode, String, String)> {
        let mut display = base.clone();
        display.query_pairs_mut().extend_pairs(params);
        let display = display.to_string();

        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair("token", &self.endpoints.token)
            .extend_pairs(params);

        let response = self.client.get(url).send().map_err(|e| {
            // reqwest embeds the full URL, token included
            let e = e.without_url();
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            Error::transport(display.clone(), message, Some(Box::new(e)))
        })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            let e = e.without_url();
            Error::transport(
                display.clone(),
                format!("failed to read response body: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok((status, body, display))
    }
}

fn response_error(url: String, status: StatusCode) -> Error {
    Error::Response {
        url,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

impl RegistryClient for HttpRegistryClient {
    fn fetch_hosts_for_selector(&self, selector: &str) -> Result<Vec<String>> {
        let (status, body, url) = self.get(&self.endpoints.host_list_url, &[("tag", selector)])?;

        if status != StatusCode::OK {
            return Err(response_error(url, status));
        }

        let payload: HostListResponse = serde_json::from_str(&body).map_err(|e| {
            Error::decode(format!(
                "host list response from '{}' has no usable 'hosts' array, maybe the registry API changed: {}",
                url, e
            ))
        })?;

        debug!(url = %url, hosts = payload.hosts.len(), "fetched host list");
        Ok(payload.hosts)
    }

    fn fetch_tags_for_batch(&self, hosts: &[&str]) -> Result<TagList> {
        let joined = hosts.join(HOST_SEPARATOR);
        let (status, body, url) =
            self.get(&self.endpoints.tag_list_url, &[("hosts", joined.as_str())])?;

        if status != StatusCode::OK && status != StatusCode::NOT_MODIFIED {
            return Err(response_error(url, status));
        }

        let payload: TagListResponse = serde_json::from_str(&body).map_err(|e| {
            Error::decode(format!(
                "tag list response from '{}' is malformed, maybe the registry API changed: {}",
                url, e
            ))
        })?;

        let note = payload.err_note.unwrap_or_default();
        if payload.succ != 0 {
            return Err(Error::query(note, url));
        }

        let tag_list = payload.tag_list.ok_or_else(|| {
            Error::decode(format!("tag list response from '{}' has no 'tag_list'", url))
        })?;
        if tag_list.is_empty() {
            return Err(Error::query(note, url));
        }

        debug!(url = %url, hosts = tag_list.len(), "fetched tag list");
        Ok(tag_list)
    }
}
