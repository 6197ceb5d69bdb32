//! NetBox REST client
//!
//! Pages through the device and platform list endpoints and joins them into
//! device records. Platform custom fields are not part of the brief platform
//! object nested in devices, so platforms are fetched separately.

use invgen_core::DeviceRecord;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::model::{NetboxDevice, NetboxPlatform, Page, PlatformCommands};
use crate::SourceError;

const DEVICES_PATH: &str = "api/dcim/devices/";
const PLATFORMS_PATH: &str = "api/dcim/platforms/";

/// Connection settings for a NetBox instance
#[derive(Debug, Clone)]
pub struct NetboxConfig {
    /// Base URL (e.g., "https://netbox.example.com")
    pub url: String,
    /// API token
    pub token: String,
    /// Objects requested per page
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Verify the server certificate
    pub verify_tls: bool,
    /// Use `primary_ip` when a device has no `primary_ip4`
    pub ipv6_fallback: bool,
    /// Query filters applied to the device list (e.g., site=nyc)
    pub filters: BTreeMap<String, String>,
}

impl Default for NetboxConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            page_size: 1000,
            timeout_secs: 30,
            verify_tls: true,
            ipv6_fallback: false,
            filters: BTreeMap::new(),
        }
    }
}

/// NetBox API client
pub struct NetboxClient {
    client: reqwest::Client,
    base: Url,
    config: NetboxConfig,
}

impl NetboxClient {
    /// Create a client; fails when the token is empty or the URL is invalid
    pub fn new(config: NetboxConfig) -> Result<Self, SourceError> {
        if config.token.trim().is_empty() {
            return Err(SourceError::MissingToken);
        }

        let base = base_url(&config.url)?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Token {}", config.token.trim()))
            .map_err(|_| SourceError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Build the first-page URL of a list endpoint
    fn list_url(&self, path: &str, filters: &BTreeMap<String, String>) -> Result<Url, SourceError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|_| SourceError::InvalidUrl(self.config.url.clone()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.config.page_size.to_string());
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Fetch every object of a list endpoint, following `next` links
    async fn fetch_all<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>, SourceError> {
        let mut objects = Vec::new();
        let mut next = Some(first.to_string());

        while let Some(url) = next {
            debug!(url = %url, "Fetching NetBox page");
            let response = self.client.get(&url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Status { url, status });
            }

            let page: Page<T> = response.json().await?;
            debug!(count = page.count, received = page.results.len(), "Received NetBox page");
            objects.extend(page.results);
            next = page.next;
        }

        Ok(objects)
    }

    /// Fetch platform update commands keyed by platform slug
    pub async fn fetch_platforms(&self) -> Result<PlatformCommands, SourceError> {
        let url = self.list_url(PLATFORMS_PATH, &BTreeMap::new())?;
        let platforms: Vec<NetboxPlatform> = self.fetch_all(url).await?;

        Ok(platforms
            .into_iter()
            .map(|p| {
                let cmd = p.update_cmd();
                (p.slug, cmd)
            })
            .collect())
    }

    /// Fetch all devices matching the configured filters
    pub async fn fetch_devices(&self) -> Result<Vec<NetboxDevice>, SourceError> {
        let url = self.list_url(DEVICES_PATH, &self.config.filters)?;
        self.fetch_all(url).await
    }

    /// Fetch devices and platforms and join them into device records
    pub async fn fetch_records(&self) -> Result<Vec<DeviceRecord>, SourceError> {
        let platforms = self.fetch_platforms().await?;
        let devices = self.fetch_devices().await?;
        let fetched = devices.len();

        let records: Vec<DeviceRecord> = devices
            .into_iter()
            .filter_map(|device| device.into_record(&platforms, self.config.ipv6_fallback))
            .collect();

        info!(
            url = %self.base,
            platforms = platforms.len(),
            devices = fetched,
            records = records.len(),
            "Loaded NetBox inventory"
        );

        Ok(records)
    }
}

/// Parse a base URL, ensuring a trailing slash so relative joins keep any path prefix
fn base_url(raw: &str) -> Result<Url, SourceError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&with_slash).map_err(|_| SourceError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(SourceError::InvalidUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NetboxConfig {
        NetboxConfig {
            url: "https://netbox.example.com/netbox".to_string(),
            token: "0123456789abcdef".to_string(),
            page_size: 250,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_token() {
        let result = NetboxClient::new(NetboxConfig {
            url: "https://netbox.example.com".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(SourceError::MissingToken)));
    }

    #[test]
    fn test_invalid_url() {
        let mut cfg = config();
        cfg.url = "netbox.example.com".to_string();
        assert!(matches!(NetboxClient::new(cfg), Err(SourceError::InvalidUrl(_))));
    }

    #[test]
    fn test_list_url_keeps_path_prefix_and_filters() {
        let client = NetboxClient::new(config()).unwrap();
        let mut filters = BTreeMap::new();
        filters.insert("site".to_string(), "nyc".to_string());
        filters.insert("status".to_string(), "active".to_string());

        let url = client.list_url(DEVICES_PATH, &filters).unwrap();
        assert_eq!(
            url.as_str(),
            "https://netbox.example.com/netbox/api/dcim/devices/?limit=250&site=nyc&status=active"
        );
    }
}
