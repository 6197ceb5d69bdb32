//! Configuration loading and validation

use anyhow::{bail, Context, Result};
use invgen_core::DedupPolicy;
use invgen_netbox::NetboxConfig as ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding `netbox.url`
pub const URL_ENV: &str = "NETBOX_URL";
/// Environment variable overriding `netbox.token`
pub const TOKEN_ENV: &str = "NETBOX_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub netbox: NetboxConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Netbox,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Where device records come from
    #[serde(default)]
    pub kind: SourceKind,
    /// Device record dump (file source only)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetboxConfig {
    /// NetBox base URL
    #[serde(default)]
    pub url: String,
    /// API token (prefer the NETBOX_TOKEN environment variable)
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Fall back to `primary_ip` when a device has no IPv4 primary address
    #[serde(default)]
    pub ipv6_fallback: bool,
    /// Device list query filters
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl Default for NetboxConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
            verify_tls: true,
            ipv6_fallback: false,
            filters: BTreeMap::new(),
        }
    }
}

fn default_page_size() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the inventory files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_hosts_file")]
    pub hosts_file: String,
    #[serde(default = "default_groups_file")]
    pub groups_file: String,
    #[serde(default = "default_tree_file")]
    pub tree_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            hosts_file: default_hosts_file(),
            groups_file: default_groups_file(),
            tree_file: default_tree_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("inventory")
}

fn default_hosts_file() -> String {
    "hosts.yml".to_string()
}

fn default_groups_file() -> String {
    "groups.yml".to_string()
}

fn default_tree_file() -> String {
    "ansible.yml".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Slug deduplication policy for the group registry
    #[serde(default)]
    pub dedup: DedupPolicy,
}

impl Config {
    /// Apply NETBOX_URL / NETBOX_TOKEN overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.netbox.url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.netbox.token = token;
        }
    }

    /// Convert to the NetBox client configuration
    ///
    /// Missing URL or token is a fatal precondition failure.
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        if self.netbox.url.trim().is_empty() {
            bail!("NetBox URL is not configured (set netbox.url or {})", URL_ENV);
        }
        if self.netbox.token.trim().is_empty() {
            bail!("NetBox token is not configured (set netbox.token or {})", TOKEN_ENV);
        }

        Ok(ClientConfig {
            url: self.netbox.url.clone(),
            token: self.netbox.token.clone(),
            page_size: self.netbox.page_size,
            timeout_secs: self.netbox.timeout_secs,
            verify_tls: self.netbox.verify_tls,
            ipv6_fallback: self.netbox.ipv6_fallback,
            filters: self.netbox.filters.clone(),
        })
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
