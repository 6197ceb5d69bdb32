//! NetBox API response types and their mapping to device records

use invgen_core::{Classifier, DeviceRecord};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Platform slug to update command, read from platform custom fields
pub type PlatformCommands = HashMap<String, Option<String>>;

/// Custom field holding the platform update command
pub const UPDATE_CMD_FIELD: &str = "update_cmd";

/// One page of a paginated NetBox list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Brief nested object (site, role, platform, device type, manufacturer)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedRef {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedDeviceType {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<NestedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedAddress {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedTag {
    pub name: String,
}

/// Platform object from `/api/dcim/platforms/`
#[derive(Debug, Clone, Deserialize)]
pub struct NetboxPlatform {
    pub slug: String,
    #[serde(default)]
    pub custom_fields: HashMap<String, serde_json::Value>,
}

impl NetboxPlatform {
    pub fn update_cmd(&self) -> Option<String> {
        self.custom_fields
            .get(UPDATE_CMD_FIELD)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }
}

/// Device object from `/api/dcim/devices/`
#[derive(Debug, Clone, Deserialize)]
pub struct NetboxDevice {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<NestedRef>,
    /// NetBox 4 names this `role`, NetBox 3 `device_role`
    #[serde(default, alias = "device_role")]
    pub role: Option<NestedRef>,
    #[serde(default)]
    pub platform: Option<NestedRef>,
    #[serde(default)]
    pub device_type: Option<NestedDeviceType>,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub primary_ip4: Option<NestedAddress>,
    #[serde(default)]
    pub primary_ip: Option<NestedAddress>,
}

fn nested_slug(nested: &Option<NestedRef>) -> Option<&str> {
    nested.as_ref().and_then(|n| n.slug.as_deref())
}

fn classifier(nested: Option<NestedRef>) -> Option<Classifier> {
    nested.map(|n| Classifier {
        slug: n.slug,
        name: n.name,
        update_cmd: None,
    })
}

impl NetboxDevice {
    /// Group memberships in the form produced by the NetBox inventory plugin
    pub fn memberships(&self) -> Vec<String> {
        let manufacturer = self
            .device_type
            .as_ref()
            .and_then(|t| t.manufacturer.as_ref())
            .and_then(|m| m.slug.as_deref());
        let device_type = self.device_type.as_ref().and_then(|t| t.slug.as_deref());

        [
            ("site", nested_slug(&self.site)),
            ("device_role", nested_slug(&self.role)),
            ("platform", nested_slug(&self.platform)),
            ("device_type", device_type),
            ("manufacturer", manufacturer),
        ]
        .into_iter()
        .filter_map(|(category, slug)| slug.map(|slug| format!("{}__{}", category, slug)))
        .collect()
    }

    /// Convert to a device record
    ///
    /// Returns `None` for unnamed devices, which cannot be keyed.
    pub fn into_record(self, platforms: &PlatformCommands, ipv6_fallback: bool) -> Option<DeviceRecord> {
        let Some(name) = self.name.clone().filter(|n| !n.is_empty()) else {
            warn!(id = self.id, "Skipping unnamed NetBox device");
            return None;
        };

        let groups = self.memberships();
        let primary_address = match (self.primary_ip4, self.primary_ip) {
            (Some(v4), _) => Some(v4.address),
            (None, Some(any)) if ipv6_fallback => Some(any.address),
            _ => None,
        };
        let hostname = primary_address
            .as_deref()
            .and_then(|addr| addr.split('/').next())
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());

        let mut platform = classifier(self.platform);
        if let Some(platform) = platform.as_mut() {
            platform.update_cmd = platform
                .slug
                .as_ref()
                .and_then(|slug| platforms.get(slug).cloned().flatten());
        }

        Some(DeviceRecord {
            name,
            hostname,
            groups,
            platform,
            role: classifier(self.role),
            tags: self.tags.into_iter().map(|t| t.name).collect(),
            primary_address,
            site: self.site.and_then(|s| s.slug),
        })
    }
}
