//! Device records as delivered by the inventory source

use serde::{Deserialize, Serialize};

/// Delimiter between the category and the value of a group membership
pub const MEMBERSHIP_DELIMITER: &str = "__";

/// Platform or role classifier attached to a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    /// Slug used as group key (e.g., "ios", "router")
    #[serde(default)]
    pub slug: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Command used to update devices of this class (platforms only)
    #[serde(default)]
    pub update_cmd: Option<String>,
}

impl Classifier {
    /// Create a classifier with just a slug
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Default::default()
        }
    }

    /// Set the update command
    pub fn update_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.update_cmd = Some(cmd.into());
        self
    }

    /// Slug, if present and non-blank
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One network element's inventory entry
///
/// Every field tolerates being absent so that partial records from the
/// source still deserialize; whether a record is usable is decided by
/// [`crate::classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique device name
    #[serde(default)]
    pub name: String,
    /// Hostname used to connect to the device
    #[serde(default)]
    pub hostname: String,
    /// Group memberships in `category__value` form
    #[serde(default)]
    pub groups: Vec<String>,
    /// Platform classifier
    #[serde(default)]
    pub platform: Option<Classifier>,
    /// Role classifier
    #[serde(default)]
    pub role: Option<Classifier>,
    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Primary address, optionally with a prefix length (e.g., "10.0.0.1/24")
    #[serde(default)]
    pub primary_address: Option<String>,
    /// Site attribute as reported by the source
    ///
    /// The projection resolves the site from `site__` memberships only.
    #[serde(default)]
    pub site: Option<String>,
}

impl DeviceRecord {
    /// Create a record with a name and hostname
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    /// Iterate over parsed group memberships in encounter order
    pub fn memberships(&self) -> impl Iterator<Item = Membership<'_>> {
        self.groups.iter().map(|g| Membership::parse(g))
    }

    /// Primary address without its prefix length
    pub fn connection_address(&self) -> Option<&str> {
        self.primary_address
            .as_deref()
            .and_then(|addr| addr.split('/').next())
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

/// Category of a group membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCategory {
    Site,
    DeviceRole,
    Platform,
    /// Any other category (device type, manufacturer, tenant, ...)
    Other,
}

impl MembershipCategory {
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "site" => Self::Site,
            "device_role" => Self::DeviceRole,
            "platform" => Self::Platform,
            _ => Self::Other,
        }
    }

    /// Whether memberships of this category name a device group
    pub fn is_device_group(self) -> bool {
        matches!(self, Self::DeviceRole | Self::Platform)
    }
}

/// A parsed `category__value` membership string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership<'a> {
    pub category: MembershipCategory,
    pub value: &'a str,
}

impl<'a> Membership<'a> {
    /// Parse a membership string
    ///
    /// The value is everything after the first delimiter. Strings without a
    /// delimiter parse as [`MembershipCategory::Other`] with an empty value.
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(MEMBERSHIP_DELIMITER) {
            Some((prefix, value)) => Self {
                category: MembershipCategory::from_prefix(prefix),
                value,
            },
            None => Self {
                category: MembershipCategory::Other,
                value: "",
            },
        }
    }
}
