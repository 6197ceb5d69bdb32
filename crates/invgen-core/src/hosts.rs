//! Per-host attribute map

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Attributes recorded for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub hostname: String,
    /// Device-group slugs in membership order
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

/// Host map keyed by device name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostMap {
    hosts: BTreeMap<String, HostEntry>,
}

impl HostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the entry for a device, replacing any earlier entry with the same name
    pub fn insert(&mut self, name: &str, entry: HostEntry) {
        if self.hosts.insert(name.to_string(), entry).is_some() {
            warn!(device = %name, "Duplicate device name, keeping the later record");
        }
    }

    pub fn get(&self, name: &str) -> Option<&HostEntry> {
        self.hosts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostEntry)> {
        self.hosts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hostname: &str) -> HostEntry {
        HostEntry {
            hostname: hostname.to_string(),
            groups: vec!["ios".to_string()],
            tags: Vec::new(),
            site: None,
        }
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let value = serde_json::to_value(entry("r1")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "hostname": "r1", "groups": ["ios"] })
        );
    }

    #[test]
    fn test_later_entry_replaces_earlier() {
        let mut hosts = HostMap::new();
        hosts.insert("r1", entry("10.0.0.1"));
        hosts.insert("r1", entry("10.0.0.2"));

        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts.get("r1").unwrap().hostname, "10.0.0.2");
    }
}
