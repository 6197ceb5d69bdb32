//! Deduplicated registry of device classes keyed by classifier slug

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder value carried by role classes
pub const ROLE_PLACEHOLDER: &str = "N/A";

/// How a slug is matched against already registered keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// A slug is a duplicate when an equal key exists
    #[default]
    Exact,
    /// A slug is a duplicate when any existing key contains it
    ///
    /// Reproduces the legacy generator: registering "ios" after "ios-xr"
    /// is silently skipped.
    Substring,
}

/// Metadata stored for a registered class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GroupClass {
    Platform { update_cmd: Option<String> },
    Role { some_field: String },
}

impl GroupClass {
    pub fn platform(update_cmd: Option<String>) -> Self {
        Self::Platform { update_cmd }
    }

    pub fn role() -> Self {
        Self::Role {
            some_field: ROLE_PLACEHOLDER.to_string(),
        }
    }
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The slug was added
    Added,
    /// An equal key already exists
    AlreadyPresent,
    /// A different key containing the slug exists (substring policy only)
    Collision { existing: String },
}

/// Group registry: classifier slug to class metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupRegistry {
    entries: BTreeMap<String, GroupClass>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class unless the slug is already covered under `policy`
    ///
    /// The first registration of a slug wins; later metadata for the same
    /// slug is ignored.
    pub fn register(&mut self, slug: &str, class: GroupClass, policy: DedupPolicy) -> Registration {
        if self.entries.contains_key(slug) {
            return Registration::AlreadyPresent;
        }

        if policy == DedupPolicy::Substring {
            if let Some(existing) = self.entries.keys().find(|key| key.contains(slug)) {
                return Registration::Collision {
                    existing: existing.clone(),
                };
            }
        }

        self.entries.insert(slug.to_string(), class);
        Registration::Added
    }

    pub fn get(&self, slug: &str) -> Option<&GroupClass> {
        self.entries.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// Registered slugs in key order
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut registry = GroupRegistry::new();
        let first = registry.register(
            "ios",
            GroupClass::platform(Some("show version".into())),
            DedupPolicy::Exact,
        );
        let second = registry.register(
            "ios",
            GroupClass::platform(Some("show ver".into())),
            DedupPolicy::Exact,
        );

        assert_eq!(first, Registration::Added);
        assert_eq!(second, Registration::AlreadyPresent);
        assert_eq!(
            registry.get("ios"),
            Some(&GroupClass::platform(Some("show version".into())))
        );
    }

    #[test]
    fn test_exact_policy_keeps_substrings() {
        let mut registry = GroupRegistry::new();
        registry.register("ios-xr", GroupClass::platform(None), DedupPolicy::Exact);
        let result = registry.register("ios", GroupClass::platform(None), DedupPolicy::Exact);

        assert_eq!(result, Registration::Added);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_substring_policy_drops_contained_slug() {
        let mut registry = GroupRegistry::new();
        registry.register("ios-xr", GroupClass::platform(None), DedupPolicy::Substring);
        let result = registry.register("ios", GroupClass::platform(None), DedupPolicy::Substring);

        assert_eq!(
            result,
            Registration::Collision {
                existing: "ios-xr".to_string()
            }
        );
        assert!(!registry.contains("ios"));

        // The reverse order is not a collision: "ios-xr" is not contained in "ios"
        let mut registry = GroupRegistry::new();
        registry.register("ios", GroupClass::platform(None), DedupPolicy::Substring);
        let result = registry.register("ios-xr", GroupClass::platform(None), DedupPolicy::Substring);
        assert_eq!(result, Registration::Added);
    }

    #[test]
    fn test_serialized_shape() {
        let mut registry = GroupRegistry::new();
        registry.register(
            "ios",
            GroupClass::platform(Some("show version".into())),
            DedupPolicy::Exact,
        );
        registry.register("router", GroupClass::role(), DedupPolicy::Exact);

        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "ios": { "update_cmd": "show version" },
                "router": { "some_field": "N/A" }
            })
        );
    }

    #[test]
    fn test_policy_from_config_string() {
        let policy: DedupPolicy = serde_json::from_str(r#""substring""#).unwrap();
        assert_eq!(policy, DedupPolicy::Substring);
        assert_eq!(DedupPolicy::default(), DedupPolicy::Exact);
    }
}
