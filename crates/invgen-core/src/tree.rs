//! Group-hierarchical inventory tree
//!
//! Serializes to the layout expected by Ansible YAML inventories:
//!
//! ```yaml
//! all:
//!   children:
//!     ios:
//!       hosts:
//!         r1:
//!           ansible_host: 10.0.0.1
//!           groups: [router]
//!       vars:
//!         update_cmd: show version
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

/// Connection variables of one host occurrence within a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostVars {
    /// Resolved address, `null` when the device has none
    pub ansible_host: Option<String>,
    /// The device's other device-groups
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// Class-level variables of a platform group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupVars {
    pub update_cmd: Option<String>,
}

/// One group container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub hosts: BTreeMap<String, HostVars>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vars: Option<GroupVars>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeRoot {
    pub children: BTreeMap<String, GroupNode>,
}

/// Inventory tree rooted at the `all` group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryTree {
    pub all: TreeRoot,
}

impl InventoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the container for a group, creating it on first encounter
    pub fn group_mut(&mut self, group: &str) -> &mut GroupNode {
        self.all.children.entry(group.to_string()).or_default()
    }

    pub fn group(&self, group: &str) -> Option<&GroupNode> {
        self.all.children.get(group)
    }

    /// Group names in key order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.all.children.keys().map(String::as_str)
    }

    /// Record a device under each of its device-groups
    ///
    /// Every occurrence carries the address and lists the device's other
    /// groups in encounter order.
    pub fn attach(&mut self, device: &str, address: Option<&str>, device_groups: &[String]) {
        for group in device_groups {
            let others: Vec<String> = device_groups
                .iter()
                .filter(|other| *other != group)
                .cloned()
                .collect();

            self.group_mut(group).hosts.insert(
                device.to_string(),
                HostVars {
                    ansible_host: address.map(str::to_string),
                    groups: others,
                },
            );
        }
    }

    /// Set the class variables of a platform group; the last call wins
    pub fn set_platform_vars(&mut self, platform: &str, update_cmd: Option<&str>) {
        self.group_mut(platform).vars = Some(GroupVars {
            update_cmd: update_cmd.map(str::to_string),
        });
    }

    /// Number of group occurrences of a device
    pub fn occurrences(&self, device: &str) -> usize {
        self.all
            .children
            .values()
            .filter(|node| node.hosts.contains_key(device))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_attach_records_other_groups() {
        let mut tree = InventoryTree::new();
        tree.attach("r1", Some("10.0.0.1"), &groups(&["ios", "router", "edge"]));

        let ios = &tree.group("ios").unwrap().hosts["r1"];
        assert_eq!(ios.ansible_host.as_deref(), Some("10.0.0.1"));
        assert_eq!(ios.groups, groups(&["router", "edge"]));

        let edge = &tree.group("edge").unwrap().hosts["r1"];
        assert_eq!(edge.groups, groups(&["ios", "router"]));
        assert_eq!(tree.occurrences("r1"), 3);
    }

    #[test]
    fn test_single_group_has_no_side_list() {
        let mut tree = InventoryTree::new();
        tree.attach("sw1", None, &groups(&["access"]));

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "all": { "children": {
                    "access": { "hosts": { "sw1": { "ansible_host": null } } }
                } }
            })
        );
    }

    #[test]
    fn test_platform_vars_last_write_wins() {
        let mut tree = InventoryTree::new();
        tree.attach("r1", None, &groups(&["ios"]));
        tree.set_platform_vars("ios", Some("show version"));
        tree.set_platform_vars("ios", Some("show ver"));

        let vars = tree.group("ios").unwrap().vars.as_ref().unwrap();
        assert_eq!(vars.update_cmd.as_deref(), Some("show ver"));
    }
}
