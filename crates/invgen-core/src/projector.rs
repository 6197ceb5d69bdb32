//! Inventory projection
//!
//! A single pass over the device records that classifies each device and
//! folds it into the three output structures. Classification happens before
//! any output is touched, so a device either contributes to all of them or
//! to none.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::device::{DeviceRecord, MembershipCategory};
use crate::hosts::{HostEntry, HostMap};
use crate::registry::{DedupPolicy, GroupClass, GroupRegistry, Registration};
use crate::tree::InventoryTree;

/// Which classifier a device is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Platform,
    Role,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform => write!(f, "platform"),
            Self::Role => write!(f, "role"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Device {device} has no {kind} slug")]
    MissingClassifier { device: String, kind: ClassifierKind },
}

/// A device that passed classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDevice<'a> {
    pub name: &'a str,
    pub hostname: &'a str,
    pub platform: &'a str,
    pub role: &'a str,
    pub update_cmd: Option<&'a str>,
    /// Device-group slugs in membership order, duplicates preserved
    pub device_groups: Vec<String>,
    pub site: Option<&'a str>,
    pub tags: Vec<String>,
    pub address: Option<&'a str>,
}

/// Classify a device and resolve its site from its own memberships
pub fn classify(device: &DeviceRecord) -> Result<ClassifiedDevice<'_>, ProjectionError> {
    let missing = |kind| ProjectionError::MissingClassifier {
        device: device.name.clone(),
        kind,
    };

    let platform = device.platform.as_ref().ok_or_else(|| missing(ClassifierKind::Platform))?;
    let platform_slug = platform.slug().ok_or_else(|| missing(ClassifierKind::Platform))?;
    let role_slug = device
        .role
        .as_ref()
        .and_then(|role| role.slug())
        .ok_or_else(|| missing(ClassifierKind::Role))?;

    let mut device_groups = Vec::new();
    let mut site = None;
    for membership in device.memberships() {
        match membership.category {
            MembershipCategory::Site => site = Some(membership.value),
            category if category.is_device_group() => {
                device_groups.push(membership.value.to_string())
            }
            _ => {}
        }
    }

    if site.is_none() && device.site.is_some() {
        debug!(
            device = %device.name,
            "Site attribute present without site membership, leaving site unset"
        );
    }

    Ok(ClassifiedDevice {
        name: &device.name,
        hostname: &device.hostname,
        platform: platform_slug,
        role: role_slug,
        update_cmd: platform.update_cmd.as_deref(),
        device_groups,
        site: site.filter(|s| !s.is_empty()),
        tags: device.tags.clone(),
        address: device.connection_address(),
    })
}

/// A device left out of the projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDevice {
    pub name: String,
    pub reason: ProjectionError,
}

/// The three derived structures plus skip diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub hosts: HostMap,
    pub registry: GroupRegistry,
    pub tree: InventoryTree,
    pub skipped: Vec<SkippedDevice>,
}

impl Projection {
    /// Number of devices that made it into the outputs
    pub fn device_count(&self) -> usize {
        self.hosts.len()
    }
}

/// Projects device records into a [`Projection`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    policy: DedupPolicy,
}

impl Projector {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Run the projection over a device sequence
    pub fn project<'a, I>(&self, devices: I) -> Projection
    where
        I: IntoIterator<Item = &'a DeviceRecord>,
    {
        devices
            .into_iter()
            .fold(Projection::default(), |acc, device| self.step(acc, device))
    }

    /// Fold one device into the accumulator
    pub fn step(&self, mut acc: Projection, device: &DeviceRecord) -> Projection {
        let classified = match classify(device) {
            Ok(classified) => classified,
            Err(reason) => {
                warn!(device = %device.name, error = %reason, "Skipping device");
                acc.skipped.push(SkippedDevice {
                    name: device.name.clone(),
                    reason,
                });
                return acc;
            }
        };

        let platform_class = GroupClass::platform(classified.update_cmd.map(str::to_string));
        for (slug, class) in [
            (classified.platform, platform_class),
            (classified.role, GroupClass::role()),
        ] {
            if let Registration::Collision { existing } =
                acc.registry.register(slug, class, self.policy)
            {
                debug!(
                    device = %classified.name,
                    slug = %slug,
                    existing = %existing,
                    "Classifier slug collides with registered group, skipping"
                );
            }
        }

        acc.tree.attach(
            classified.name,
            classified.address,
            &classified.device_groups,
        );
        acc.tree
            .set_platform_vars(classified.platform, classified.update_cmd);

        debug!(
            device = %classified.name,
            groups = ?classified.device_groups,
            site = ?classified.site,
            "Projected device"
        );

        acc.hosts.insert(
            classified.name,
            HostEntry {
                hostname: classified.hostname.to_string(),
                groups: classified.device_groups,
                tags: classified.tags,
                site: classified.site.map(str::to_string),
            },
        );

        acc
    }
}
