//! Invgen Core - Inventory projection for network automation
//!
//! This crate turns a flat list of device records from a source of truth
//! into the structures consumed by automation tooling:
//! - A group registry of platform and role classes
//! - A per-host attribute map
//! - A group-hierarchical inventory tree with connection variables

pub mod device;
pub mod hosts;
pub mod projector;
pub mod registry;
pub mod tree;

pub use device::{Classifier, DeviceRecord, Membership, MembershipCategory};
pub use hosts::{HostEntry, HostMap};
pub use projector::{
    classify, ClassifiedDevice, ClassifierKind, Projection, ProjectionError, Projector,
    SkippedDevice,
};
pub use registry::{DedupPolicy, GroupClass, GroupRegistry, Registration};
pub use tree::{GroupNode, GroupVars, HostVars, InventoryTree};
