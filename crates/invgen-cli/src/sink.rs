//! Rendering and writing the inventory files
//!
//! All three documents are rendered before anything touches the disk, and
//! each file is written to a temporary file in the output directory and then
//! persisted over the target, so readers never see a half-written inventory
//! file.

use anyhow::{Context, Result};
use invgen_core::Projection;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::OutputConfig;

/// YAML document start marker expected at the top of Ansible inventories
const DOCUMENT_START: &str = "---\n";

/// The three serialized inventory documents
#[derive(Debug, Clone)]
pub struct RenderedInventory {
    pub hosts: String,
    pub groups: String,
    pub tree: String,
}

/// Serialize a projection to YAML
pub fn render(projection: &Projection) -> Result<RenderedInventory> {
    let hosts = serde_yaml::to_string(&projection.hosts).context("Failed to serialize host map")?;
    let groups =
        serde_yaml::to_string(&projection.registry).context("Failed to serialize group registry")?;
    let tree = serde_yaml::to_string(&projection.tree).context("Failed to serialize inventory tree")?;

    Ok(RenderedInventory {
        hosts,
        groups,
        tree: format!("{}{}", DOCUMENT_START, tree),
    })
}

impl RenderedInventory {
    /// Write all documents into `dir`, returning the written paths
    pub fn write_to(&self, dir: &Path, output: &OutputConfig) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let files = [
            (&output.hosts_file, &self.hosts),
            (&output.groups_file, &self.groups),
            (&output.tree_file, &self.tree),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            write_atomic(dir, &path, content)?;
            info!(path = %path.display(), bytes = content.len(), "Wrote inventory file");
            written.push(path);
        }

        Ok(written)
    }
}

fn write_atomic(dir: &Path, path: &Path, content: &str) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invgen_core::{Classifier, DeviceRecord, Projector};
    use tempfile::TempDir;

    fn projection() -> Projection {
        let mut r1 = DeviceRecord::new("r1", "10.0.0.1");
        r1.groups = vec![
            "platform__ios".to_string(),
            "device_role__router".to_string(),
            "site__nyc".to_string(),
        ];
        r1.platform = Some(Classifier::with_slug("ios").update_cmd("show version"));
        r1.role = Some(Classifier::with_slug("router"));
        r1.primary_address = Some("10.0.0.1/24".to_string());

        Projector::default().project(&[r1])
    }

    #[test]
    fn test_render_tree_document() {
        let rendered = render(&projection()).unwrap();

        assert!(rendered.tree.starts_with("---\nall:\n  children:\n"));
        let tree: serde_yaml::Value = serde_yaml::from_str(&rendered.tree).unwrap();
        assert_eq!(
            tree["all"]["children"]["ios"]["hosts"]["r1"]["ansible_host"].as_str(),
            Some("10.0.0.1")
        );
        assert_eq!(
            tree["all"]["children"]["ios"]["vars"]["update_cmd"].as_str(),
            Some("show version")
        );

        let hosts: serde_yaml::Value = serde_yaml::from_str(&rendered.hosts).unwrap();
        assert_eq!(hosts["r1"]["site"].as_str(), Some("nyc"));
        assert!(hosts["r1"].get("tags").is_none());

        let groups: serde_yaml::Value = serde_yaml::from_str(&rendered.groups).unwrap();
        assert_eq!(groups["router"]["some_field"].as_str(), Some("N/A"));
    }

    #[test]
    fn test_write_creates_directory_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("semaphore").join("inventory");
        let output = OutputConfig::default();

        let written = render(&projection()).unwrap().write_to(&dir, &output).unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }
        let tree = std::fs::read_to_string(dir.join("ansible.yml")).unwrap();
        assert!(tree.starts_with("---\n"));

        // Only the three inventory files remain, no temporaries
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 3);
    }

    #[test]
    fn test_rewrite_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let output = OutputConfig::default();
        std::fs::write(temp_dir.path().join("hosts.yml"), "stale: true\n").unwrap();

        render(&projection())
            .unwrap()
            .write_to(temp_dir.path(), &output)
            .unwrap();

        let hosts = std::fs::read_to_string(temp_dir.path().join("hosts.yml")).unwrap();
        assert!(!hosts.contains("stale"));
        assert!(hosts.contains("r1:"));
    }
}
