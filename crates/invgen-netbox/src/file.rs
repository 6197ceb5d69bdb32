//! Device record dumps on disk

use invgen_core::DeviceRecord;
use std::path::Path;
use tracing::info;

use crate::SourceError;

/// Load device records from a JSON (`.json`) or YAML file
pub fn load_records(path: &Path) -> Result<Vec<DeviceRecord>, SourceError> {
    let content = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records: Vec<DeviceRecord> = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    info!(path = %path.display(), records = records.len(), "Loaded device records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.yaml");
        std::fs::write(
            &path,
            r#"
- name: r1
  hostname: 10.0.0.1
  groups: [platform__ios, device_role__router, site__nyc]
  platform: { slug: ios, update_cmd: show version }
  role: { slug: router }
  tags: [core]
  primary_address: 10.0.0.1/24
- name: sw1
"#,
        )
        .unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].groups.len(), 3);
        assert_eq!(
            records[0].platform.as_ref().unwrap().update_cmd.as_deref(),
            Some("show version")
        );
        assert!(records[1].role.is_none());
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.JSON");
        std::fs::write(&path, r#"[{"name": "r1", "tags": ["edge"]}]"#).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records[0].tags, vec!["edge"]);
    }

    #[test]
    fn test_missing_file() {
        let result = load_records(Path::new("/nonexistent/devices.yaml"));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
