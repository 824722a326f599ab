//! The squad manifest (`squad.yaml`, legacy `config.yaml`)

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::fsutil;

/// Manifest file names in priority order
pub const MANIFEST_FILES: [&str; 2] = ["squad.yaml", "config.yaml"];
pub const PRIMARY_MANIFEST: &str = "squad.yaml";
pub const LEGACY_MANIFEST: &str = "config.yaml";

/// The fixed set of component directories a squad may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Agents,
    Tasks,
    Workflows,
    Checklists,
    Templates,
    Tools,
    Data,
    Scripts,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Agents,
        ComponentKind::Tasks,
        ComponentKind::Workflows,
        ComponentKind::Checklists,
        ComponentKind::Templates,
        ComponentKind::Tools,
        ComponentKind::Data,
        ComponentKind::Scripts,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Tasks => "tasks",
            Self::Workflows => "workflows",
            Self::Checklists => "checklists",
            Self::Templates => "templates",
            Self::Tools => "tools",
            Self::Data => "data",
            Self::Scripts => "scripts",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dir_name() == name)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How a squad's configuration relates to the project configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMode {
    /// Inherit project rules and add squad-specific ones
    #[default]
    Extend,
    /// Self-contained rules
    Override,
    /// No squad configuration
    None,
}

impl ConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extend => "extend",
            Self::Override => "override",
            Self::None => "none",
        }
    }
}

impl FromStr for ConfigMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extend" => Ok(Self::Extend),
            "override" => Ok(Self::Override),
            "none" => Ok(Self::None),
            other => Err(format!("unknown config mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiosSection {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "minVersion", default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<ConfigMode>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Where a blueprint-generated squad came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintProvenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub source_docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A squad manifest.
///
/// Every field is optional because legacy manifests may lack any of them.
/// Unknown keys are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aios: Option<AiosSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ManifestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<BlueprintProvenance>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Manifest {
    /// Parse manifest YAML. An empty document yields an empty manifest.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Files listed under `components.<kind>`
    pub fn components_of(&self, kind: ComponentKind) -> &[String] {
        self.components
            .as_ref()
            .and_then(|c| c.get(kind.dir_name()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a file under `components.<kind>`; returns false if already listed.
    pub fn add_component(&mut self, kind: ComponentKind, file: &str) -> bool {
        let list = self
            .components
            .get_or_insert_with(BTreeMap::new)
            .entry(kind.dir_name().to_string())
            .or_default();
        if list.iter().any(|f| f == file) {
            return false;
        }
        list.push(file.to_string());
        true
    }

    pub fn aios_type(&self) -> Option<&str> {
        self.aios.as_ref().and_then(|a| a.kind.as_deref())
    }

    pub fn aios_min_version(&self) -> Option<&str> {
        self.aios.as_ref().and_then(|a| a.min_version.as_deref())
    }
}

/// A manifest file found inside a squad directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    pub path: PathBuf,
    /// True for the deprecated `config.yaml`
    pub legacy: bool,
}

/// Find the manifest in `squad_dir`, preferring `squad.yaml` over `config.yaml`.
pub async fn find_manifest(squad_dir: &Path) -> Option<ManifestLocation> {
    for file in MANIFEST_FILES {
        let path = squad_dir.join(file);
        if fsutil::path_exists(&path).await {
            return Some(ManifestLocation {
                legacy: file == LEGACY_MANIFEST,
                path,
            });
        }
    }
    None
}

#[derive(Debug, Error)]
pub enum ManifestReadError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(#[from] serde_yaml::Error),
}

pub async fn read_manifest(path: &Path) -> Result<Manifest, ManifestReadError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(Manifest::from_yaml_str(&content)?)
}

pub async fn write_manifest(path: &Path, manifest: &Manifest) -> io::Result<()> {
    let yaml = manifest.to_yaml_string().map_err(io::Error::other)?;
    fsutil::write_atomic(path, yaml).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_preserves_unknown_fields() {
        let yaml = r#"
name: my-squad
version: 1.0.0
aios:
  type: squad
  minVersion: 2.1.0
  channel: beta
agents:
  - test-agent
components:
  tasks:
    - a-task.md
"#;
        let manifest = Manifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("my-squad"));
        assert_eq!(manifest.aios_type(), Some("squad"));
        assert_eq!(manifest.aios_min_version(), Some("2.1.0"));
        assert_eq!(manifest.components_of(ComponentKind::Tasks), ["a-task.md"]);
        assert!(manifest.extra.contains_key("agents"));

        let out = manifest.to_yaml_string().unwrap();
        assert!(out.contains("test-agent"));
        assert!(out.contains("channel: beta"));
        assert!(out.contains("minVersion: 2.1.0"));
    }

    #[test]
    fn test_empty_document_is_empty_manifest() {
        assert_eq!(Manifest::from_yaml_str("").unwrap(), Manifest::default());
    }

    #[test]
    fn test_add_component_is_idempotent() {
        let mut manifest = Manifest::default();
        assert!(manifest.add_component(ComponentKind::Agents, "a.md"));
        assert!(!manifest.add_component(ComponentKind::Agents, "a.md"));
        assert_eq!(manifest.components_of(ComponentKind::Agents), ["a.md"]);
        assert!(manifest.components_of(ComponentKind::Tools).is_empty());
    }

    #[tokio::test]
    async fn test_find_manifest_priority() {
        let temp = TempDir::new().unwrap();
        assert!(find_manifest(temp.path()).await.is_none());

        tokio::fs::write(temp.path().join("config.yaml"), "name: x").await.unwrap();
        let found = find_manifest(temp.path()).await.unwrap();
        assert!(found.legacy);

        tokio::fs::write(temp.path().join("squad.yaml"), "name: x").await.unwrap();
        let found = find_manifest(temp.path()).await.unwrap();
        assert!(!found.legacy);
        assert_eq!(found.path, temp.path().join("squad.yaml"));
    }

    #[test]
    fn test_component_kind_names() {
        assert_eq!(ComponentKind::ALL.len(), 8);
        assert_eq!(ComponentKind::from_dir_name("checklists"), Some(ComponentKind::Checklists));
        assert_eq!(ComponentKind::from_dir_name("config"), None);
    }
}
