//! Squad validation
//!
//! [`SquadValidator`] is the seam the migrator, downloader and publisher use to
//! check a squad on disk. [`ManifestValidator`] is the built-in implementation.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::manifest::{ComponentKind, ManifestReadError, find_manifest, read_manifest};
use crate::naming::{is_kebab_case, is_semver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SquadValidator: Send + Sync {
    /// Validate the squad rooted at `squad_path`.
    ///
    /// `Err` means the validator itself failed, not that the squad is invalid.
    async fn validate(&self, squad_path: &Path) -> anyhow::Result<ValidationReport>;
}

/// Checks the manifest and that the components it lists exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestValidator;

#[async_trait]
impl SquadValidator for ManifestValidator {
    async fn validate(&self, squad_path: &Path) -> anyhow::Result<ValidationReport> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let Some(location) = find_manifest(squad_path).await else {
            errors.push(ValidationIssue::new(format!(
                "No manifest found in {} (expected squad.yaml)",
                squad_path.display()
            )));
            return Ok(ValidationReport::from_issues(errors, warnings));
        };

        if location.legacy {
            warnings.push(ValidationIssue::new(
                "Uses deprecated config.yaml manifest; rename it to squad.yaml",
            ));
        }

        let manifest = match read_manifest(&location.path).await {
            Ok(manifest) => manifest,
            Err(ManifestReadError::Parse(e)) => {
                errors.push(ValidationIssue::new(format!("Invalid YAML in manifest: {}", e)));
                return Ok(ValidationReport::from_issues(errors, warnings));
            }
            Err(ManifestReadError::Io(e)) => return Err(e.into()),
        };

        match manifest.name.as_deref() {
            None => errors.push(ValidationIssue::for_field("name", "Missing required field: name")),
            Some(name) if !is_kebab_case(name) => errors.push(ValidationIssue::for_field(
                "name",
                format!("Squad name '{}' must be kebab-case", name),
            )),
            Some(_) => {}
        }

        match manifest.version.as_deref() {
            None => errors.push(ValidationIssue::for_field(
                "version",
                "Missing required field: version",
            )),
            Some(version) if !is_semver(version) => errors.push(ValidationIssue::for_field(
                "version",
                format!("Version '{}' is not valid semver", version),
            )),
            Some(_) => {}
        }

        match manifest.aios_type() {
            None => errors.push(ValidationIssue::for_field(
                "aios.type",
                "Missing required field: aios.type",
            )),
            Some("squad") => {}
            Some(other) => errors.push(ValidationIssue::for_field(
                "aios.type",
                format!("aios.type must be 'squad', found '{}'", other),
            )),
        }

        if manifest.aios_min_version().is_none() {
            warnings.push(ValidationIssue::for_field(
                "aios.minVersion",
                "Missing aios.minVersion",
            ));
        }
        if manifest.description.is_none() {
            warnings.push(ValidationIssue::for_field("description", "Missing description"));
        }
        if manifest.author.is_none() {
            warnings.push(ValidationIssue::for_field("author", "Missing author"));
        }

        for kind in ComponentKind::ALL {
            for file in manifest.components_of(kind) {
                let path = squad_path.join(kind.dir_name()).join(file);
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    errors.push(ValidationIssue::for_field(
                        format!("components.{}", kind),
                        format!("Listed component not found: {}/{}", kind, file),
                    ));
                }
            }
        }

        for dir in [ComponentKind::Tasks, ComponentKind::Agents] {
            if !tokio::fs::try_exists(squad_path.join(dir.dir_name()))
                .await
                .unwrap_or(false)
            {
                warnings.push(ValidationIssue::new(format!("Missing {}/ directory", dir)));
            }
        }

        Ok(ValidationReport::from_issues(errors, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn squad(manifest: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        tokio::fs::write(temp.path().join("squad.yaml"), manifest).await.unwrap();
        tokio::fs::create_dir_all(temp.path().join("tasks")).await.unwrap();
        tokio::fs::create_dir_all(temp.path().join("agents")).await.unwrap();
        temp
    }

    #[tokio::test]
    async fn test_valid_squad() {
        let temp = squad(
            "name: good-squad\nversion: 1.0.0\ndescription: d\nauthor: a\naios:\n  type: squad\n  minVersion: 2.1.0\n",
        )
        .await;
        let report = ManifestValidator.validate(temp.path()).await.unwrap();
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_invalid() {
        let temp = TempDir::new().unwrap();
        let report = ManifestValidator.validate(temp.path()).await.unwrap();
        assert!(!report.valid);
        assert!(report.errors[0].message.contains("squad.yaml"));
    }

    #[tokio::test]
    async fn test_reports_bad_fields_and_missing_components() {
        let temp = squad(
            "name: Bad_Name\nversion: one\naios:\n  type: plugin\ncomponents:\n  agents:\n    - ghost.md\n",
        )
        .await;
        let report = ManifestValidator.validate(temp.path()).await.unwrap();
        assert!(!report.valid);
        let messages = report.error_messages().join("\n");
        assert!(messages.contains("kebab-case"));
        assert!(messages.contains("semver"));
        assert!(messages.contains("aios.type"));
        assert!(messages.contains("agents/ghost.md"));
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_an_error_not_a_crash() {
        let temp = squad("name: [oops\n").await;
        let report = ManifestValidator.validate(temp.path()).await.unwrap();
        assert!(!report.valid);
        assert!(report.errors[0].message.starts_with("Invalid YAML"));
    }
}
