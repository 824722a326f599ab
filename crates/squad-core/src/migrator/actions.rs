//! Migration actions and their execution

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::fsutil;
use crate::manifest::find_manifest;

/// One planned, atomic migration step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationAction {
    RenameManifest { from: String, to: String },
    CreateDirectories { directories: Vec<String> },
    /// Set a dotted `path` in the manifest
    AddField { path: String, value: Value },
    MoveFile { from: String, to: String },
}

impl MigrationAction {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RenameManifest { .. } => "RENAME_MANIFEST",
            Self::CreateDirectories { .. } => "CREATE_DIRECTORIES",
            Self::AddField { .. } => "ADD_FIELD",
            Self::MoveFile { .. } => "MOVE_FILE",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::RenameManifest { from, to } => format!("Rename {} \u{2192} {}", from, to),
            Self::CreateDirectories { directories } => {
                format!("Create directories: {}", directories.join(", "))
            }
            Self::AddField { path, value } => {
                let rendered = serde_yaml::to_string(value)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_default();
                format!("Add field {} = {}", path, rendered)
            }
            Self::MoveFile { from, to } => format!("Move {} \u{2192} {}", from, to),
        }
    }
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, squad_path: &Path, action: &MigrationAction) -> anyhow::Result<()>;
}

/// Applies actions to the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsActionExecutor;

#[async_trait]
impl ActionExecutor for FsActionExecutor {
    async fn execute(&self, squad_path: &Path, action: &MigrationAction) -> anyhow::Result<()> {
        match action {
            MigrationAction::RenameManifest { from, to } => {
                let source = contained(squad_path, from)?;
                let target = contained(squad_path, to)?;
                if fsutil::path_exists(&target).await {
                    bail!("{} already exists", to);
                }
                tokio::fs::rename(&source, &target)
                    .await
                    .with_context(|| format!("Failed to rename {} to {}", from, to))
            }
            MigrationAction::CreateDirectories { directories } => {
                for dir in directories {
                    let path = contained(squad_path, dir)?;
                    tokio::fs::create_dir_all(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", dir))?;
                }
                Ok(())
            }
            MigrationAction::AddField { path, value } => {
                let location = find_manifest(squad_path)
                    .await
                    .context("No manifest to update")?;
                let content = tokio::fs::read_to_string(&location.path)
                    .await
                    .with_context(|| format!("Failed to read {}", location.path.display()))?;
                let mut doc: Value = serde_yaml::from_str(&content)
                    .with_context(|| format!("Invalid YAML in {}", location.path.display()))?;
                set_path(&mut doc, path, value.clone())?;
                let yaml = serde_yaml::to_string(&doc)?;
                fsutil::write_atomic(&location.path, yaml)
                    .await
                    .with_context(|| format!("Failed to write {}", location.path.display()))
            }
            MigrationAction::MoveFile { from, to } => {
                let source = contained(squad_path, from)?;
                let target = contained(squad_path, to)?;
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::rename(&source, &target)
                    .await
                    .with_context(|| format!("Failed to move {} to {}", from, to))
            }
        }
    }
}

/// Resolve a relative path inside the squad, rejecting anything that escapes it.
fn contained(squad_path: &Path, relative: &str) -> anyhow::Result<PathBuf> {
    let rel = Path::new(relative);
    if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        bail!("Refusing path outside the squad directory: {}", relative);
    }
    Ok(squad_path.join(rel))
}

/// Set a dotted key path, creating intermediate mappings.
fn set_path(doc: &mut Value, path: &str, value: Value) -> anyhow::Result<()> {
    if doc.is_null() {
        *doc = Value::Mapping(Mapping::new());
    }
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Value::Mapping(map) = current else {
            bail!("Cannot set {}: parent is not a mapping", path);
        };
        let key = Value::String(segment.to_string());
        if segments.peek().is_none() {
            map.insert(key, value);
            return Ok(());
        }
        current = map
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if current.is_null() {
            *current = Value::Mapping(Mapping::new());
        }
    }
    Ok(())
}
