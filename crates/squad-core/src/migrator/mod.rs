//! Squad migrator
//!
//! Upgrades legacy squads to the current layout: `squad.yaml` manifest,
//! required directories and `aios` metadata. Migrations take a backup first,
//! record every action's outcome and re-validate afterwards.

mod actions;
mod error;
mod report;

pub use actions::{ActionExecutor, FsActionExecutor, MigrationAction};
pub use error::{MigratorError, MigratorErrorCode, MigratorResult};
pub use report::generate_report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_AIOS_MIN_VERSION, SquadSettings};
use crate::fsutil;
use crate::manifest::{LEGACY_MANIFEST, Manifest, PRIMARY_MANIFEST, find_manifest};
use crate::validator::{ManifestValidator, SquadValidator, ValidationIssue, ValidationReport};

/// Directories every current squad has
pub const REQUIRED_DIRECTORIES: [&str; 3] = ["tasks", "agents", "config"];

const BACKUP_DIR: &str = ".backup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    LegacyManifest,
    FlatStructure,
    MissingAiosType,
    MissingMinVersion,
    MissingName,
    MissingVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationIssue {
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationAnalysis {
    pub squad_path: PathBuf,
    pub manifest_path: PathBuf,
    pub needs_migration: bool,
    pub issues: Vec<MigrationIssue>,
    pub actions: Vec<MigrationAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    Success,
    Failed,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action: MigrationAction,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Post-migration validation outcome; `error` is set when the validator itself failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ValidationReport> for ValidationOutcome {
    fn from(report: ValidationReport) -> Self {
        Self {
            valid: report.valid,
            errors: report.errors,
            warnings: report.warnings,
            error: None,
        }
    }
}

impl ValidationOutcome {
    pub fn crashed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub success: bool,
    pub message: String,
    pub actions: Vec<ActionRecord>,
    pub backup_path: Option<PathBuf>,
    pub validation: Option<ValidationOutcome>,
}

#[derive(Debug, Clone)]
pub struct MigratorOptions {
    pub verbose: bool,
    /// Value written to `aios.minVersion`
    pub min_version: String,
}

impl Default for MigratorOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            min_version: DEFAULT_AIOS_MIN_VERSION.to_string(),
        }
    }
}

impl MigratorOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            min_version: settings.aios_min_version.clone(),
            ..Default::default()
        }
    }
}

/// Per-call migration switches
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Report the planned actions without touching the squad
    pub dry_run: bool,
}

impl MigrateOptions {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

pub struct SquadMigrator {
    options: MigratorOptions,
    executor: Arc<dyn ActionExecutor>,
    validator: Option<Arc<dyn SquadValidator>>,
}

impl SquadMigrator {
    pub fn new(options: MigratorOptions) -> Self {
        Self {
            options,
            executor: Arc::new(FsActionExecutor),
            validator: Some(Arc::new(ManifestValidator)),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_validator(mut self, validator: Option<Arc<dyn SquadValidator>>) -> Self {
        self.validator = validator;
        self
    }

    fn log(&self, message: &str) {
        if self.options.verbose {
            info!("[SquadMigrator] {}", message);
        } else {
            debug!("[SquadMigrator] {}", message);
        }
    }

    /// Detect what a squad needs and plan the actions that fix it.
    pub async fn analyze(&self, squad_path: &Path) -> MigratorResult<MigrationAnalysis> {
        let metadata = tokio::fs::metadata(squad_path)
            .await
            .map_err(|_| MigratorError::squad_not_found(squad_path))?;
        if !metadata.is_dir() {
            return Err(MigratorError::invalid_path(squad_path));
        }

        let location = find_manifest(squad_path)
            .await
            .ok_or_else(|| MigratorError::no_manifest(squad_path))?;
        let content = tokio::fs::read_to_string(&location.path).await.map_err(|e| {
            MigratorError::migration_failed(format!(
                "Failed to read {}: {}",
                location.path.display(),
                e
            ))
        })?;
        let manifest = Manifest::from_yaml_str(&content).map_err(|e| {
            MigratorError::migration_failed(format!(
                "Invalid YAML in {}: {}",
                location.path.display(),
                e
            ))
            .with_context(location.path.display().to_string())
        })?;

        let mut issues = Vec::new();
        let mut actions = Vec::new();

        if location.legacy {
            issues.push(MigrationIssue {
                kind: IssueType::LegacyManifest,
                message: "Uses deprecated config.yaml manifest (should be squad.yaml)".to_string(),
            });
            actions.push(MigrationAction::RenameManifest {
                from: LEGACY_MANIFEST.to_string(),
                to: PRIMARY_MANIFEST.to_string(),
            });
        }

        let mut missing_dirs = Vec::new();
        for dir in REQUIRED_DIRECTORIES {
            if !fsutil::path_exists(&squad_path.join(dir)).await {
                missing_dirs.push(dir.to_string());
            }
        }
        if !missing_dirs.is_empty() {
            issues.push(MigrationIssue {
                kind: IssueType::FlatStructure,
                message: format!("Missing required directories: {}", missing_dirs.join(", ")),
            });
            actions.push(MigrationAction::CreateDirectories {
                directories: missing_dirs,
            });
            actions.extend(self.plan_file_moves(squad_path).await);
        }

        if manifest.aios_type().is_none() {
            issues.push(MigrationIssue {
                kind: IssueType::MissingAiosType,
                message: "Missing aios.type field".to_string(),
            });
            actions.push(add_field("aios.type", "squad"));
        }
        if manifest.aios_min_version().is_none() {
            issues.push(MigrationIssue {
                kind: IssueType::MissingMinVersion,
                message: "Missing aios.minVersion field".to_string(),
            });
            actions.push(add_field("aios.minVersion", &self.options.min_version));
        }
        if manifest.name.is_none() {
            issues.push(MigrationIssue {
                kind: IssueType::MissingName,
                message: "Missing name field".to_string(),
            });
            let dir_name = squad_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "squad".to_string());
            actions.push(add_field("name", &dir_name));
        }
        if manifest.version.is_none() {
            issues.push(MigrationIssue {
                kind: IssueType::MissingVersion,
                message: "Missing version field".to_string(),
            });
            actions.push(add_field("version", "1.0.0"));
        }

        self.log(&format!(
            "{}: {} issue(s), {} action(s)",
            squad_path.display(),
            issues.len(),
            actions.len()
        ));

        Ok(MigrationAnalysis {
            squad_path: squad_path.to_path_buf(),
            manifest_path: location.path,
            needs_migration: !issues.is_empty(),
            issues,
            actions,
        })
    }

    /// Root-level `*-agent.md` / `*-task.md` files belong in their directories.
    async fn plan_file_moves(&self, squad_path: &Path) -> Vec<MigrationAction> {
        let files = fsutil::list_visible_files(squad_path).await.unwrap_or_default();
        files
            .into_iter()
            .filter_map(|file| {
                let stem = file.strip_suffix(".md")?;
                let dir = if stem.ends_with("-agent") || stem.starts_with("agent-") {
                    "agents"
                } else if stem.ends_with("-task") || stem.starts_with("task-") {
                    "tasks"
                } else {
                    return None;
                };
                Some(MigrationAction::MoveFile {
                    to: format!("{}/{}", dir, file),
                    from: file,
                })
            })
            .collect()
    }

    /// Copy the squad into `.backup/pre-migration-<timestamp>/`.
    pub async fn create_backup(&self, squad_path: &Path) -> MigratorResult<PathBuf> {
        let backup_root = squad_path.join(BACKUP_DIR);
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string();
        let mut backup_path = backup_root.join(format!("pre-migration-{}", stamp));
        let mut attempt = 1;
        while fsutil::path_exists(&backup_path).await {
            backup_path = backup_root.join(format!("pre-migration-{}-{}", stamp, attempt));
            attempt += 1;
        }

        fsutil::copy_dir(squad_path, &backup_path, &[BACKUP_DIR])
            .map_err(|e| MigratorError::backup_failed(&backup_path, e))?;
        self.log(&format!("Backup created at {}", backup_path.display()));
        Ok(backup_path)
    }

    pub async fn execute_action(
        &self,
        squad_path: &Path,
        action: &MigrationAction,
    ) -> MigratorResult<()> {
        self.log(&format!("Executing: {}", action.describe()));
        self.executor
            .execute(squad_path, action)
            .await
            .map_err(|e| MigratorError::migration_failed(format!("{}: {:#}", action.describe(), e)))
    }

    /// Execute an action given as a loose JSON document.
    pub async fn execute_raw_action(
        &self,
        squad_path: &Path,
        action: &serde_json::Value,
    ) -> MigratorResult<()> {
        let type_name = action
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("<missing>");
        let parsed: MigrationAction = serde_json::from_value(action.clone()).map_err(|_| {
            MigratorError::migration_failed(format!("Unknown action type: {}", type_name))
        })?;
        self.execute_action(squad_path, &parsed).await
    }

    pub async fn migrate(
        &self,
        squad_path: &Path,
        options: MigrateOptions,
    ) -> MigratorResult<MigrationResult> {
        let analysis = self.analyze(squad_path).await?;

        if !analysis.needs_migration {
            return Ok(MigrationResult {
                success: true,
                message: "Squad is already up to date".to_string(),
                actions: Vec::new(),
                backup_path: None,
                validation: None,
            });
        }

        if options.dry_run {
            let actions: Vec<ActionRecord> = analysis
                .actions
                .into_iter()
                .map(|action| ActionRecord {
                    action,
                    status: ActionStatus::DryRun,
                    error: None,
                })
                .collect();
            return Ok(MigrationResult {
                success: true,
                message: format!("Dry-run: {} action(s) would be executed", actions.len()),
                actions,
                backup_path: None,
                validation: None,
            });
        }

        let backup_path = self.create_backup(squad_path).await?;

        let mut records = Vec::with_capacity(analysis.actions.len());
        for action in analysis.actions {
            let record = match self.execute_action(squad_path, &action).await {
                Ok(()) => ActionRecord {
                    action,
                    status: ActionStatus::Success,
                    error: None,
                },
                Err(e) => {
                    warn!("[SquadMigrator] {}", e.message);
                    ActionRecord {
                        action,
                        status: ActionStatus::Failed,
                        error: Some(e.message),
                    }
                }
            };
            records.push(record);
        }

        let validation = match &self.validator {
            Some(validator) => Some(match validator.validate(squad_path).await {
                Ok(report) => ValidationOutcome::from(report),
                Err(e) => ValidationOutcome::crashed(e.to_string()),
            }),
            None => None,
        };

        let failed = records
            .iter()
            .filter(|r| r.status == ActionStatus::Failed)
            .count();
        let message = if failed == 0 {
            format!("Migration completed: {} action(s) applied", records.len())
        } else {
            format!("Migration finished with {} failed action(s)", failed)
        };

        Ok(MigrationResult {
            success: failed == 0,
            message,
            actions: records,
            backup_path: Some(backup_path),
            validation,
        })
    }
}

fn add_field(path: &str, value: &str) -> MigrationAction {
    MigrationAction::AddField {
        path: path.to_string(),
        value: Value::String(value.to_string()),
    }
}
