use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(MigratorErrorCode {
    SquadNotFound => "SQUAD_NOT_FOUND",
    NoManifest => "NO_MANIFEST",
    BackupFailed => "BACKUP_FAILED",
    MigrationFailed => "MIGRATION_FAILED",
    ValidationFailed => "VALIDATION_FAILED",
    InvalidPath => "INVALID_PATH",
});

pub type MigratorError = ComponentError<MigratorErrorCode>;

pub type MigratorResult<T> = Result<T, MigratorError>;

impl MigratorError {
    pub fn squad_not_found(path: &Path) -> Self {
        Self::new(
            MigratorErrorCode::SquadNotFound,
            format!("Squad not found at {}", path.display()),
        )
        .with_suggestion("Check the squad path or use *list-squads")
        .with_context(path.display().to_string())
    }

    pub fn no_manifest(path: &Path) -> Self {
        Self::new(
            MigratorErrorCode::NoManifest,
            format!("No squad.yaml or config.yaml found in {}", path.display()),
        )
        .with_suggestion("Create a squad.yaml manifest before migrating")
        .with_context(path.display().to_string())
    }

    pub fn backup_failed(path: &Path, err: impl Display) -> Self {
        Self::new(
            MigratorErrorCode::BackupFailed,
            format!("Failed to create backup at {}: {}", path.display(), err),
        )
        .with_suggestion("Check disk space and write permissions on the squad directory")
        .with_context(path.display().to_string())
    }

    pub fn migration_failed(message: impl Into<String>) -> Self {
        Self::new(MigratorErrorCode::MigrationFailed, message)
    }

    pub fn invalid_path(path: &Path) -> Self {
        Self::new(
            MigratorErrorCode::InvalidPath,
            format!("Not a squad directory: {}", path.display()),
        )
        .with_context(path.display().to_string())
    }
}
