use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(LoaderErrorCode {
    SquadNotFound => "SQUAD_NOT_FOUND",
    ManifestNotFound => "MANIFEST_NOT_FOUND",
    YamlParseError => "YAML_PARSE_ERROR",
    PermissionDenied => "PERMISSION_DENIED",
});

pub type LoaderError = ComponentError<LoaderErrorCode>;

pub type LoaderResult<T> = Result<T, LoaderError>;

impl LoaderError {
    pub fn squad_not_found(name: &str, squads_path: &Path) -> Self {
        Self::new(
            LoaderErrorCode::SquadNotFound,
            format!("Squad \"{}\" not found in {}", name, squads_path.display()),
        )
        .with_suggestion(format!("Create it with: @squad-creator *create-squad {}", name))
        .with_context(squads_path.join(name).display().to_string())
    }

    pub fn manifest_not_found(squad_path: &Path) -> Self {
        Self::new(
            LoaderErrorCode::ManifestNotFound,
            format!("No manifest found in {}", squad_path.display()),
        )
        .with_suggestion("Create a squad.yaml manifest in the squad directory")
        .with_context(squad_path.display().to_string())
    }

    pub fn yaml_parse_error(path: &Path, err: impl Display) -> Self {
        Self::new(
            LoaderErrorCode::YamlParseError,
            format!("Failed to parse {}: {}", path.display(), err),
        )
        .with_suggestion("Check the YAML syntax, a YAML linter will point at the offending line")
        .with_context(path.display().to_string())
    }

    pub fn permission_denied(path: &Path) -> Self {
        Self::new(
            LoaderErrorCode::PermissionDenied,
            format!("Permission denied reading {}", path.display()),
        )
        .with_suggestion(format!("Check file permissions: chmod 644 {}", path.display()))
        .with_context(path.display().to_string())
    }
}
