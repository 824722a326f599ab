use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};
use crate::loader::{LoaderError, LoaderErrorCode};

error_codes!(AnalyzerErrorCode {
    SquadNotFound => "SQUAD_NOT_FOUND",
    ManifestNotFound => "MANIFEST_NOT_FOUND",
    YamlParseError => "YAML_PARSE_ERROR",
    AnalysisFailed => "ANALYSIS_FAILED",
});

pub type AnalyzerError = ComponentError<AnalyzerErrorCode>;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

impl AnalyzerError {
    pub fn squad_not_found(name: &str) -> Self {
        Self::new(
            AnalyzerErrorCode::SquadNotFound,
            format!("Squad \"{}\" not found", name),
        )
        .with_suggestion("Use *list-squads to see available squads")
    }

    pub fn manifest_not_found(squad_path: &Path) -> Self {
        Self::new(
            AnalyzerErrorCode::ManifestNotFound,
            format!("No squad.yaml or config.yaml found in {}", squad_path.display()),
        )
        .with_suggestion("Create a squad.yaml manifest or run *migrate-squad")
        .with_context(squad_path.display().to_string())
    }

    /// Re-badge a loader failure for squad `name`.
    pub fn from_loader(err: LoaderError, name: &str) -> Self {
        match err.code {
            LoaderErrorCode::SquadNotFound => Self::squad_not_found(name),
            LoaderErrorCode::ManifestNotFound => {
                let squad_path = err.context.unwrap_or_else(|| name.to_string());
                Self::manifest_not_found(Path::new(&squad_path))
            }
            LoaderErrorCode::YamlParseError => {
                let mut mapped = Self::new(AnalyzerErrorCode::YamlParseError, err.message)
                    .with_suggestion("Check the YAML syntax with a YAML linter");
                mapped.context = err.context;
                mapped
            }
            LoaderErrorCode::PermissionDenied => Self::analysis_failed(err.message),
        }
    }

    pub fn analysis_failed(reason: impl Display) -> Self {
        Self::new(
            AnalyzerErrorCode::AnalysisFailed,
            format!("Analysis failed: {}", reason),
        )
    }
}
