use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(DesignerErrorCode {
    NoDocumentation => "NO_DOCUMENTATION",
    ParseError => "PARSE_ERROR",
    EmptyAnalysis => "EMPTY_ANALYSIS",
    BlueprintExists => "BLUEPRINT_EXISTS",
    SaveFailed => "SAVE_FAILED",
});

pub type DesignerError = ComponentError<DesignerErrorCode>;

pub type DesignerResult<T> = Result<T, DesignerError>;

impl DesignerError {
    pub fn no_documentation() -> Self {
        Self::new(
            DesignerErrorCode::NoDocumentation,
            "No documentation provided",
        )
        .with_suggestion("Pass inline text or one or more files with --docs")
    }

    pub fn parse_error(path: &Path, err: impl Display) -> Self {
        Self::new(
            DesignerErrorCode::ParseError,
            format!("Failed to parse {}: {}", path.display(), err),
        )
        .with_context(path.display().to_string())
    }

    pub fn empty_analysis() -> Self {
        Self::new(
            DesignerErrorCode::EmptyAnalysis,
            "No entities, workflows, integrations or stakeholders found in the documentation",
        )
        .with_suggestion("Provide more detailed documentation describing what the system does and who uses it")
    }

    pub fn blueprint_exists(path: &Path) -> Self {
        Self::new(
            DesignerErrorCode::BlueprintExists,
            format!("Blueprint already exists: {}", path.display()),
        )
        .with_suggestion("Use --force to overwrite or choose another output path")
        .with_context(path.display().to_string())
    }

    pub fn save_failed(path: &Path, err: impl Display) -> Self {
        Self::new(
            DesignerErrorCode::SaveFailed,
            format!("Failed to save blueprint {}: {}", path.display(), err),
        )
        .with_context(path.display().to_string())
    }
}
