use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(GeneratorErrorCode {
    InvalidName => "INVALID_NAME",
    SquadExists => "SQUAD_EXISTS",
    TemplateNotFound => "TEMPLATE_NOT_FOUND",
    WriteFailed => "WRITE_FAILED",
    BlueprintNotFound => "BLUEPRINT_NOT_FOUND",
    BlueprintParseError => "BLUEPRINT_PARSE_ERROR",
    BlueprintInvalid => "BLUEPRINT_INVALID",
});

pub type GeneratorError = ComponentError<GeneratorErrorCode>;

pub type GeneratorResult<T> = Result<T, GeneratorError>;

impl GeneratorError {
    pub fn invalid_name(name: &str) -> Self {
        Self::new(
            GeneratorErrorCode::InvalidName,
            format!("Invalid squad name: '{}'", name),
        )
        .with_suggestion("Use kebab-case: lowercase letters, numbers and single hyphens (e.g. my-squad)")
    }

    pub fn squad_exists(name: &str, path: &Path) -> Self {
        Self::new(
            GeneratorErrorCode::SquadExists,
            format!("Squad \"{}\" already exists at {}", name, path.display()),
        )
        .with_suggestion("Choose a different name or remove the existing squad")
        .with_context(path.display().to_string())
    }

    pub fn template_not_found(template: &str) -> Self {
        Self::new(
            GeneratorErrorCode::TemplateNotFound,
            format!("Template \"{}\" not found", template),
        )
        .with_suggestion("Available templates: basic, etl, agent-only")
    }

    pub fn write_failed(path: &Path, err: impl Display) -> Self {
        Self::new(
            GeneratorErrorCode::WriteFailed,
            format!("Failed to write {}: {}", path.display(), err),
        )
        .with_context(path.display().to_string())
    }

    pub fn blueprint_not_found(path: &Path) -> Self {
        Self::new(
            GeneratorErrorCode::BlueprintNotFound,
            format!("Blueprint not found: {}", path.display()),
        )
        .with_suggestion("Run *design-squad to create a blueprint first")
        .with_context(path.display().to_string())
    }

    pub fn blueprint_parse_error(path: &Path, err: impl Display) -> Self {
        Self::new(
            GeneratorErrorCode::BlueprintParseError,
            format!("Failed to parse blueprint {}: {}", path.display(), err),
        )
        .with_suggestion("Check the YAML syntax with a YAML linter")
        .with_context(path.display().to_string())
    }

    pub fn blueprint_invalid(errors: Vec<String>) -> Self {
        Self::new(
            GeneratorErrorCode::BlueprintInvalid,
            format!("Blueprint validation failed: {}", errors.join("; ")),
        )
        .with_suggestion("Fix the listed fields and run the generator again")
        .with_details(errors)
    }
}
