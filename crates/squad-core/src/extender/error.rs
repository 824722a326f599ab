use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(ExtenderErrorCode {
    SquadNotFound => "SQUAD_NOT_FOUND",
    ManifestNotFound => "MANIFEST_NOT_FOUND",
    ComponentExists => "COMPONENT_EXISTS",
    InvalidComponentName => "INVALID_COMPONENT_NAME",
    InvalidComponentType => "INVALID_COMPONENT_TYPE",
    AgentNotFound => "AGENT_NOT_FOUND",
    PathTraversal => "PATH_TRAVERSAL",
    WriteFailed => "WRITE_FAILED",
});

pub type ExtenderError = ComponentError<ExtenderErrorCode>;

pub type ExtenderResult<T> = Result<T, ExtenderError>;

impl ExtenderError {
    pub fn squad_not_found(name: &str) -> Self {
        Self::new(
            ExtenderErrorCode::SquadNotFound,
            format!("Squad \"{}\" not found", name),
        )
        .with_suggestion("Use *list-squads to see available squads")
    }

    pub fn manifest_not_found(squad_path: &Path) -> Self {
        Self::new(
            ExtenderErrorCode::ManifestNotFound,
            format!("No squad.yaml found in {}", squad_path.display()),
        )
        .with_suggestion("Run *migrate-squad or create a squad.yaml manifest")
        .with_context(squad_path.display().to_string())
    }

    pub fn component_exists(relative_path: &str) -> Self {
        Self::new(
            ExtenderErrorCode::ComponentExists,
            format!("Component already exists: {}", relative_path),
        )
        .with_suggestion("Use --force to overwrite (the current file is kept as .bak)")
    }

    pub fn invalid_component_name(name: &str) -> Self {
        Self::new(
            ExtenderErrorCode::InvalidComponentName,
            format!("Invalid component name: '{}'", name),
        )
        .with_suggestion("Use kebab-case: lowercase letters, numbers and single hyphens (e.g. my-component)")
    }

    pub fn invalid_component_type(kind: &str, valid: &[&str]) -> Self {
        Self::new(
            ExtenderErrorCode::InvalidComponentType,
            format!("Invalid component type: '{}'", kind),
        )
        .with_suggestion(format!("Valid types: {}", valid.join(", ")))
    }

    pub fn agent_not_found(agent_id: Option<&str>, available: &[String]) -> Self {
        let message = match agent_id {
            Some(id) => format!("Agent \"{}\" not found", id),
            None => "Task components require an agent id".to_string(),
        };
        let suggestion = if available.is_empty() {
            "Add an agent first with --add agent".to_string()
        } else {
            format!("Available agents: {}", available.join(", "))
        };
        Self::new(ExtenderErrorCode::AgentNotFound, message).with_suggestion(suggestion)
    }

    pub fn path_traversal(name: &str) -> Self {
        Self::new(
            ExtenderErrorCode::PathTraversal,
            format!("Component name must not contain path separators or '..': '{}'", name),
        )
        .with_suggestion("Use a plain kebab-case name")
    }

    pub fn write_failed(path: &Path, err: impl Display) -> Self {
        Self::new(
            ExtenderErrorCode::WriteFailed,
            format!("Failed to write {}: {}", path.display(), err),
        )
        .with_context(path.display().to_string())
    }
}
