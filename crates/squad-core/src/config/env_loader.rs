//! Environment variable overrides (`SQUAD_*`)

use super::model::SquadSettings;
use crate::error::SquadResult;
use std::env;
use std::path::PathBuf;

/// Apply `SQUAD_*` environment variables from the process environment
pub fn apply_env(settings: &mut SquadSettings) -> SquadResult<()> {
    apply_env_with(settings, |key| env::var(key).ok())
}

/// Apply overrides using an arbitrary variable lookup
pub fn apply_env_with<F>(settings: &mut SquadSettings, lookup: F) -> SquadResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("SQUAD_SQUADS_PATH") {
        settings.squads_path = PathBuf::from(path);
    }
    if let Some(path) = lookup("SQUAD_DESIGNS_PATH") {
        settings.designs_path = PathBuf::from(path);
    }
    if let Some(version) = lookup("SQUAD_AIOS_MIN_VERSION") {
        settings.aios_min_version = version;
    }
    if let Some(url) = lookup("SQUAD_REGISTRY_URL") {
        settings.registry.registry_url = url;
    }
    if let Some(base) = lookup("SQUAD_GITHUB_API_BASE") {
        settings.registry.github_api_base = base;
    }
    if let Some(repo) = lookup("SQUAD_REPO") {
        settings.registry.repo = repo;
    }
    if let Some(cli) = lookup("SQUAD_AUTH_CLI") {
        settings.auth.cli = cli;
    }
    if let Some(level) = lookup("SQUAD_LOG_LEVEL") {
        settings.logging.level = level;
    }
    Ok(())
}
