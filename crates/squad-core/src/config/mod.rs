//! Settings for the squad toolchain
//!
//! Precedence: built-in defaults, then the user settings file, then
//! `SQUAD_*` environment variables.

mod env_loader;
mod file_loader;
mod model;

pub use env_loader::{apply_env, apply_env_with};
pub use file_loader::load_from_file;
pub use model::{
    AuthSettings, DEFAULT_AIOS_MIN_VERSION, DEFAULT_DESIGNS_PATH, DEFAULT_SQUADS_PATH,
    GITHUB_API_BASE, LoggingConfig, REGISTRY_URL, RegistrySettings, SQUADS_REPO, SquadSettings,
};

use crate::error::SquadResult;

impl SquadSettings {
    /// Load settings with the full precedence chain.
    pub fn load() -> SquadResult<Self> {
        let mut settings = match Self::user_config_path() {
            Some(path) => load_from_file(&path)?,
            None => Self::default(),
        };
        apply_env(&mut settings)?;
        Ok(settings)
    }

    /// `~/.aios/squads.toml`
    pub fn user_config_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|home| home.join(".aios").join("squads.toml"))
    }
}
