//! Settings model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SQUADS_PATH: &str = "./squads";
pub const DEFAULT_DESIGNS_PATH: &str = "./squads/.designs";
pub const DEFAULT_AIOS_MIN_VERSION: &str = "2.1.0";

pub const REGISTRY_URL: &str = "https://raw.githubusercontent.com/SynkraAI/aios-squads/main/registry.json";
pub const GITHUB_API_BASE: &str = "https://api.github.com/repos/SynkraAI/aios-squads/contents/packages";
pub const SQUADS_REPO: &str = "SynkraAI/aios-squads";

/// Top-level settings shared by all components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SquadSettings {
    /// Root directory holding local squads
    pub squads_path: PathBuf,
    /// Directory for saved blueprints
    pub designs_path: PathBuf,
    /// Framework version written to `aios.minVersion`
    pub aios_min_version: String,
    pub registry: RegistrySettings,
    pub auth: AuthSettings,
    pub logging: LoggingConfig,
}

impl Default for SquadSettings {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            designs_path: PathBuf::from(DEFAULT_DESIGNS_PATH),
            aios_min_version: DEFAULT_AIOS_MIN_VERSION.to_string(),
            registry: RegistrySettings::default(),
            auth: AuthSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Remote registry and repository settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrySettings {
    pub registry_url: String,
    pub github_api_base: String,
    /// `owner/name` of the squads repository pull requests target
    pub repo: String,
    /// How long a fetched registry stays fresh
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            registry_url: REGISTRY_URL.to_string(),
            github_api_base: GITHUB_API_BASE.to_string(),
            repo: SQUADS_REPO.to_string(),
            cache_ttl_secs: 300,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthSettings {
    /// Hosting CLI used for auth checks and pull requests
    pub cli: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            cli: "gh".to_string(),
        }
    }
}

/// Subscriber settings used by the facade's `init_logging`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` overrides it
    pub level: String,
    /// `compact`, `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}
