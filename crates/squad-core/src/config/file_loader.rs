//! Settings file parsing
//!
//! The format follows the extension: `.toml`, `.yaml`/`.yml` or `.json`.
//! A missing file is not an error; the caller falls back to defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::model::SquadSettings;
use crate::error::{SquadError, SquadResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFormat {
    Toml,
    Yaml,
    Json,
}

impl SettingsFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Read squad settings from `path`, or the defaults when it does not exist.
pub fn load_from_file(path: &Path) -> SquadResult<SquadSettings> {
    let location = path.display().to_string();
    let format = SettingsFormat::of(path).ok_or_else(|| {
        SquadError::config_with_context(
            "Unsupported settings file; use .toml, .yaml, .yml or .json",
            location.clone(),
        )
    })?;

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SquadSettings::default()),
        Err(e) => {
            return Err(SquadError::config_with_context(
                format!("Cannot read squad settings: {}", e),
                location,
            ));
        }
    };

    format.parse(&content).map_err(|reason| {
        SquadError::config_with_context(
            format!("Invalid {} in squad settings: {}", format.label(), reason),
            location,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnifiedError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, SquadSettings::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("squads.toml");
        fs::write(
            &path,
            r#"
squads_path = "/opt/squads"

[registry]
cache_ttl_secs = 60

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let settings = load_from_file(&path).unwrap();
        assert_eq!(settings.squads_path, PathBuf::from("/opt/squads"));
        assert_eq!(settings.registry.cache_ttl_secs, 60);
        assert_eq!(settings.registry.repo, "SynkraAI/aios-squads");
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.aios_min_version, "2.1.0");
    }

    #[test]
    fn test_load_yaml_and_json() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = temp_dir.path().join("squads.yaml");
        fs::write(&yaml, "designs_path: /tmp/designs\nauth:\n  cli: glab\n").unwrap();
        let settings = load_from_file(&yaml).unwrap();
        assert_eq!(settings.designs_path, PathBuf::from("/tmp/designs"));
        assert_eq!(settings.auth.cli, "glab");

        let json = temp_dir.path().join("squads.json");
        fs::write(&json, r#"{"aios_min_version": "3.0.0"}"#).unwrap();
        assert_eq!(load_from_file(&json).unwrap().aios_min_version, "3.0.0");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("squads.ini");
        fs::write(&path, "squads_path=/opt").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains(".toml"));
        assert!(err.context().unwrap().contains("squads.ini"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("squads.YML");
        fs::write(&path, "aios_min_version: 2.5.0\n").unwrap();
        assert_eq!(load_from_file(&path).unwrap().aios_min_version, "2.5.0");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("squads.toml");
        fs::write(&path, "squads_path = [unclosed").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.context().unwrap().contains("squads.toml"));
        assert!(err.to_string().contains("Invalid TOML"));
    }
}
