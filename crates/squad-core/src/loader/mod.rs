//! Squad loader
//!
//! Resolves squads by name under the squads root and reads their manifests,
//! falling back to the deprecated `config.yaml`.

mod error;

pub use error::{LoaderError, LoaderErrorCode, LoaderResult};

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_SQUADS_PATH, SquadSettings};
use crate::fsutil;
use crate::manifest::{
    LEGACY_MANIFEST, Manifest, ManifestReadError, PRIMARY_MANIFEST, find_manifest, read_manifest,
};

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub squads_path: PathBuf,
    pub verbose: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            verbose: false,
        }
    }
}

impl LoaderOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            squads_path: settings.squads_path.clone(),
            verbose: false,
        }
    }
}

/// A squad directory resolved by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadLocation {
    pub name: String,
    pub path: PathBuf,
    pub manifest_path: PathBuf,
}

/// A parsed manifest plus what the loader noticed while reading it
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub legacy: bool,
    pub warnings: Vec<String>,
}

pub struct SquadLoader {
    squads_path: PathBuf,
    verbose: bool,
}

impl SquadLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            squads_path: options.squads_path,
            verbose: options.verbose,
        }
    }

    pub fn squads_path(&self) -> &Path {
        &self.squads_path
    }

    fn log(&self, message: &str) {
        if self.verbose {
            info!("[SquadLoader] {}", message);
        } else {
            debug!("[SquadLoader] {}", message);
        }
    }

    /// Resolve a squad directory by name.
    ///
    /// Fails with `MANIFEST_NOT_FOUND` when the directory exists but holds
    /// neither `squad.yaml` nor `config.yaml`.
    pub async fn resolve(&self, name: &str) -> LoaderResult<SquadLocation> {
        let path = self.squads_path.join(name);
        self.log(&format!("Resolving squad '{}' at {}", name, path.display()));

        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(LoaderError::squad_not_found(name, &self.squads_path));
        }

        let manifest_path = find_manifest(&path)
            .await
            .map(|location| location.path)
            .ok_or_else(|| LoaderError::manifest_not_found(&path))?;

        Ok(SquadLocation {
            name: name.to_string(),
            path,
            manifest_path,
        })
    }

    /// Read and parse the manifest of the squad at `squad_path`.
    pub async fn load_manifest(&self, squad_path: &Path) -> LoaderResult<LoadedManifest> {
        let location = find_manifest(squad_path)
            .await
            .ok_or_else(|| LoaderError::manifest_not_found(squad_path))?;

        let mut warnings = Vec::new();
        if location.legacy {
            let notice = format!(
                "DEPRECATED: {} uses {}; rename it to {}",
                squad_path.display(),
                LEGACY_MANIFEST,
                PRIMARY_MANIFEST
            );
            warn!("[SquadLoader] {}", notice);
            warnings.push(notice);
        }

        let manifest = read_manifest(&location.path)
            .await
            .map_err(|e| match e {
                ManifestReadError::Io(io_err) => map_io_error(&location.path, squad_path, io_err),
                ManifestReadError::Parse(parse_err) => {
                    LoaderError::yaml_parse_error(&location.path, parse_err)
                }
            })?;

        self.log(&format!("Loaded manifest {}", location.path.display()));

        Ok(LoadedManifest {
            manifest,
            manifest_path: location.path,
            legacy: location.legacy,
            warnings,
        })
    }

    /// Enumerate local squads whose manifest loads cleanly, sorted by name.
    pub async fn list_local(&self) -> LoaderResult<Vec<SquadLocation>> {
        let mut entries = match tokio::fs::read_dir(&self.squads_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.log(&format!("Squads root {} does not exist", self.squads_path.display()));
                return Ok(Vec::new());
            }
            Err(e) => return Err(map_io_error(&self.squads_path, &self.squads_path, e)),
        };

        let mut squads = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| map_io_error(&self.squads_path, &self.squads_path, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            match self.load_manifest(&path).await {
                Ok(loaded) => squads.push(SquadLocation {
                    name,
                    path,
                    manifest_path: loaded.manifest_path,
                }),
                Err(e) => debug!("[SquadLoader] Skipping {}: {}", name, e.message),
            }
        }

        squads.sort_by(|a, b| a.name.cmp(&b.name));
        self.log(&format!("Found {} local squad(s)", squads.len()));
        Ok(squads)
    }

    /// Whether a squad directory with this name exists.
    pub async fn exists(&self, name: &str) -> bool {
        fsutil::path_exists(&self.squads_path.join(name)).await
    }
}

fn map_io_error(path: &Path, squad_path: &Path, err: io::Error) -> LoaderError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => LoaderError::permission_denied(path),
        _ => LoaderError::manifest_not_found(squad_path).with_context(err.to_string()),
    }
}

#[cfg(test)]
mod tests;
