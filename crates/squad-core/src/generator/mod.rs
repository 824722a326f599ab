//! Squad generator
//!
//! Materializes a squad directory either from one of the built-in templates or
//! from a designer blueprint (see [`SquadGenerator::generate_from_blueprint`]).

mod assets;
mod error;
mod from_blueprint;

pub use assets::StarterFile;
pub use error::{GeneratorError, GeneratorErrorCode, GeneratorResult};
pub use from_blueprint::{
    BlueprintSummary, BlueprintValidation, GenerateFromBlueprintResult, blueprint_to_config,
    generate_agent_from_blueprint, generate_task_from_blueprint, validate_blueprint,
};

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::blueprint::{Blueprint, SquadTemplate};
use crate::config::{DEFAULT_AIOS_MIN_VERSION, DEFAULT_SQUADS_PATH, SquadSettings};
use crate::fsutil;
use crate::manifest::{
    AiosSection, ComponentKind, ConfigMode, Manifest, ManifestConfig, PRIMARY_MANIFEST,
    write_manifest,
};
use crate::naming::{is_kebab_case, to_title_case};

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_LICENSE: &str = "MIT";

/// Parse a template name, failing with `TEMPLATE_NOT_FOUND`.
pub fn parse_template(name: &str) -> GeneratorResult<SquadTemplate> {
    name.parse()
        .map_err(|_| GeneratorError::template_not_found(name))
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub squads_path: PathBuf,
    /// Written to `aios.minVersion`
    pub aios_min_version: String,
    pub verbose: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            aios_min_version: DEFAULT_AIOS_MIN_VERSION.to_string(),
            verbose: false,
        }
    }
}

impl GeneratorOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            squads_path: settings.squads_path.clone(),
            aios_min_version: settings.aios_min_version.clone(),
            verbose: false,
        }
    }
}

/// What to generate
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub name: String,
    pub template: SquadTemplate,
    pub description: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub config_mode: ConfigMode,
    /// Write the template's starter agents
    pub include_agent: bool,
    /// Write the template's starter tasks
    pub include_task: bool,
    /// Regenerate in place when the squad already exists
    pub force: bool,
    blueprint: Option<Box<Blueprint>>,
}

impl GenerateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: SquadTemplate::Basic,
            description: None,
            author: None,
            license: None,
            config_mode: ConfigMode::Extend,
            include_agent: true,
            include_task: true,
            force: false,
            blueprint: None,
        }
    }

    pub fn template(mut self, template: SquadTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn config_mode(mut self, mode: ConfigMode) -> Self {
        self.config_mode = mode;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The blueprint this request was derived from, if any
    pub fn source_blueprint(&self) -> Option<&Blueprint> {
        self.blueprint.as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub path: PathBuf,
    /// Written files relative to the squad root, sorted
    pub files: Vec<String>,
    pub manifest: Manifest,
}

pub struct SquadGenerator {
    squads_path: PathBuf,
    aios_min_version: String,
    verbose: bool,
}

impl SquadGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            squads_path: options.squads_path,
            aios_min_version: options.aios_min_version,
            verbose: options.verbose,
        }
    }

    pub fn squads_path(&self) -> &Path {
        &self.squads_path
    }

    fn log(&self, message: &str) {
        if self.verbose {
            info!("[SquadGenerator] {}", message);
        } else {
            debug!("[SquadGenerator] {}", message);
        }
    }

    /// Create a squad from a template.
    ///
    /// Fails with `SQUAD_EXISTS` when the directory exists and `force` is unset.
    pub async fn generate(&self, request: &GenerateRequest) -> GeneratorResult<GenerateResult> {
        if !is_kebab_case(&request.name) {
            return Err(GeneratorError::invalid_name(&request.name));
        }
        let squad_path = self.squads_path.join(&request.name);
        if fsutil::path_exists(&squad_path).await {
            if !request.force {
                return Err(GeneratorError::squad_exists(&request.name, &squad_path));
            }
            self.log(&format!("Regenerating {} in place", squad_path.display()));
        }

        let description = request
            .description
            .clone()
            .unwrap_or_else(|| format!("{} squad", to_title_case(&request.name)));

        let mut files = Vec::new();
        if request.include_agent {
            files.extend(assets::agent_files(request.template, &request.name));
        }
        if request.include_task {
            files.extend(assets::task_files(request.template));
        }
        files.extend(assets::config_files(request.config_mode, &request.name));
        files.push(StarterFile {
            relative_path: "README.md".to_string(),
            content: assets::readme(&request.name, &description, request.template),
        });

        for kind in ComponentKind::ALL {
            let dir = squad_path.join(kind.dir_name());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| GeneratorError::write_failed(&dir, e))?;
        }

        let mut written = Vec::new();
        for file in &files {
            self.write_file(&squad_path, &file.relative_path, &file.content)
                .await?;
            written.push(file.relative_path.clone());
        }

        for kind in ComponentKind::ALL {
            let prefix = format!("{}/", kind.dir_name());
            if written.iter().any(|f| f.starts_with(&prefix)) {
                continue;
            }
            let dir = squad_path.join(kind.dir_name());
            let populated = fsutil::list_visible_files(&dir)
                .await
                .map(|f| !f.is_empty())
                .unwrap_or(false);
            if !populated {
                let keep = format!("{}.gitkeep", prefix);
                self.write_file(&squad_path, &keep, "").await?;
                written.push(keep);
            }
        }

        let manifest = self.build_manifest(request, &description, &written);
        let manifest_path = squad_path.join(PRIMARY_MANIFEST);
        write_manifest(&manifest_path, &manifest)
            .await
            .map_err(|e| GeneratorError::write_failed(&manifest_path, e))?;
        written.push(PRIMARY_MANIFEST.to_string());
        written.sort();

        self.log(&format!(
            "Generated squad {} ({} files) from template {}",
            request.name,
            written.len(),
            request.template
        ));
        Ok(GenerateResult {
            path: squad_path,
            files: written,
            manifest,
        })
    }

    async fn write_file(&self, root: &Path, relative: &str, content: &str) -> GeneratorResult<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GeneratorError::write_failed(parent, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| GeneratorError::write_failed(&path, e))
    }

    fn build_manifest(&self, request: &GenerateRequest, description: &str, files: &[String]) -> Manifest {
        let mut manifest = Manifest {
            name: Some(request.name.clone()),
            version: Some(DEFAULT_VERSION.to_string()),
            description: Some(description.to_string()),
            author: Some(request.author.clone().unwrap_or_else(|| "Unknown".to_string())),
            license: Some(
                request
                    .license
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LICENSE.to_string()),
            ),
            aios: Some(AiosSection {
                kind: Some("squad".to_string()),
                min_version: Some(self.aios_min_version.clone()),
                extra: Mapping::new(),
            }),
            ..Default::default()
        };

        for file in files {
            let Some((dir, name)) = file.split_once('/') else {
                continue;
            };
            let Some(kind) = ComponentKind::from_dir_name(dir) else {
                continue;
            };
            if !name.starts_with('.') {
                manifest.add_component(kind, name);
            }
        }

        if request.config_mode != ConfigMode::None {
            let mut extra = Mapping::new();
            for file in files.iter().filter(|f| f.starts_with("config/")) {
                let key = file
                    .trim_start_matches("config/")
                    .trim_end_matches(".md")
                    .to_string();
                extra.insert(Value::String(key), Value::String(file.clone()));
            }
            manifest.config = Some(ManifestConfig {
                extends: Some(request.config_mode),
                extra,
            });
        }
        manifest
    }
}

#[cfg(test)]
mod tests;
