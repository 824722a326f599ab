//! Squad extender
//!
//! Adds a single component file to an existing squad and records it in the
//! manifest.

mod error;

pub use error::{ExtenderError, ExtenderErrorCode, ExtenderResult};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{DEFAULT_SQUADS_PATH, SquadSettings};
use crate::fsutil;
use crate::manifest::{ComponentKind, ManifestReadError, find_manifest, read_manifest, write_manifest};
use crate::naming::{is_kebab_case, to_title_case};
use crate::templates::{self, AgentDoc, TaskDoc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Agent,
    Task,
    Workflow,
    Checklist,
    Template,
    Tool,
    Script,
    Data,
}

/// Directory and file extension for one component type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentConfig {
    pub directory: ComponentKind,
    pub extension: &'static str,
}

impl ComponentType {
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Agent,
        ComponentType::Task,
        ComponentType::Workflow,
        ComponentType::Checklist,
        ComponentType::Template,
        ComponentType::Tool,
        ComponentType::Script,
        ComponentType::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Task => "task",
            Self::Workflow => "workflow",
            Self::Checklist => "checklist",
            Self::Template => "template",
            Self::Tool => "tool",
            Self::Script => "script",
            Self::Data => "data",
        }
    }

    pub fn config(&self) -> ComponentConfig {
        let (directory, extension) = match self {
            Self::Agent => (ComponentKind::Agents, ".md"),
            Self::Task => (ComponentKind::Tasks, ".md"),
            Self::Workflow => (ComponentKind::Workflows, ".yaml"),
            Self::Checklist => (ComponentKind::Checklists, ".md"),
            Self::Template => (ComponentKind::Templates, ".md"),
            Self::Tool => (ComponentKind::Tools, ".js"),
            Self::Script => (ComponentKind::Scripts, ".js"),
            Self::Data => (ComponentKind::Data, ".yaml"),
        };
        ComponentConfig {
            directory,
            extension,
        }
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(ComponentType::as_str).collect()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = ExtenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ExtenderError::invalid_component_type(s, &Self::names()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRequest {
    pub component_type: String,
    pub name: String,
    /// Owning agent; required for tasks
    pub agent_id: Option<String>,
    pub description: Option<String>,
}

impl ComponentRequest {
    pub fn new(component_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// Overwrite an existing file after backing it up
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComponentResult {
    pub component_type: ComponentType,
    pub file_name: String,
    pub file_path: PathBuf,
    pub relative_path: String,
    pub manifest_updated: bool,
    pub backup_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ExtenderOptions {
    pub squads_path: PathBuf,
    pub verbose: bool,
}

impl Default for ExtenderOptions {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            verbose: false,
        }
    }
}

impl ExtenderOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            squads_path: settings.squads_path.clone(),
            verbose: false,
        }
    }
}

pub struct SquadExtender {
    squads_path: PathBuf,
    verbose: bool,
}

impl SquadExtender {
    pub fn new(options: ExtenderOptions) -> Self {
        Self {
            squads_path: options.squads_path,
            verbose: options.verbose,
        }
    }

    fn log(&self, message: &str) {
        if self.verbose {
            info!("[SquadExtender] {}", message);
        } else {
            debug!("[SquadExtender] {}", message);
        }
    }

    pub async fn add_component(
        &self,
        squad_name: &str,
        request: &ComponentRequest,
        options: AddOptions,
    ) -> ExtenderResult<AddComponentResult> {
        let component_type: ComponentType = request.component_type.parse()?;
        validate_name(&request.name)?;
        if let Some(agent_id) = &request.agent_id {
            validate_name(agent_id)?;
        }

        let squad_path = self.squads_path.join(squad_name);
        if !fsutil::path_exists(&squad_path).await {
            return Err(ExtenderError::squad_not_found(squad_name));
        }
        let manifest = find_manifest(&squad_path)
            .await
            .ok_or_else(|| ExtenderError::manifest_not_found(&squad_path))?;
        self.log(&format!("Using manifest {}", manifest.path.display()));

        let config = component_type.config();
        let file_name = if component_type == ComponentType::Task {
            let agents = self.list_agents(&squad_path).await?;
            let agent_id = match &request.agent_id {
                Some(id) if agents.iter().any(|a| a == id) => id,
                other => return Err(ExtenderError::agent_not_found(other.as_deref(), &agents)),
            };
            format!("{}-{}{}", agent_id, request.name, config.extension)
        } else {
            format!("{}{}", request.name, config.extension)
        };

        let dir = squad_path.join(config.directory.dir_name());
        let file_path = dir.join(&file_name);
        let relative_path = format!("{}/{}", config.directory, file_name);

        let mut backup_path = None;
        if fsutil::path_exists(&file_path).await {
            if !options.force {
                return Err(ExtenderError::component_exists(&relative_path));
            }
            let backup = dir.join(format!("{}.bak", file_name));
            tokio::fs::copy(&file_path, &backup)
                .await
                .map_err(|e| ExtenderError::write_failed(&backup, e))?;
            self.log(&format!("Backed up {} to {}", relative_path, backup.display()));
            backup_path = Some(backup);
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ExtenderError::write_failed(&dir, e))?;
        let content = render_component(component_type, request, squad_name);
        tokio::fs::write(&file_path, content)
            .await
            .map_err(|e| ExtenderError::write_failed(&file_path, e))?;
        self.log(&format!("Created {}", relative_path));

        let manifest_updated = self
            .update_manifest(&squad_path, config.directory, &file_name)
            .await?;

        Ok(AddComponentResult {
            component_type,
            file_name,
            file_path,
            relative_path,
            manifest_updated,
            backup_path,
        })
    }

    /// Record `file_name` under `components.<kind>`.
    ///
    /// Returns `false` when the file was already listed.
    pub async fn update_manifest(
        &self,
        squad_path: &Path,
        kind: ComponentKind,
        file_name: &str,
    ) -> ExtenderResult<bool> {
        let location = find_manifest(squad_path)
            .await
            .ok_or_else(|| ExtenderError::manifest_not_found(squad_path))?;
        let mut manifest = read_manifest(&location.path).await.map_err(|e| match e {
            ManifestReadError::Parse(err) => {
                ExtenderError::write_failed(&location.path, format!("invalid manifest: {}", err))
            }
            ManifestReadError::Io(err) => ExtenderError::write_failed(&location.path, err),
        })?;

        if !manifest.add_component(kind, file_name) {
            self.log(&format!("{}/{} already listed in manifest", kind, file_name));
            return Ok(false);
        }

        write_manifest(&location.path, &manifest)
            .await
            .map_err(|e| ExtenderError::write_failed(&location.path, e))?;
        Ok(true)
    }

    /// Agent ids (file stems under `agents/`), sorted. Missing directory yields none.
    pub async fn list_agents(&self, squad_path: &Path) -> ExtenderResult<Vec<String>> {
        let dir = squad_path.join(ComponentKind::Agents.dir_name());
        let files = fsutil::list_visible_files(&dir)
            .await
            .map_err(|e| ExtenderError::write_failed(&dir, e))?;
        Ok(files
            .into_iter()
            .filter_map(|f| f.strip_suffix(".md").map(str::to_string))
            .collect())
    }
}

fn validate_name(name: &str) -> ExtenderResult<()> {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ExtenderError::path_traversal(name));
    }
    if !is_kebab_case(name) {
        return Err(ExtenderError::invalid_component_name(name));
    }
    Ok(())
}

fn render_component(kind: ComponentType, request: &ComponentRequest, squad: &str) -> String {
    let name = request.name.as_str();
    let description = request
        .description
        .clone()
        .unwrap_or_else(|| format!("{} {}", to_title_case(name), kind));

    match kind {
        ComponentType::Agent => templates::agent_markdown(&AgentDoc {
            id: name,
            squad,
            role: &description,
            commands: &[],
            confidence: None,
            note: None,
        }),
        ComponentType::Task => {
            let agent = request.agent_id.as_deref().unwrap_or_default();
            templates::task_markdown(&TaskDoc {
                name,
                agent,
                description: &description,
                entrada: &[],
                saida: &[],
                checklist: &["Validate input parameters".to_string()],
                confidence: None,
            })
        }
        ComponentType::Workflow => {
            templates::workflow_yaml(name, &description, request.agent_id.as_deref())
        }
        ComponentType::Checklist => templates::checklist_markdown(name, &description),
        ComponentType::Template => templates::template_markdown(name, &description),
        ComponentType::Tool | ComponentType::Script => templates::script_js(name, &description),
        ComponentType::Data => templates::data_yaml(name, &description),
    }
}
