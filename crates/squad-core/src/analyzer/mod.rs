//! Squad analyzer
//!
//! Inventories a squad's component directories, computes coverage metrics and
//! proposes improvements. Reports render as console text, Markdown or JSON.

mod error;
mod report;

pub use error::{AnalyzerError, AnalyzerErrorCode, AnalyzerResult};
pub use report::{ReportFormat, format_report};

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{DEFAULT_SQUADS_PATH, SquadSettings};
use crate::fsutil;
use crate::loader::{LoaderOptions, SquadLoader};
use crate::manifest::{ComponentKind, Manifest};

/// Component directories inspected by the analyzer
pub const COMPONENT_DIRECTORIES: [ComponentKind; 8] = ComponentKind::ALL;

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub squads_path: PathBuf,
    pub verbose: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            verbose: false,
        }
    }
}

impl AnalyzerOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            squads_path: settings.squads_path.clone(),
            verbose: false,
        }
    }
}

/// Per-call analysis switches
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub include_suggestions: bool,
    /// Record full paths in the inventory
    pub verbose: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            include_suggestions: true,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub name: String,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
}

/// One file found in a component directory
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InventoryEntry {
    File(String),
    Detailed { name: String, path: PathBuf },
}

impl InventoryEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::File(name) => name,
            Self::Detailed { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub agents: Vec<InventoryEntry>,
    pub tasks: Vec<InventoryEntry>,
    pub workflows: Vec<InventoryEntry>,
    pub checklists: Vec<InventoryEntry>,
    pub templates: Vec<InventoryEntry>,
    pub tools: Vec<InventoryEntry>,
    pub data: Vec<InventoryEntry>,
    pub scripts: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn get(&self, kind: ComponentKind) -> &[InventoryEntry] {
        match kind {
            ComponentKind::Agents => &self.agents,
            ComponentKind::Tasks => &self.tasks,
            ComponentKind::Workflows => &self.workflows,
            ComponentKind::Checklists => &self.checklists,
            ComponentKind::Templates => &self.templates,
            ComponentKind::Tools => &self.tools,
            ComponentKind::Data => &self.data,
            ComponentKind::Scripts => &self.scripts,
        }
    }

    fn get_mut(&mut self, kind: ComponentKind) -> &mut Vec<InventoryEntry> {
        match kind {
            ComponentKind::Agents => &mut self.agents,
            ComponentKind::Tasks => &mut self.tasks,
            ComponentKind::Workflows => &mut self.workflows,
            ComponentKind::Checklists => &mut self.checklists,
            ComponentKind::Templates => &mut self.templates,
            ComponentKind::Tools => &mut self.tools,
            ComponentKind::Data => &mut self.data,
            ComponentKind::Scripts => &mut self.scripts,
        }
    }

    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        self.get(kind).iter().map(InventoryEntry::name).collect()
    }

    /// Agent ids: agent file names without extension
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|e| file_stem(e.name())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCoverage {
    pub total: usize,
    pub with_tasks: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCoverage {
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryCoverage {
    pub populated: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationCoverage {
    pub has_readme: bool,
}

/// Component files present on disk but missing from `components` in the manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestCoverage {
    pub unlisted: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub agents: AgentCoverage,
    pub tasks: TaskCoverage,
    pub directories: DirectoryCoverage,
    pub documentation: DocumentationCoverage,
    pub manifest: ManifestCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub category: String,
    pub priority: Priority,
    pub message: String,
}

impl Suggestion {
    fn new(category: &str, priority: Priority, message: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            priority,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub squad_name: String,
    pub squad_path: PathBuf,
    pub analyzed_at: String,
    pub overview: Overview,
    pub inventory: Inventory,
    pub coverage: Coverage,
    pub suggestions: Vec<Suggestion>,
}

pub struct SquadAnalyzer {
    loader: SquadLoader,
    verbose: bool,
}

impl SquadAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            loader: SquadLoader::new(LoaderOptions {
                squads_path: options.squads_path,
                verbose: options.verbose,
            }),
            verbose: options.verbose,
        }
    }

    fn log(&self, message: &str) {
        if self.verbose {
            info!("[SquadAnalyzer] {}", message);
        } else {
            debug!("[SquadAnalyzer] {}", message);
        }
    }

    pub async fn analyze(&self, name: &str, options: AnalyzeOptions) -> AnalyzerResult<AnalysisResult> {
        let location = self
            .loader
            .resolve(name)
            .await
            .map_err(|e| AnalyzerError::from_loader(e, name))?;
        let manifest = self
            .loader
            .load_manifest(&location.path)
            .await
            .map_err(|e| AnalyzerError::from_loader(e, name))?
            .manifest;
        let squad_path = location.path;
        self.log(&format!("Analyzing {}", squad_path.display()));

        let overview = self.extract_overview(&manifest, name);
        let inventory = self.inventory_components(&squad_path, options.verbose).await?;
        let coverage = self.calculate_coverage(&inventory, &manifest, &squad_path).await;
        let suggestions = if options.include_suggestions {
            self.generate_suggestions(&inventory, &coverage, &manifest)
        } else {
            Vec::new()
        };

        Ok(AnalysisResult {
            squad_name: name.to_string(),
            squad_path,
            analyzed_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            overview,
            inventory,
            coverage,
            suggestions,
        })
    }

    /// Project the top-level manifest fields; the name falls back to the directory name.
    pub fn extract_overview(&self, manifest: &Manifest, squad_name: &str) -> Overview {
        Overview {
            name: manifest.name.clone().unwrap_or_else(|| squad_name.to_string()),
            version: manifest.version.clone(),
            author: manifest.author.clone(),
            description: manifest.description.clone(),
            license: manifest.license.clone(),
        }
    }

    /// List the visible files of every component directory.
    ///
    /// With `verbose`, entries carry their full path.
    pub async fn inventory_components(
        &self,
        squad_path: &Path,
        verbose: bool,
    ) -> AnalyzerResult<Inventory> {
        let mut inventory = Inventory::default();
        for kind in COMPONENT_DIRECTORIES {
            let dir = squad_path.join(kind.dir_name());
            let files = fsutil::list_visible_files(&dir)
                .await
                .map_err(|e| AnalyzerError::analysis_failed(format!("{}: {}", dir.display(), e)))?;
            *inventory.get_mut(kind) = files
                .into_iter()
                .map(|name| {
                    if verbose {
                        InventoryEntry::Detailed {
                            path: dir.join(&name),
                            name,
                        }
                    } else {
                        InventoryEntry::File(name)
                    }
                })
                .collect();
        }
        Ok(inventory)
    }

    pub async fn calculate_coverage(
        &self,
        inventory: &Inventory,
        manifest: &Manifest,
        squad_path: &Path,
    ) -> Coverage {
        let agent_ids = inventory.agent_ids();
        let task_names = inventory.names(ComponentKind::Tasks);
        let with_tasks = agent_ids
            .iter()
            .filter(|id| agent_has_tasks(id, &task_names))
            .count();
        let percentage = if agent_ids.is_empty() {
            0
        } else {
            ((with_tasks as f64 / agent_ids.len() as f64) * 100.0).round() as u32
        };

        let populated = COMPONENT_DIRECTORIES
            .iter()
            .filter(|kind| !inventory.get(**kind).is_empty())
            .count();

        let mut unlisted = Vec::new();
        for kind in COMPONENT_DIRECTORIES {
            let listed = manifest.components_of(kind);
            for entry in inventory.get(kind) {
                if !listed.iter().any(|f| f == entry.name()) {
                    unlisted.push(format!("{}/{}", kind, entry.name()));
                }
            }
        }

        Coverage {
            agents: AgentCoverage {
                total: agent_ids.len(),
                with_tasks,
                percentage,
            },
            tasks: TaskCoverage {
                total: task_names.len(),
            },
            directories: DirectoryCoverage {
                populated,
                total: COMPONENT_DIRECTORIES.len(),
            },
            documentation: DocumentationCoverage {
                has_readme: fsutil::path_exists(&squad_path.join("README.md")).await,
            },
            manifest: ManifestCoverage { unlisted },
        }
    }

    /// Rule-based improvement hints, highest priority first.
    pub fn generate_suggestions(
        &self,
        inventory: &Inventory,
        coverage: &Coverage,
        manifest: &Manifest,
    ) -> Vec<Suggestion> {
        let squad = manifest.name.as_deref().unwrap_or("<squad>");
        let task_names = inventory.names(ComponentKind::Tasks);
        let mut suggestions = Vec::new();

        if inventory.agents.is_empty() {
            suggestions.push(Suggestion::new(
                "agents",
                Priority::High,
                format!("Squad has no agents; add one with *extend-squad {} --add agent", squad),
            ));
        }

        for id in inventory.agent_ids() {
            if !agent_has_tasks(id, &task_names) {
                suggestions.push(Suggestion::new(
                    "tasks",
                    Priority::High,
                    format!(
                        "Agent '{}' has no tasks; add one with *extend-squad {} --add task --agent {}",
                        id, squad, id
                    ),
                ));
            }
        }

        if !coverage.manifest.unlisted.is_empty() {
            suggestions.push(Suggestion::new(
                "manifest",
                Priority::Medium,
                format!(
                    "{} component file(s) are not listed in the manifest: {}",
                    coverage.manifest.unlisted.len(),
                    coverage.manifest.unlisted.join(", ")
                ),
            ));
        }

        if inventory.checklists.is_empty() {
            suggestions.push(Suggestion::new(
                "checklists",
                Priority::Medium,
                "Add checklists to validate task outputs",
            ));
        }

        if inventory.workflows.is_empty() && task_names.len() >= 2 {
            suggestions.push(Suggestion::new(
                "workflows",
                Priority::Medium,
                "Add a workflow to chain the squad's tasks",
            ));
        }

        if inventory.templates.is_empty() {
            suggestions.push(Suggestion::new(
                "templates",
                Priority::Low,
                "Add templates for recurring task outputs",
            ));
        }

        if !coverage.documentation.has_readme {
            suggestions.push(Suggestion::new(
                "documentation",
                Priority::Low,
                "Add a README.md describing the squad",
            ));
        }

        if manifest.description.is_none() {
            suggestions.push(Suggestion::new(
                "documentation",
                Priority::Low,
                "Add a description to the manifest",
            ));
        }

        if manifest.author.is_none() {
            suggestions.push(Suggestion::new(
                "documentation",
                Priority::Low,
                "Add an author to the manifest",
            ));
        }

        suggestions.sort_by_key(|s| s.priority);
        suggestions
    }
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// Tasks follow the `<agentId>-<task>` naming convention.
/// Whether any `<agent_id>-*.md` task exists.
fn agent_has_tasks(agent_id: &str, task_names: &[&str]) -> bool {
    let prefix = format!("{}-", agent_id);
    task_names
        .iter()
        .any(|t| t.len() > prefix.len() + 3 && t.starts_with(&prefix) && t.ends_with(".md"))
}
