//! Blueprint mode: load, validate and materialize a designer blueprint

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use super::{GenerateRequest, GeneratorError, GeneratorResult, SquadGenerator};
use crate::blueprint::{AgentRecommendation, Blueprint, SquadTemplate, TaskRecommendation};
use crate::manifest::{BlueprintProvenance, ComponentKind, Manifest, ManifestReadError, read_manifest, write_manifest};
use crate::naming::{is_kebab_case, to_title_case};
use crate::templates::{self, AgentDoc, TaskDoc};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlueprintSummary {
    pub path: PathBuf,
    pub agents: usize,
    pub tasks: usize,
    pub confidence: f64,
    pub source_docs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateFromBlueprintResult {
    pub path: PathBuf,
    pub files: Vec<String>,
    pub blueprint: BlueprintSummary,
}

fn missing(field: &str) -> String {
    format!("Missing required field: {}", field)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn check_confidence(errors: &mut Vec<String>, label: &str, item: &Value) {
    if let Some(confidence) = present(item.get("confidence")) {
        let in_range = confidence.as_f64().is_some_and(|c| (0.0..=1.0).contains(&c));
        if !in_range {
            errors.push(format!("{}.confidence must be a number between 0 and 1", label));
        }
    }
}

/// Check a raw blueprint document, reporting every violation.
pub fn validate_blueprint(blueprint: &Value) -> BlueprintValidation {
    let mut errors = Vec::new();

    match present(blueprint.get("squad")) {
        None => errors.push(missing("squad")),
        Some(squad) => match present(squad.get("name")) {
            None => errors.push(missing("squad.name")),
            Some(name) => {
                let name = name.as_str().unwrap_or_default();
                if !is_kebab_case(name) {
                    errors.push(format!("Invalid squad.name '{}': must be kebab-case", name));
                }
            }
        },
    }

    match present(blueprint.get("recommendations")) {
        None => errors.push(missing("recommendations")),
        Some(recs) => {
            let mut agent_ids = BTreeSet::new();
            let agents = recs.get("agents").and_then(Value::as_sequence);
            for (i, agent) in agents.into_iter().flatten().enumerate() {
                let label = format!("recommendations.agents[{}]", i);
                match agent.get("id").and_then(Value::as_str) {
                    None => errors.push(missing(&format!("{}.id", label))),
                    Some(id) if !is_kebab_case(id) => {
                        errors.push(format!("Invalid {}.id '{}': must be kebab-case", label, id))
                    }
                    Some(id) => {
                        agent_ids.insert(id.to_string());
                    }
                }
                check_confidence(&mut errors, &label, agent);
            }

            let tasks = recs.get("tasks").and_then(Value::as_sequence);
            for (i, task) in tasks.into_iter().flatten().enumerate() {
                let label = format!("recommendations.tasks[{}]", i);
                match task.get("name").and_then(Value::as_str) {
                    None => errors.push(missing(&format!("{}.name", label))),
                    Some(name) if !is_kebab_case(name) => {
                        errors.push(format!("Invalid {}.name '{}': must be kebab-case", label, name))
                    }
                    Some(_) => {}
                }
                match task.get("agent").and_then(Value::as_str) {
                    None => errors.push(missing(&format!("{}.agent", label))),
                    Some(agent) if !agent_ids.contains(agent) => errors.push(format!(
                        "{}.agent '{}' does not reference a recommended agent",
                        label, agent
                    )),
                    Some(_) => {}
                }
                check_confidence(&mut errors, &label, task);
            }

            if let Some(template) = recs.get("template").and_then(Value::as_str) {
                if template.parse::<SquadTemplate>().is_err() {
                    errors.push(format!("Unknown recommendations.template '{}'", template));
                }
            }
        }
    }

    let created_at = blueprint
        .get("metadata")
        .and_then(|m| present(m.get("created_at")));
    if created_at.is_none() {
        errors.push(missing("metadata.created_at"));
    }

    BlueprintValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Map a blueprint onto a template request.
///
/// Starter agents and tasks are disabled; the blueprint's own components
/// replace them.
pub fn blueprint_to_config(blueprint: &Blueprint) -> GenerateRequest {
    let description = blueprint.squad.description.clone().unwrap_or_else(|| {
        let domain = blueprint
            .squad
            .domain
            .as_deref()
            .unwrap_or(&blueprint.squad.name);
        format!("Squad generated from blueprint for the {} domain", domain)
    });

    let mut request = GenerateRequest::new(blueprint.squad.name.clone())
        .template(blueprint.recommendations.template)
        .config_mode(blueprint.recommendations.config_mode)
        .description(description);
    request.include_agent = false;
    request.include_task = false;
    request.blueprint = Some(Box::new(blueprint.clone()));
    request
}

pub fn generate_agent_from_blueprint(agent: &AgentRecommendation, squad_name: &str) -> String {
    let note = if agent.user_added {
        Some("Added by user")
    } else if agent.user_modified {
        Some("Modified by user")
    } else {
        None
    };
    templates::agent_markdown(&AgentDoc {
        id: &agent.id,
        squad: squad_name,
        role: &agent.role,
        commands: &agent.commands,
        confidence: Some(agent.confidence),
        note,
    })
}

pub fn generate_task_from_blueprint(task: &TaskRecommendation, squad_name: &str) -> String {
    let checklist = if task.checklist.is_empty() {
        vec![
            "Validate input parameters".to_string(),
            "Execute task logic".to_string(),
            "Verify output".to_string(),
        ]
    } else {
        task.checklist.clone()
    };
    let description = format!(
        "{} task of the {} squad, run by @{}.",
        to_title_case(&task.name),
        squad_name,
        task.agent
    );
    templates::task_markdown(&TaskDoc {
        name: &task.name,
        agent: &task.agent,
        description: &description,
        entrada: &task.entrada,
        saida: &task.saida,
        checklist: &checklist,
        confidence: Some(task.confidence),
    })
}

impl SquadGenerator {
    /// Read and parse a blueprint file without validating it.
    pub async fn load_blueprint(&self, path: &Path) -> GeneratorResult<Value> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| GeneratorError::blueprint_not_found(path))?;
        serde_yaml::from_str(&content).map_err(|e| GeneratorError::blueprint_parse_error(path, e))
    }

    /// Record the blueprint's components and provenance in the manifest.
    pub async fn update_squad_yaml_components(
        &self,
        manifest_path: &Path,
        blueprint: &Blueprint,
        blueprint_path: Option<&Path>,
    ) -> GeneratorResult<Manifest> {
        let mut manifest = read_manifest(manifest_path).await.map_err(|e| match e {
            ManifestReadError::Io(err) => GeneratorError::write_failed(manifest_path, err),
            ManifestReadError::Parse(err) => GeneratorError::write_failed(manifest_path, err),
        })?;

        for agent in &blueprint.recommendations.agents {
            manifest.add_component(ComponentKind::Agents, &format!("{}.md", agent.id));
        }
        for task in &blueprint.recommendations.tasks {
            manifest.add_component(ComponentKind::Tasks, &format!("{}.md", task.name));
        }
        manifest.blueprint = Some(BlueprintProvenance {
            path: blueprint_path.map(|p| p.display().to_string()),
            confidence: blueprint.metadata.overall_confidence,
            source_docs: blueprint.metadata.source_docs.clone(),
            created_at: Some(blueprint.metadata.created_at.clone()),
        });

        write_manifest(manifest_path, &manifest)
            .await
            .map_err(|e| GeneratorError::write_failed(manifest_path, e))?;
        Ok(manifest)
    }

    async fn drop_placeholder(
        &self,
        squad_path: &Path,
        dir: &str,
        files: &mut Vec<String>,
    ) -> GeneratorResult<()> {
        let relative = format!("{}/.gitkeep", dir);
        let placeholder = squad_path.join(&relative);
        match tokio::fs::remove_file(&placeholder).await {
            Ok(()) => debug!("[SquadGenerator] Removed {}", relative),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(GeneratorError::write_failed(&placeholder, e)),
        }
        files.retain(|f| f != &relative);
        Ok(())
    }

    /// Load, validate and materialize a blueprint.
    ///
    /// With `force`, an existing squad is regenerated in place: files are
    /// overwritten, unrelated files are kept and the manifest is rewritten.
    pub async fn generate_from_blueprint(
        &self,
        path: &Path,
        force: bool,
    ) -> GeneratorResult<GenerateFromBlueprintResult> {
        let raw = self.load_blueprint(path).await?;
        let validation = validate_blueprint(&raw);
        if !validation.is_valid {
            return Err(GeneratorError::blueprint_invalid(validation.errors));
        }
        let blueprint: Blueprint = serde_yaml::from_value(raw)
            .map_err(|e| GeneratorError::blueprint_invalid(vec![e.to_string()]))?;

        let request = blueprint_to_config(&blueprint).force(force);
        let base = self.generate(&request).await?;
        let squad_name = blueprint.squad.name.as_str();
        let mut files = base.files;

        for agent in &blueprint.recommendations.agents {
            let relative = format!("agents/{}.md", agent.id);
            self.write_file(&base.path, &relative, &generate_agent_from_blueprint(agent, squad_name))
                .await?;
            files.push(relative);
        }
        for task in &blueprint.recommendations.tasks {
            let relative = format!("tasks/{}.md", task.name);
            self.write_file(&base.path, &relative, &generate_task_from_blueprint(task, squad_name))
                .await?;
            files.push(relative);
        }
        let populated = [
            ("agents", !blueprint.recommendations.agents.is_empty()),
            ("tasks", !blueprint.recommendations.tasks.is_empty()),
        ];
        for (dir, has_files) in populated {
            if has_files {
                self.drop_placeholder(&base.path, dir, &mut files).await?;
            }
        }
        files.sort();
        files.dedup();

        let manifest_path = base.path.join(crate::manifest::PRIMARY_MANIFEST);
        self.update_squad_yaml_components(&manifest_path, &blueprint, Some(path))
            .await?;
        self.log(&format!(
            "Generated {} agents and {} tasks from {}",
            blueprint.recommendations.agents.len(),
            blueprint.recommendations.tasks.len(),
            path.display()
        ));

        Ok(GenerateFromBlueprintResult {
            path: base.path,
            files,
            blueprint: BlueprintSummary {
                path: path.to_path_buf(),
                agents: blueprint.recommendations.agents.len(),
                tasks: blueprint.recommendations.tasks.len(),
                confidence: blueprint.metadata.overall_confidence,
                source_docs: blueprint.metadata.source_docs,
            },
        })
    }
}
