//! Squad designer
//!
//! Turns free-text domain documentation into a [`Blueprint`]: extraction rules
//! find entities, workflows, integrations and stakeholders; near-duplicate
//! workflows are clustered into agents; every agent and task carries a
//! confidence score built from named contributions.

mod cluster;
mod error;
mod extract;
mod lexicon;
mod scoring;

pub use cluster::{AgentGroup, CanonicalWorkflow, WorkflowCluster, dedupe_workflows, group_by_noun};
pub use error::{DesignerError, DesignerErrorCode, DesignerResult};
pub use extract::{
    Clause, Document, EntityRule, ExtractionRule, Finding, IntegrationRule, StakeholderRule,
    Token, WorkflowRule, default_rules,
};
pub use scoring::{ConfidenceScore, Contribution};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::blueprint::{
    AgentRecommendation, Blueprint, BlueprintMetadata, BlueprintSquad, DomainAnalysis,
    Recommendations, SquadTemplate, TaskRecommendation,
};
use crate::config::{DEFAULT_DESIGNS_PATH, SquadSettings};
use crate::fsutil;
use crate::manifest::ConfigMode;
use crate::naming::{singularize, to_kebab_case, to_snake_case, to_title_case};
use lexicon::agentive;
use scoring::round2;

/// Upper bound on recommended agents
pub const MAX_AGENTS: usize = 10;

/// Segments kept from an inferred domain name
const MAX_DOMAIN_SEGMENTS: usize = 4;

/// Longest first line still treated as a title
const MAX_TITLE_WORDS: usize = 6;

const WEIGHT_COHESION: f64 = 0.35;
const WEIGHT_ENTITY_GROUNDING: f64 = 0.25;
const WEIGHT_DOMAIN_MATCH: f64 = 0.15;
const WEIGHT_SUPPORT: f64 = 0.25;

/// Phrases needed for full support credit
const FULL_SUPPORT: usize = 3;

const CREATE_LIKE: &[&str] = &[
    "book", "create", "generate", "import", "onboard", "register", "schedule", "submit",
];
const VIEW_LIKE: &[&str] = &[
    "analyze", "calculate", "export", "monitor", "report", "review", "search", "track", "view",
];

#[derive(Debug, Clone)]
pub struct DesignerOptions {
    /// Where blueprints are saved when no output path is given
    pub designs_path: PathBuf,
    pub verbose: bool,
}

impl Default for DesignerOptions {
    fn default() -> Self {
        Self {
            designs_path: PathBuf::from(DEFAULT_DESIGNS_PATH),
            verbose: false,
        }
    }
}

impl DesignerOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            designs_path: settings.designs_path.clone(),
            verbose: false,
        }
    }
}

/// Raw documentation handed to the designer
#[derive(Debug, Clone, Default)]
pub struct DocumentationInput {
    pub text: Option<String>,
    pub docs: Vec<PathBuf>,
    /// Explicit domain name; inferred from the text otherwise
    pub domain_hint: Option<String>,
}

impl DocumentationInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.docs.push(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_hint = Some(domain.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentSource {
    Text,
    File { path: PathBuf },
}

impl DocumentSource {
    fn label(&self) -> String {
        match self {
            Self::Text => "inline-text".to_string(),
            Self::File { path } => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedDocumentation {
    pub merged_content: String,
    pub sources: Vec<DocumentSource>,
    #[serde(skip)]
    pub domain_hint: Option<String>,
}

impl CollectedDocumentation {
    pub fn source_docs(&self) -> Vec<String> {
        self.sources.iter().map(DocumentSource::label).collect()
    }
}

/// An agent recommendation with the score breakdown behind its confidence
#[derive(Debug, Clone)]
pub struct ScoredAgent {
    pub agent: AgentRecommendation,
    pub score: ConfidenceScore,
}

/// Caller-supplied metadata for [`SquadDesigner::generate_blueprint`]
#[derive(Debug, Clone, Default)]
pub struct BlueprintInput {
    pub source_docs: Vec<String>,
    pub user_adjustments: u32,
}

#[derive(Debug, Clone)]
pub struct DesignOutcome {
    pub blueprint: Blueprint,
    pub path: PathBuf,
}

pub struct SquadDesigner {
    designs_path: PathBuf,
    verbose: bool,
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl SquadDesigner {
    pub fn new(options: DesignerOptions) -> Self {
        Self::with_rules(options, default_rules())
    }

    pub fn with_rules(options: DesignerOptions, rules: Vec<Box<dyn ExtractionRule>>) -> Self {
        Self {
            designs_path: options.designs_path,
            verbose: options.verbose,
            rules,
        }
    }

    fn log(&self, message: &str) {
        if self.verbose {
            info!("[SquadDesigner] {}", message);
        } else {
            debug!("[SquadDesigner] {}", message);
        }
    }

    /// Merge inline text and documentation files, in that order.
    pub async fn collect_documentation(
        &self,
        input: &DocumentationInput,
    ) -> DesignerResult<CollectedDocumentation> {
        let mut parts = Vec::new();
        let mut sources = Vec::new();

        if let Some(text) = input.text.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(text.to_string());
            sources.push(DocumentSource::Text);
        }
        for path in &input.docs {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DesignerError::parse_error(path, e))?;
            self.log(&format!("Read {} ({} bytes)", path.display(), content.len()));
            parts.push(content);
            sources.push(DocumentSource::File { path: path.clone() });
        }

        if sources.is_empty() {
            return Err(DesignerError::no_documentation());
        }

        Ok(CollectedDocumentation {
            merged_content: parts.join("\n\n"),
            sources,
            domain_hint: input.domain_hint.clone(),
        })
    }

    pub fn analyze_domain(&self, docs: &CollectedDocumentation) -> DesignerResult<DomainAnalysis> {
        let document = Document::parse(&docs.merged_content);
        let mut analysis = DomainAnalysis::default();

        for rule in &self.rules {
            let findings = rule.extract(&document);
            self.log(&format!("Rule '{}' produced {} findings", rule.name(), findings.len()));
            for finding in findings {
                let (list, value) = match finding {
                    Finding::Entity(v) => (&mut analysis.entities, v),
                    Finding::Workflow(v) => (&mut analysis.workflows, v),
                    Finding::Integration(v) => (&mut analysis.integrations, v),
                    Finding::Stakeholder(v) => (&mut analysis.stakeholders, v),
                };
                if !list.contains(&value) {
                    list.push(value);
                }
            }
        }

        if analysis.entities.is_empty()
            && analysis.workflows.is_empty()
            && analysis.integrations.is_empty()
            && analysis.stakeholders.is_empty()
        {
            return Err(DesignerError::empty_analysis());
        }

        analysis.domain = match docs.domain_hint.as_deref().map(to_kebab_case) {
            Some(hint) if !hint.is_empty() => hint,
            _ => infer_domain(&docs.merged_content, &analysis),
        };
        self.log(&format!(
            "Domain '{}': {} entities, {} workflows, {} integrations, {} stakeholders",
            analysis.domain,
            analysis.entities.len(),
            analysis.workflows.len(),
            analysis.integrations.len(),
            analysis.stakeholders.len()
        ));
        Ok(analysis)
    }

    pub fn generate_agent_recommendations(&self, analysis: &DomainAnalysis) -> Vec<AgentRecommendation> {
        self.score_agents(analysis).into_iter().map(|s| s.agent).collect()
    }

    /// Agents ordered by confidence, at most [`MAX_AGENTS`].
    ///
    /// Groups beyond the cap are folded into the last kept agent.
    pub fn score_agents(&self, analysis: &DomainAnalysis) -> Vec<ScoredAgent> {
        let mut groups = group_by_noun(dedupe_workflows(&analysis.workflows));
        if groups.is_empty() {
            if let Some(entity) = analysis.entities.first() {
                groups.push(entity_group(entity));
            }
        }

        let mut scored: Vec<(AgentGroup, ConfidenceScore)> = groups
            .into_iter()
            .map(|g| {
                let score = score_group(&g, analysis);
                (g, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total().total_cmp(&a.1.total()));

        if scored.len() > MAX_AGENTS {
            let excess: Vec<_> = scored.drain(MAX_AGENTS..).collect();
            self.log(&format!("Merging {} agent groups over the cap", excess.len()));
            let last = &mut scored[MAX_AGENTS - 1];
            for (group, _) in excess {
                last.0.workflows.extend(group.workflows);
            }
            last.1 = score_group(&last.0, analysis);
        }

        let mut used = BTreeSet::new();
        scored
            .into_iter()
            .map(|(group, score)| {
                let id = unique_id(agent_id(&group), &mut used);
                let commands = group.commands().iter().map(|c| to_kebab_case(c)).collect::<Vec<_>>();
                let agent = AgentRecommendation {
                    role: agent_role(&group, &commands),
                    id,
                    commands,
                    confidence: score.total(),
                    user_added: false,
                    user_modified: false,
                };
                ScoredAgent { agent, score }
            })
            .collect()
    }

    /// One task per agent command.
    pub fn generate_task_recommendations(
        &self,
        agents: &[AgentRecommendation],
        analysis: &DomainAnalysis,
    ) -> Vec<TaskRecommendation> {
        let mut tasks = Vec::new();
        for agent in agents {
            for command in &agent.commands {
                let workflow = CanonicalWorkflow::parse(command);
                let grounded = grounding_entities(&workflow.noun, &analysis.entities);
                let grounding = if grounded.is_empty() { 0.0 } else { 1.0 };
                tasks.push(TaskRecommendation {
                    name: to_kebab_case(command),
                    agent: agent.id.clone(),
                    entrada: task_inputs(&workflow, grounded),
                    saida: task_outputs(&workflow),
                    checklist: task_checklist(command),
                    confidence: round2(agent.confidence * (0.85 + 0.15 * grounding)),
                });
            }
        }
        self.log(&format!("Generated {} tasks for {} agents", tasks.len(), agents.len()));
        tasks
    }

    pub fn generate_blueprint(
        &self,
        analysis: &DomainAnalysis,
        recommendations: Recommendations,
        input: BlueprintInput,
    ) -> Blueprint {
        let confidences: Vec<f64> = recommendations
            .agents
            .iter()
            .map(|a| a.confidence)
            .chain(recommendations.tasks.iter().map(|t| t.confidence))
            .collect();
        let overall_confidence = if confidences.is_empty() {
            0.0
        } else {
            round2(confidences.iter().sum::<f64>() / confidences.len() as f64)
        };

        let domain = to_kebab_case(&analysis.domain);
        let name = if domain.is_empty() {
            "new-squad".to_string()
        } else {
            format!("{}-squad", domain)
        };

        Blueprint {
            squad: BlueprintSquad {
                name,
                description: Some(format!("Squad for the {} domain", to_title_case(&domain))),
                domain: Some(domain),
            },
            analysis: analysis.clone(),
            recommendations,
            metadata: BlueprintMetadata {
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                source_docs: input.source_docs,
                user_adjustments: input.user_adjustments,
                overall_confidence,
            },
        }
    }

    /// `<designs_path>/<squad-name>-design.yaml`
    pub fn default_blueprint_path(&self, blueprint: &Blueprint) -> PathBuf {
        self.designs_path
            .join(format!("{}-design.yaml", blueprint.squad.name))
    }

    pub async fn save_blueprint(
        &self,
        blueprint: &Blueprint,
        output: Option<&Path>,
        force: bool,
    ) -> DesignerResult<PathBuf> {
        let path = match output {
            Some(p) => p.to_path_buf(),
            None => self.default_blueprint_path(blueprint),
        };
        if !force && fsutil::path_exists(&path).await {
            return Err(DesignerError::blueprint_exists(&path));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DesignerError::save_failed(&path, e))?;
        }
        let yaml = blueprint
            .to_yaml_string()
            .map_err(|e| DesignerError::save_failed(&path, e))?;
        fsutil::write_atomic(&path, yaml)
            .await
            .map_err(|e| DesignerError::save_failed(&path, e))?;
        self.log(&format!("Saved blueprint to {}", path.display()));
        Ok(path)
    }

    /// Full pipeline from documentation to a saved blueprint.
    pub async fn design(
        &self,
        input: &DocumentationInput,
        output: Option<&Path>,
        force: bool,
    ) -> DesignerResult<DesignOutcome> {
        let docs = self.collect_documentation(input).await?;
        let analysis = self.analyze_domain(&docs)?;
        let agents = self.generate_agent_recommendations(&analysis);
        let tasks = self.generate_task_recommendations(&agents, &analysis);
        let recommendations = Recommendations {
            agents,
            tasks,
            template: SquadTemplate::Basic,
            config_mode: ConfigMode::Extend,
        };
        let blueprint = self.generate_blueprint(
            &analysis,
            recommendations,
            BlueprintInput {
                source_docs: docs.source_docs(),
                user_adjustments: 0,
            },
        );
        let path = self.save_blueprint(&blueprint, output, force).await?;
        Ok(DesignOutcome { blueprint, path })
    }
}

fn noun_tokens(noun: &str) -> BTreeSet<String> {
    noun.split('-')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn entity_key(entity: &str) -> String {
    to_kebab_case(&singularize(entity))
}

/// Entities whose singular form names part of `noun`
fn grounding_entities(noun: &str, entities: &[String]) -> Vec<String> {
    let tokens = noun_tokens(noun);
    entities
        .iter()
        .filter(|e| tokens.contains(&entity_key(e)))
        .cloned()
        .collect()
}

fn score_group(group: &AgentGroup, analysis: &DomainAnalysis) -> ConfidenceScore {
    let workflows = group.workflows.len().max(1) as f64;
    let grounded = group
        .workflows
        .iter()
        .filter(|w| !grounding_entities(&w.canonical.noun, &analysis.entities).is_empty())
        .count() as f64;

    let domain_tokens: BTreeSet<String> = analysis
        .domain
        .split('-')
        .filter(|t| !t.is_empty())
        .map(singularize)
        .collect();
    let domain_match = if noun_tokens(&group.noun).is_disjoint(&domain_tokens) {
        0.0
    } else {
        1.0
    };

    let support = group.support().min(FULL_SUPPORT) as f64 / FULL_SUPPORT as f64;

    ConfidenceScore::new()
        .add("cohesion", WEIGHT_COHESION, group.cohesion())
        .add("entity_grounding", WEIGHT_ENTITY_GROUNDING, grounded / workflows)
        .add("domain_match", WEIGHT_DOMAIN_MATCH, domain_match)
        .add("support", WEIGHT_SUPPORT, support)
}

fn entity_group(entity: &str) -> AgentGroup {
    let noun = entity_key(entity);
    let canonical = CanonicalWorkflow {
        verb: Some("manage".to_string()),
        noun: noun.clone(),
    };
    AgentGroup {
        noun,
        workflows: vec![WorkflowCluster {
            phrases: vec![canonical.command()],
            canonical,
        }],
    }
}

fn agent_id(group: &AgentGroup) -> String {
    let verbs = group.verbs();
    let base = if verbs.iter().any(|v| *v == group.noun) {
        format!("{}-specialist", group.noun)
    } else {
        match verbs.as_slice() {
            [] => format!("{}-specialist", group.noun),
            [verb] => format!("{}-{}", group.noun, agentive(verb)),
            _ => format!("{}-manager", group.noun),
        }
    };
    let id = to_kebab_case(&base);
    if id.is_empty() { "domain-specialist".to_string() } else { id }
}

fn unique_id(id: String, used: &mut BTreeSet<String>) -> String {
    let mut candidate = id.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", id, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn agent_role(group: &AgentGroup, commands: &[String]) -> String {
    format!(
        "Handles {} operations: {}",
        group.noun.replace('-', " "),
        commands.join(", ")
    )
}

fn task_inputs(workflow: &CanonicalWorkflow, grounded: Vec<String>) -> Vec<String> {
    if !grounded.is_empty() {
        return grounded;
    }
    let noun = if workflow.noun.is_empty() {
        "input".to_string()
    } else {
        to_snake_case(&workflow.noun)
    };
    let suffix = match workflow.verb.as_deref() {
        Some(v) if CREATE_LIKE.contains(&v) => "data",
        _ => "id",
    };
    vec![format!("{}_{}", noun, suffix)]
}

fn task_outputs(workflow: &CanonicalWorkflow) -> Vec<String> {
    let noun = if workflow.noun.is_empty() {
        "result".to_string()
    } else {
        to_snake_case(&workflow.noun)
    };
    match workflow.verb.as_deref() {
        Some(v) if VIEW_LIKE.contains(&v) => vec![format!("{}_details", noun)],
        _ => vec![format!("{}_id", noun), "status".to_string()],
    }
}

fn task_checklist(command: &str) -> Vec<String> {
    vec![
        "Validate input parameters".to_string(),
        format!("Execute {}", command),
        "Verify output and report status".to_string(),
    ]
}

/// Domain from a heading, a short title line, or the dominant workflow.
fn infer_domain(content: &str, analysis: &DomainAnalysis) -> String {
    let lines = || content.lines().map(str::trim).filter(|l| !l.is_empty());

    let heading = lines()
        .find_map(|l| l.strip_prefix('#'))
        .map(|h| h.trim_start_matches('#').trim());
    let title_line = lines().next().filter(|l| !l.starts_with('#'));

    let title = heading.or(title_line).map(title_head).filter(|t| {
        t.split_whitespace().count() <= MAX_TITLE_WORDS && !t.ends_with('.')
    });

    let candidates = title
        .map(to_kebab_case)
        .into_iter()
        .chain(
            analysis
                .workflows
                .iter()
                .map(|w| CanonicalWorkflow::parse(w).noun)
                .filter(|n| !n.is_empty())
                .map(|n| format!("{}-management", n))
                .take(1),
        )
        .chain(analysis.entities.first().map(|e| to_kebab_case(e)));

    for candidate in candidates {
        if !candidate.is_empty() {
            return candidate
                .split('-')
                .take(MAX_DOMAIN_SEGMENTS)
                .collect::<Vec<_>>()
                .join("-");
        }
    }
    "general".to_string()
}

/// Text before a ` - ` or `:` subtitle
fn title_head(line: &str) -> &str {
    let head = line.split(" - ").next().unwrap_or(line);
    head.split(':').next().unwrap_or(head).trim()
}
