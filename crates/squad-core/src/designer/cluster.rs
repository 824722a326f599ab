//! Workflow canonicalisation and grouping into agents

use std::collections::BTreeSet;

use super::lexicon::{ACTION_VERBS, MODIFIERS, canonical_verb, nominalized_verb, verb_base};
use crate::naming::singularize;

/// Phrases at least this similar are treated as the same workflow
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.75;

/// A workflow reduced to `verb` + `noun`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalWorkflow {
    pub verb: Option<String>,
    /// Object tokens joined with `-`; empty when the phrase is a bare verb
    pub noun: String,
}

impl CanonicalWorkflow {
    pub fn parse(workflow: &str) -> Self {
        let mut verb = None;
        let mut nouns = Vec::new();

        for raw in workflow
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let token = raw.to_lowercase();
            if MODIFIERS.contains(&token.as_str()) {
                continue;
            }
            let as_verb = if ACTION_VERBS.contains(&token.as_str()) {
                Some(token.as_str().to_string())
            } else {
                nominalized_verb(&token)
                    .or_else(|| verb_base(&token))
                    .map(str::to_string)
            };
            match (as_verb, &verb) {
                (Some(v), None) => verb = Some(canonical_verb(&v)),
                _ => nouns.push(singularize(&token)),
            }
        }

        Self {
            verb,
            noun: nouns.join("-"),
        }
    }

    /// `create-order`, or the noun alone when no verb was found
    pub fn command(&self) -> String {
        match (&self.verb, self.noun.is_empty()) {
            (Some(verb), true) => verb.clone(),
            (Some(verb), false) => format!("{}-{}", verb, self.noun),
            (None, _) => self.noun.clone(),
        }
    }

    pub fn tokens(&self) -> BTreeSet<String> {
        let mut tokens: BTreeSet<String> = self
            .noun
            .split('-')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(verb) = &self.verb {
            tokens.insert(verb.clone());
        }
        tokens
    }
}

pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Near-duplicate phrases folded onto one command
#[derive(Debug, Clone)]
pub struct WorkflowCluster {
    pub canonical: CanonicalWorkflow,
    pub phrases: Vec<String>,
}

/// Fold near-duplicate workflow phrases, keeping first-appearance order.
pub fn dedupe_workflows(workflows: &[String]) -> Vec<WorkflowCluster> {
    let mut clusters: Vec<WorkflowCluster> = Vec::new();
    for phrase in workflows {
        let canonical = CanonicalWorkflow::parse(phrase);
        if canonical.command().is_empty() {
            continue;
        }
        let tokens = canonical.tokens();
        let existing = clusters
            .iter_mut()
            .find(|c| jaccard(&c.canonical.tokens(), &tokens) >= NEAR_DUPLICATE_THRESHOLD);
        match existing {
            Some(cluster) => cluster.phrases.push(phrase.clone()),
            None => clusters.push(WorkflowCluster {
                canonical,
                phrases: vec![phrase.clone()],
            }),
        }
    }
    clusters
}

/// Commands that share an object noun become one agent
#[derive(Debug, Clone)]
pub struct AgentGroup {
    pub noun: String,
    pub workflows: Vec<WorkflowCluster>,
}

impl AgentGroup {
    pub fn commands(&self) -> Vec<String> {
        self.workflows.iter().map(|w| w.canonical.command()).collect()
    }

    pub fn verbs(&self) -> Vec<&str> {
        let mut verbs: Vec<&str> = Vec::new();
        for w in &self.workflows {
            if let Some(v) = w.canonical.verb.as_deref() {
                if !verbs.contains(&v) {
                    verbs.push(v);
                }
            }
        }
        verbs
    }

    /// Number of source phrases behind this group
    pub fn support(&self) -> usize {
        self.workflows.iter().map(|w| w.phrases.len()).sum()
    }

    /// Share of workflows whose object matches the group's noun
    pub fn cohesion(&self) -> f64 {
        if self.workflows.is_empty() {
            return 0.0;
        }
        let matching = self
            .workflows
            .iter()
            .filter(|w| w.canonical.noun == self.noun)
            .count();
        matching as f64 / self.workflows.len() as f64
    }
}

pub fn group_by_noun(clusters: Vec<WorkflowCluster>) -> Vec<AgentGroup> {
    let mut groups: Vec<AgentGroup> = Vec::new();
    for cluster in clusters {
        let noun = if cluster.canonical.noun.is_empty() {
            cluster.canonical.command()
        } else {
            cluster.canonical.noun.clone()
        };
        match groups.iter_mut().find(|g| g.noun == noun) {
            Some(group) => group.workflows.push(cluster),
            None => groups.push(AgentGroup {
                noun,
                workflows: vec![cluster],
            }),
        }
    }
    groups
}
