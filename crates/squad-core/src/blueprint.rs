//! Blueprint documents: the designer's output and the generator's input

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::manifest::ConfigMode;

/// Starting layout for a generated squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SquadTemplate {
    /// One example agent and one example task
    #[default]
    Basic,
    /// Extractor and transformer agents with an extraction task
    Etl,
    /// Agents only, no tasks
    AgentOnly,
}

impl SquadTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Etl => "etl",
            Self::AgentOnly => "agent-only",
        }
    }
}

impl fmt::Display for SquadTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SquadTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "etl" => Ok(Self::Etl),
            "agent-only" => Ok(Self::AgentOnly),
            other => Err(format!("unknown template: {}", other)),
        }
    }
}

/// What the designer extracted from the documentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainAnalysis {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub workflows: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecommendation {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub user_added: bool,
    #[serde(default)]
    pub user_modified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecommendation {
    pub name: String,
    pub agent: String,
    #[serde(default)]
    pub entrada: Vec<String>,
    #[serde(default)]
    pub saida: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub agents: Vec<AgentRecommendation>,
    #[serde(default)]
    pub tasks: Vec<TaskRecommendation>,
    #[serde(default)]
    pub template: SquadTemplate,
    #[serde(default)]
    pub config_mode: ConfigMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintSquad {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintMetadata {
    /// ISO-8601 UTC timestamp with milliseconds
    pub created_at: String,
    #[serde(default)]
    pub source_docs: Vec<String>,
    #[serde(default)]
    pub user_adjustments: u32,
    #[serde(default)]
    pub overall_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub squad: BlueprintSquad,
    #[serde(default)]
    pub analysis: DomainAnalysis,
    pub recommendations: Recommendations,
    pub metadata: BlueprintMetadata,
}

impl Blueprint {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn find_agent(&self, id: &str) -> Option<&AgentRecommendation> {
        self.recommendations.agents.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_blueprint_defaults() {
        let yaml = r#"
squad:
  name: orders-squad
recommendations:
  agents:
    - id: order-manager
      confidence: 0.9
metadata:
  created_at: "2025-01-01T00:00:00.000Z"
"#;
        let blueprint = Blueprint::from_yaml_str(yaml).unwrap();
        assert_eq!(blueprint.recommendations.template, SquadTemplate::Basic);
        assert_eq!(blueprint.recommendations.config_mode, ConfigMode::Extend);
        assert!(blueprint.recommendations.tasks.is_empty());
        assert!(blueprint.find_agent("order-manager").unwrap().commands.is_empty());
        assert!(!blueprint.find_agent("order-manager").unwrap().user_added);
    }

    #[test]
    fn test_template_names() {
        assert_eq!("agent-only".parse::<SquadTemplate>().unwrap(), SquadTemplate::AgentOnly);
        assert!("fancy".parse::<SquadTemplate>().is_err());
        let yaml = serde_yaml::to_string(&SquadTemplate::AgentOnly).unwrap();
        assert_eq!(yaml.trim(), "agent-only");
    }
}
