//! Starter files shipped with each squad template

use std::fmt::Write;

use crate::blueprint::SquadTemplate;
use crate::manifest::ConfigMode;
use crate::templates::{self, AgentDoc, TaskDoc};

/// A file to write, relative to the squad root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterFile {
    pub relative_path: String,
    pub content: String,
}

struct StarterAgent {
    id: &'static str,
    role: &'static str,
    commands: &'static [&'static str],
}

struct StarterTask {
    agent: &'static str,
    name: &'static str,
    description: &'static str,
    entrada: &'static [&'static str],
    saida: &'static [&'static str],
}

const BASIC_AGENTS: &[StarterAgent] = &[StarterAgent {
    id: "example-agent",
    role: "Example agent. Replace with your squad's first specialist",
    commands: &["example-task"],
}];

const BASIC_TASKS: &[StarterTask] = &[StarterTask {
    agent: "example-agent",
    name: "example-task",
    description: "Example task. Describe what the agent does here.",
    entrada: &["input"],
    saida: &["result"],
}];

const ETL_AGENTS: &[StarterAgent] = &[
    StarterAgent {
        id: "data-extractor",
        role: "Extracts raw data from configured sources",
        commands: &["extract-data"],
    },
    StarterAgent {
        id: "data-transformer",
        role: "Cleans and transforms extracted data",
        commands: &[],
    },
];

const ETL_TASKS: &[StarterTask] = &[StarterTask {
    agent: "data-extractor",
    name: "extract-data",
    description: "Pull records from a source and stage them for transformation.",
    entrada: &["source_url", "format"],
    saida: &["raw_data", "record_count"],
}];

const AGENT_ONLY_AGENTS: &[StarterAgent] = &[
    StarterAgent {
        id: "primary-agent",
        role: "Primary agent of the squad",
        commands: &[],
    },
    StarterAgent {
        id: "helper-agent",
        role: "Supports the primary agent",
        commands: &[],
    },
];

fn template_agents(template: SquadTemplate) -> &'static [StarterAgent] {
    match template {
        SquadTemplate::Basic => BASIC_AGENTS,
        SquadTemplate::Etl => ETL_AGENTS,
        SquadTemplate::AgentOnly => AGENT_ONLY_AGENTS,
    }
}

fn template_tasks(template: SquadTemplate) -> &'static [StarterTask] {
    match template {
        SquadTemplate::Basic => BASIC_TASKS,
        SquadTemplate::Etl => ETL_TASKS,
        SquadTemplate::AgentOnly => &[],
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn agent_files(template: SquadTemplate, squad: &str) -> Vec<StarterFile> {
    template_agents(template)
        .iter()
        .map(|agent| {
            let commands = owned(agent.commands);
            StarterFile {
                relative_path: format!("agents/{}.md", agent.id),
                content: templates::agent_markdown(&AgentDoc {
                    id: agent.id,
                    squad,
                    role: agent.role,
                    commands: &commands,
                    confidence: None,
                    note: None,
                }),
            }
        })
        .collect()
}

/// Task files are named `<agent>-<task>.md`
pub fn task_files(template: SquadTemplate) -> Vec<StarterFile> {
    template_tasks(template)
        .iter()
        .map(|task| StarterFile {
            relative_path: format!("tasks/{}-{}.md", task.agent, task.name),
            content: templates::task_markdown(&TaskDoc {
                name: task.name,
                agent: task.agent,
                description: task.description,
                entrada: &owned(task.entrada),
                saida: &owned(task.saida),
                checklist: &owned(&["Validate input parameters", "Review output"]),
                confidence: None,
            }),
        })
        .collect()
}

const CONFIG_DOCS: &[(&str, &str)] = &[
    ("coding-standards.md", "Coding Standards"),
    ("tech-stack.md", "Tech Stack"),
    ("source-tree.md", "Source Tree"),
];

/// Config files for `mode`; none for [`ConfigMode::None`].
pub fn config_files(mode: ConfigMode, squad: &str) -> Vec<StarterFile> {
    if mode == ConfigMode::None {
        return Vec::new();
    }
    CONFIG_DOCS
        .iter()
        .map(|(file, title)| {
            let mut content = String::new();
            let _ = writeln!(content, "# {}", title);
            let _ = writeln!(content);
            match mode {
                ConfigMode::Extend => {
                    let _ = writeln!(
                        content,
                        "> Extends the project-level `{}`. Rules below are added on top of it.",
                        file
                    );
                    let _ = writeln!(content);
                    let _ = writeln!(content, "## {} additions", squad);
                    let _ = writeln!(content);
                    let _ = writeln!(content, "- (none yet)");
                }
                _ => {
                    let _ = writeln!(
                        content,
                        "> Overrides project-level configuration. This file is the complete {} for {}.",
                        title.to_lowercase(),
                        squad
                    );
                    let _ = writeln!(content);
                    let _ = writeln!(content, "## Rules");
                    let _ = writeln!(content);
                    let _ = writeln!(content, "- Component names use kebab-case");
                    let _ = writeln!(content, "- Tasks are named `<agent>-<task>.md`");
                }
            }
            StarterFile {
                relative_path: format!("config/{}", file),
                content,
            }
        })
        .collect()
}

pub fn readme(name: &str, description: &str, template: SquadTemplate) -> String {
    format!(
        "# {name}\n\n{description}\n\n## Structure\n\n\
         - `agents/` agent definitions\n\
         - `tasks/` tasks, named `<agent>-<task>.md`\n\
         - `workflows/`, `checklists/`, `templates/`, `tools/`, `scripts/`, `data/`\n\n\
         Generated from the `{template}` template.\n\n\
         ## Usage\n\n```\n@squad-creator *validate-squad {name}\n```\n"
    )
}
