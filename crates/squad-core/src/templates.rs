//! Markdown and YAML bodies for generated component files

use std::fmt::Write;

use crate::naming::to_title_case;

/// Quote a value for inline YAML
pub fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

fn yaml_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "{}: []", key);
    } else {
        let _ = writeln!(out, "{}:", key);
        for item in items {
            let _ = writeln!(out, "  - {}", yaml_quote(item));
        }
    }
}

pub struct AgentDoc<'a> {
    pub id: &'a str,
    pub squad: &'a str,
    pub role: &'a str,
    pub commands: &'a [String],
    pub confidence: Option<f64>,
    /// Provenance line such as "Added by user"
    pub note: Option<&'a str>,
}

pub fn agent_markdown(doc: &AgentDoc<'_>) -> String {
    let title = to_title_case(doc.id);
    let mut out = String::new();

    let _ = writeln!(out, "# {}", doc.id);
    let _ = writeln!(out);
    let _ = writeln!(out, "> {}", doc.role);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Agent Definition");
    let _ = writeln!(out);
    let _ = writeln!(out, "```yaml");
    let _ = writeln!(out, "agent:");
    let _ = writeln!(out, "  name: {}", title);
    let _ = writeln!(out, "  id: {}", doc.id);
    let _ = writeln!(out, "  squad: {}", doc.squad);
    let _ = writeln!(out, "  title: {}", title);
    let _ = writeln!(out, "  icon: \u{1F916}");
    let _ = writeln!(out, "persona:");
    let _ = writeln!(out, "  role: {}", yaml_quote(doc.role));
    let _ = writeln!(out, "commands:");
    let _ = writeln!(out, "  - help: Show available commands");
    for cmd in doc.commands {
        let _ = writeln!(out, "  - {}: Run the {} task", cmd, cmd);
    }
    let _ = writeln!(out, "dependencies:");
    if doc.commands.is_empty() {
        let _ = writeln!(out, "  tasks: []");
    } else {
        let _ = writeln!(out, "  tasks:");
        for cmd in doc.commands {
            let _ = writeln!(out, "    - {}.md", cmd);
        }
    }
    let _ = writeln!(out, "```");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Commands");
    let _ = writeln!(out);
    let _ = writeln!(out, "- `*help` - Show available commands");
    for cmd in doc.commands {
        let _ = writeln!(out, "- `*{}` - Run the {} task", cmd, cmd);
    }

    if doc.confidence.is_some() || doc.note.is_some() {
        let _ = writeln!(out);
        let _ = writeln!(out, "---");
        if let Some(confidence) = doc.confidence {
            let _ = writeln!(out, "Confidence: {}", percent(confidence));
        }
        if let Some(note) = doc.note {
            let _ = writeln!(out, "*{}*", note);
        }
    }

    out
}

pub struct TaskDoc<'a> {
    pub name: &'a str,
    pub agent: &'a str,
    pub description: &'a str,
    pub entrada: &'a [String],
    pub saida: &'a [String],
    pub checklist: &'a [String],
    pub confidence: Option<f64>,
}

pub fn task_markdown(doc: &TaskDoc<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "---");
    let _ = writeln!(out, "task: {}", to_title_case(doc.name));
    let _ = writeln!(out, "responsavel: \"@{}\"", doc.agent);
    let _ = writeln!(out, "responsavel_type: agent");
    let _ = writeln!(out, "atomic_layer: task");
    yaml_list(&mut out, "Entrada", doc.entrada);
    yaml_list(&mut out, "Saida", doc.saida);
    let _ = writeln!(out, "Checklist:");
    for item in doc.checklist {
        let _ = writeln!(out, "  - {}", yaml_quote(&format!("[ ] {}", item)));
    }
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(out, "# *{}", doc.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", doc.description);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Inputs");
    let _ = writeln!(out);
    if doc.entrada.is_empty() {
        let _ = writeln!(out, "- None");
    }
    for item in doc.entrada {
        let _ = writeln!(out, "- `{}`", item);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## Outputs");
    let _ = writeln!(out);
    if doc.saida.is_empty() {
        let _ = writeln!(out, "- None");
    }
    for item in doc.saida {
        let _ = writeln!(out, "- `{}`", item);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## Checklist");
    let _ = writeln!(out);
    for item in doc.checklist {
        let _ = writeln!(out, "- [ ] {}", item);
    }

    if let Some(confidence) = doc.confidence {
        let _ = writeln!(out);
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "Confidence: {}", percent(confidence));
    }

    out
}

pub fn workflow_yaml(name: &str, description: &str, agent: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "workflow:");
    let _ = writeln!(out, "  id: {}", name);
    let _ = writeln!(out, "  name: {}", to_title_case(name));
    let _ = writeln!(out, "  description: {}", yaml_quote(description));
    let _ = writeln!(out, "  steps:");
    let _ = writeln!(out, "    - id: step-1");
    let _ = writeln!(out, "      agent: {}", agent.unwrap_or("unassigned"));
    let _ = writeln!(out, "      action: {}", yaml_quote("Describe the first step"));
    out
}

pub fn checklist_markdown(name: &str, description: &str) -> String {
    format!(
        "# {}\n\n{}\n\n## Items\n\n- [ ] Inputs validated\n- [ ] Output reviewed\n- [ ] Results documented\n",
        to_title_case(name),
        description
    )
}

pub fn template_markdown(name: &str, description: &str) -> String {
    format!(
        "# {}\n\n{}\n\n## {{{{section}}}}\n\n{{{{content}}}}\n",
        to_title_case(name),
        description
    )
}

pub fn script_js(name: &str, description: &str) -> String {
    format!(
        "/**\n * {}\n *\n * {}\n */\n\nmodule.exports = {{\n  name: '{}',\n  description: {},\n  async run(input) {{\n    return input;\n  }},\n}};\n",
        to_title_case(name),
        description,
        name,
        yaml_quote(description)
    )
}

pub fn data_yaml(name: &str, description: &str) -> String {
    format!(
        "# {}\n# {}\n{}:\n  entries: []\n",
        to_title_case(name),
        description,
        name.replace('-', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_markdown_with_commands() {
        let commands = vec!["create-order".to_string(), "update-order".to_string()];
        let doc = AgentDoc {
            id: "order-manager",
            squad: "orders",
            role: "Manages orders",
            commands: &commands,
            confidence: Some(0.92),
            note: Some("Added by user"),
        };
        let md = agent_markdown(&doc);
        assert!(md.starts_with("# order-manager\n"));
        assert!(md.contains("id: order-manager"));
        assert!(md.contains("Manages orders"));
        assert!(md.contains("- `*create-order`"));
        assert!(md.contains("    - update-order.md"));
        assert!(md.contains("Confidence: 92%"));
        assert!(md.contains("*Added by user*"));
    }

    #[test]
    fn test_task_markdown_frontmatter() {
        let entrada = vec!["customer_id".to_string()];
        let checklist = vec!["Validate input parameters".to_string()];
        let doc = TaskDoc {
            name: "create-order",
            agent: "order-manager",
            description: "Create an order",
            entrada: &entrada,
            saida: &[],
            checklist: &checklist,
            confidence: Some(0.88),
        };
        let md = task_markdown(&doc);
        assert!(md.contains("responsavel: \"@order-manager\""));
        assert!(md.contains("Saida: []"));
        assert!(md.contains("  - \"[ ] Validate input parameters\""));
        assert!(md.contains("# *create-order"));
        assert!(md.contains("Confidence: 88%"));
    }

    #[test]
    fn test_yaml_quote_escapes() {
        assert_eq!(yaml_quote(r#"say "hi""#), r#""say \"hi\"""#);
    }
}
