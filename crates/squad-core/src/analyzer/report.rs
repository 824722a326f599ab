//! Rendering of analysis results

use std::fmt::Write;
use std::str::FromStr;

use super::{AnalysisResult, AnalyzerError, AnalyzerResult, COMPONENT_DIRECTORIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Console,
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "text" => Ok(Self::Console),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(AnalyzerError::analysis_failed(format!(
                "unknown report format '{}'",
                other
            ))),
        }
    }
}

pub fn format_report(result: &AnalysisResult, format: ReportFormat) -> AnalyzerResult<String> {
    match format {
        ReportFormat::Console => Ok(console(result)),
        ReportFormat::Markdown => Ok(markdown(result)),
        ReportFormat::Json => {
            serde_json::to_string_pretty(result).map_err(AnalyzerError::analysis_failed)
        }
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn console(result: &AnalysisResult) -> String {
    let o = &result.overview;
    let c = &result.coverage;
    let mut out = String::new();

    let _ = writeln!(out, "=== Squad Analysis: {} ===", o.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "Overview");
    let _ = writeln!(out, "  Name:        {}", o.name);
    let _ = writeln!(out, "  Version:     {}", or_dash(&o.version));
    let _ = writeln!(out, "  Author:      {}", or_dash(&o.author));
    let _ = writeln!(out, "  Description: {}", or_dash(&o.description));
    let _ = writeln!(out, "  Path:        {}", result.squad_path.display());
    let _ = writeln!(out);

    let _ = writeln!(out, "Components");
    for kind in COMPONENT_DIRECTORIES {
        let names = result.inventory.names(kind);
        if names.is_empty() {
            let _ = writeln!(out, "  {:<11} 0", kind.dir_name());
        } else {
            let _ = writeln!(out, "  {:<11} {}  ({})", kind.dir_name(), names.len(), names.join(", "));
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Coverage");
    let _ = writeln!(
        out,
        "  Agents with tasks: {}/{} ({}%)",
        c.agents.with_tasks, c.agents.total, c.agents.percentage
    );
    let _ = writeln!(out, "  Tasks:             {}", c.tasks.total);
    let _ = writeln!(
        out,
        "  Directories:       {}/{} populated",
        c.directories.populated, c.directories.total
    );
    let _ = writeln!(
        out,
        "  README:            {}",
        if c.documentation.has_readme { "present" } else { "missing" }
    );

    if !result.suggestions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Suggestions");
        for s in &result.suggestions {
            let _ = writeln!(
                out,
                "  [{}] ({}) {}",
                s.priority.as_str().to_uppercase(),
                s.category,
                s.message
            );
        }
    }

    out
}

fn markdown(result: &AnalysisResult) -> String {
    let o = &result.overview;
    let c = &result.coverage;
    let mut out = String::new();

    let _ = writeln!(out, "# Squad Analysis: {}", o.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Overview");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Property | Value |");
    let _ = writeln!(out, "|----------|-------|");
    let _ = writeln!(out, "| Name | {} |", o.name);
    let _ = writeln!(out, "| Version | {} |", or_dash(&o.version));
    let _ = writeln!(out, "| Author | {} |", or_dash(&o.author));
    let _ = writeln!(out, "| Description | {} |", or_dash(&o.description));
    let _ = writeln!(out, "| License | {} |", or_dash(&o.license));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Components");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Type | Count | Files |");
    let _ = writeln!(out, "|------|-------|-------|");
    for kind in COMPONENT_DIRECTORIES {
        let names = result.inventory.names(kind);
        let _ = writeln!(out, "| {} | {} | {} |", kind.dir_name(), names.len(), names.join(", "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Coverage");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- **Agents with tasks:** {}/{} ({}%)",
        c.agents.with_tasks, c.agents.total, c.agents.percentage
    );
    let _ = writeln!(out, "- **Tasks:** {}", c.tasks.total);
    let _ = writeln!(
        out,
        "- **Directories populated:** {}/{}",
        c.directories.populated, c.directories.total
    );
    let _ = writeln!(
        out,
        "- **README:** {}",
        if c.documentation.has_readme { "yes" } else { "no" }
    );

    if !result.suggestions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Suggestions");
        let _ = writeln!(out);
        for (i, s) in result.suggestions.iter().enumerate() {
            let _ = writeln!(out, "{}. **[{}]** {} ({})", i + 1, s.priority.as_str(), s.message, s.category);
        }
    }

    out
}
