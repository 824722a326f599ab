use std::fmt::Write;

use super::{ActionStatus, MigrationAnalysis, MigrationResult};

/// Plain-text migration report
pub fn generate_report(analysis: &MigrationAnalysis, result: Option<&MigrationResult>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "SQUAD MIGRATION REPORT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Squad Path: {}", analysis.squad_path.display());
    let _ = writeln!(out, "Manifest: {}", analysis.manifest_path.display());
    let _ = writeln!(out);

    if !analysis.needs_migration {
        let _ = writeln!(out, "Squad is up to date. No migration needed.");
    } else {
        let _ = writeln!(out, "ISSUES FOUND ({}):", analysis.issues.len());
        for (i, issue) in analysis.issues.iter().enumerate() {
            let code = serde_json::to_value(issue.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            let _ = writeln!(out, "  {}. [{}] {}", i + 1, code, issue.message);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "PLANNED ACTIONS:");
        for (i, action) in analysis.actions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, action.describe());
        }
    }

    if let Some(result) = result {
        let _ = writeln!(out);
        let _ = writeln!(out, "MIGRATION RESULT:");
        let _ = writeln!(
            out,
            "  Status: {}",
            if result.success { "SUCCESS" } else { "FAILURE" }
        );
        let _ = writeln!(out, "  Message: {}", result.message);
        match &result.backup_path {
            Some(path) => {
                let _ = writeln!(out, "  Backup: {}", path.display());
            }
            None => {
                let _ = writeln!(out, "  Backup: none");
            }
        }

        if !result.actions.is_empty() {
            let _ = writeln!(out, "  Actions:");
            for record in &result.actions {
                let (mark, label) = match record.status {
                    ActionStatus::Success => ("\u{2713}", "success"),
                    ActionStatus::Failed => ("\u{2717}", "failed"),
                    ActionStatus::DryRun => ("\u{25CB}", "dry-run"),
                };
                let _ = write!(out, "    {} [{}] {}", mark, label, record.action.describe());
                if let Some(error) = &record.error {
                    let _ = write!(out, " ({})", error);
                }
                let _ = writeln!(out);
            }
        }

        if let Some(validation) = &result.validation {
            let _ = writeln!(out);
            let _ = writeln!(out, "Post-Migration Validation:");
            let _ = writeln!(out, "  Valid: {}", if validation.valid { "Yes" } else { "No" });
            let _ = writeln!(out, "  Errors: {}", validation.errors.len());
            let _ = writeln!(out, "  Warnings: {}", validation.warnings.len());
            if let Some(error) = &validation.error {
                let _ = writeln!(out, "  Validator error: {}", error);
            }
            for issue in &validation.errors {
                let _ = writeln!(out, "    - {}", issue.message);
            }
        }
    }

    let _ = writeln!(out, "{}", rule);
    out
}
