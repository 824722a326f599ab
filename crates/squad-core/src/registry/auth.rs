//! Subprocess seam and hosting CLI authentication check

use std::path::PathBuf;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

static USERNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bas|\baccount)\s+([A-Za-z0-9][A-Za-z0-9-]*)").expect("valid username regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion. `Err` only when it could not be started.
    async fn run(
        &self,
        program: &str,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    ) -> anyhow::Result<CommandOutput>;
}

/// Runs real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    ) -> anyhow::Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(&args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// Ask `<cli> auth status` whether the user is logged in.
///
/// Any failure means "not authenticated"; it is never an error.
pub async fn check_auth(runner: &dyn CommandRunner, cli: &str) -> AuthStatus {
    let args = vec!["auth".to_string(), "status".to_string()];
    match runner.run(cli, args, None).await {
        Ok(output) if output.success => {
            // gh prints the status to stderr on some versions
            let text = format!("{}\n{}", output.stdout, output.stderr);
            let username = USERNAME.captures(&text).map(|c| c[1].to_string());
            AuthStatus {
                authenticated: true,
                username,
            }
        }
        Ok(output) => {
            debug!("{} auth status failed: {}", cli, output.stderr.trim());
            AuthStatus::default()
        }
        Err(e) => {
            debug!("could not run {}: {}", cli, e);
            AuthStatus::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_auth_extracts_username() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args, _| program == "gh" && args.join(" ") == "auth status")
            .returning(|_, _, _| Ok(CommandOutput::ok("github.com\n  Logged in to github.com as myusername (oauth_token)")));

        let status = check_auth(&runner, "gh").await;
        assert!(status.authenticated);
        assert_eq!(status.username.as_deref(), Some("myusername"));
    }

    #[tokio::test]
    async fn test_check_auth_account_format() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _, _| {
            Ok(CommandOutput {
                success: true,
                stdout: String::new(),
                stderr: "✓ Logged in to github.com account octo-cat (keyring)".to_string(),
            })
        });

        let status = check_auth(&runner, "gh").await;
        assert_eq!(status.username.as_deref(), Some("octo-cat"));
    }

    #[tokio::test]
    async fn test_check_auth_failures_are_soft() {
        let mut failing = MockCommandRunner::new();
        failing
            .expect_run()
            .returning(|_, _, _| Ok(CommandOutput::failed("You are not logged into any GitHub hosts")));
        assert_eq!(check_auth(&failing, "gh").await, AuthStatus::default());

        let mut missing = MockCommandRunner::new();
        missing
            .expect_run()
            .returning(|_, _, _| Err(anyhow::anyhow!("No such file or directory")));
        let status = check_auth(&missing, "gh").await;
        assert!(!status.authenticated);
        assert!(status.username.is_none());
    }
}
