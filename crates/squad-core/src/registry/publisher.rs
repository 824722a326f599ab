//! Publishing squads to the community repository as pull requests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::auth::{CommandOutput, CommandRunner, TokioCommandRunner, check_auth};
use super::error::{PublisherError, PublisherResult};
use super::{Registry, SquadCategory, SquadMeta};
use crate::config::{SQUADS_REPO, SquadSettings};
use crate::fsutil;
use crate::manifest::{ComponentKind, Manifest, find_manifest, read_manifest};
use crate::validator::{ManifestValidator, SquadValidator};

pub const SAFE_NAME_PATTERN: &str = r"^[A-Za-z0-9._-]+$";
pub const DRY_RUN_PR_URL: &str = "[dry-run] PR would be created";
const REGISTRY_FILE: &str = "registry.json";
const COPY_EXCLUDES: [&str; 3] = [".backup", ".git", "node_modules"];

static SAFE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(SAFE_NAME_PATTERN).expect("valid name regex"));
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid unsafe regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen regex"));

/// Replace characters outside `SAFE_NAME_PATTERN` with hyphens.
pub fn sanitize_for_shell(input: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(input, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&replaced, "-");
    collapsed.trim_matches('-').to_string()
}

pub fn is_valid_name(name: &str) -> bool {
    SAFE_NAME.is_match(name)
}

#[derive(Debug, Clone)]
pub struct PublisherOptions {
    /// `owner/repo` receiving the pull request
    pub repo: String,
    pub auth_cli: String,
    pub verbose: bool,
    /// Clone location; a fresh temp directory when unset
    pub work_dir: Option<PathBuf>,
}

impl Default for PublisherOptions {
    fn default() -> Self {
        Self {
            repo: SQUADS_REPO.to_string(),
            auth_cli: "gh".to_string(),
            verbose: false,
            work_dir: None,
        }
    }
}

impl PublisherOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            repo: settings.registry.repo.clone(),
            auth_cli: settings.auth.cli.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    /// Compute everything, mutate nothing
    pub dry_run: bool,
    pub category: SquadCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrPreview {
    pub title: String,
    pub body: String,
    pub repo: String,
    pub category: SquadCategory,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub pr_url: String,
    pub branch: String,
    pub manifest: Manifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PrPreview>,
}

/// Render the pull request description for a squad.
pub fn generate_pr_body(manifest: &Manifest, category: SquadCategory) -> String {
    let name = manifest.name.as_deref().unwrap_or("unnamed-squad");
    let version = manifest.version.as_deref().unwrap_or("1.0.0");
    let author = manifest.author.as_deref().unwrap_or("Unknown");
    let description = manifest
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description provided");

    let mut body = format!("## New Squad: {}\n\n", name);
    body.push_str(&format!("**Version:** {}\n", version));
    body.push_str(&format!("**Author:** {}\n", author));
    body.push_str(&format!("**Category:** {}\n\n", category));

    body.push_str("### Description\n\n");
    body.push_str(description);
    body.push_str("\n\n### Components\n\n| Type | Count |\n|------|-------|\n");
    for kind in ComponentKind::ALL {
        let label = crate::naming::to_title_case(kind.dir_name());
        body.push_str(&format!("| {} | {} |\n", label, manifest.components_of(kind).len()));
    }

    body.push_str("\n### Pre-submission Checklist\n\n");
    body.push_str("- [x] Squad follows AIOS task-first architecture\n");
    body.push_str("- [x] Manifest passes squad validation\n");
    body.push_str("- [ ] Documentation is complete\n");
    body.push_str("- [ ] No sensitive data included\n");
    body.push_str("\n---\n*Submitted via `*publish-squad` from AIOS-FullStack*\n");
    body
}

/// Insert or refresh `manifest` in a local registry file.
///
/// A missing file starts from an empty registry; the category list stays
/// sorted by name.
pub async fn update_registry(
    registry_path: &Path,
    manifest: &Manifest,
    category: SquadCategory,
) -> PublisherResult<Registry> {
    let name = manifest
        .name
        .clone()
        .ok_or_else(|| PublisherError::manifest_error(registry_path, "manifest has no name"))?;

    let mut registry = match tokio::fs::read_to_string(registry_path).await {
        Ok(content) => serde_json::from_str::<Registry>(&content)
            .map_err(|e| PublisherError::pr_error("parse registry", e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Registry::default(),
        Err(e) => return Err(PublisherError::pr_error("read registry", e)),
    };

    let version = manifest.version.clone().unwrap_or_else(|| "1.0.0".to_string());
    let list = registry.category_mut(category);
    match list.iter_mut().find(|s| s.name == name) {
        Some(existing) => {
            existing.version = version;
            if manifest.description.is_some() {
                existing.description = manifest.description.clone();
            }
        }
        None => list.push(SquadMeta {
            name,
            version,
            description: manifest.description.clone(),
            author: manifest.author.clone(),
            ..Default::default()
        }),
    }
    list.sort_by(|a, b| a.name.cmp(&b.name));

    let json = serde_json::to_string_pretty(&registry)
        .map_err(|e| PublisherError::pr_error("serialize registry", e))?;
    fsutil::write_atomic(registry_path, format!("{}\n", json))
        .await
        .map_err(|e| PublisherError::pr_error("write registry", e))?;
    Ok(registry)
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub struct SquadPublisher {
    options: PublisherOptions,
    runner: Arc<dyn CommandRunner>,
    validator: Arc<dyn SquadValidator>,
}

impl SquadPublisher {
    pub fn new(options: PublisherOptions) -> Self {
        Self {
            options,
            runner: Arc::new(TokioCommandRunner),
            validator: Arc::new(ManifestValidator),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SquadValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn repo(&self) -> &str {
        &self.options.repo
    }

    fn log(&self, message: &str) {
        if self.options.verbose {
            info!("[SquadPublisher] {}", message);
        } else {
            debug!("[SquadPublisher] {}", message);
        }
    }

    pub async fn check_auth(&self) -> super::AuthStatus {
        check_auth(self.runner.as_ref(), &self.options.auth_cli).await
    }

    /// Submit the squad at `squad_path` as a pull request.
    ///
    /// Content problems are reported before authentication is checked.
    pub async fn publish(
        &self,
        squad_path: &Path,
        options: PublishOptions,
    ) -> PublisherResult<PublishResult> {
        if !fsutil::path_exists(squad_path).await {
            return Err(PublisherError::squad_not_found(squad_path));
        }

        self.log(&format!("Validating {}", squad_path.display()));
        let report = self
            .validator
            .validate(squad_path)
            .await
            .map_err(|e| PublisherError::validation_failed(vec![format!("Validator error: {}", e)]))?;
        if !report.valid {
            return Err(PublisherError::validation_failed(report.error_messages()));
        }

        let manifest = self.load_manifest(squad_path).await?;
        let name = manifest.name.clone().unwrap_or_default();
        if !is_valid_name(&name) {
            return Err(PublisherError::invalid_squad_name(&name));
        }
        let version = manifest.version.clone().unwrap_or_else(|| "1.0.0".to_string());

        let auth = self.check_auth().await;
        if !auth.authenticated {
            return Err(PublisherError::auth_required(&self.options.auth_cli));
        }
        if let Some(user) = auth.username.as_deref() {
            self.log(&format!("Authenticated as {}", user));
        }

        let branch = format!("squad/{}-v{}", name, sanitize_for_shell(&version));
        let title = format!("Add squad: {} v{}", name, version);
        let body = generate_pr_body(&manifest, options.category);

        if options.dry_run {
            self.log(&format!("Dry run: would open {} on {}", branch, self.options.repo));
            return Ok(PublishResult {
                pr_url: DRY_RUN_PR_URL.to_string(),
                branch: branch.clone(),
                manifest,
                preview: Some(PrPreview {
                    title,
                    body,
                    repo: self.options.repo.clone(),
                    category: options.category,
                    branch,
                }),
            });
        }

        let work_dir = self.options.work_dir.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!(
                "squad-publish-{}-{}",
                name,
                chrono::Utc::now().timestamp_millis()
            ))
        });
        let outcome = self
            .submit(squad_path, &work_dir, &manifest, options.category, &branch, &title, &body)
            .await;
        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", work_dir.display(), e);
            }
        }
        let pr_url = outcome?;

        self.log(&format!("Opened {}", pr_url));
        Ok(PublishResult {
            pr_url,
            branch,
            manifest,
            preview: None,
        })
    }

    async fn load_manifest(&self, squad_path: &Path) -> PublisherResult<Manifest> {
        let location = find_manifest(squad_path)
            .await
            .ok_or_else(|| PublisherError::manifest_error(squad_path, "no squad.yaml or config.yaml"))?;
        read_manifest(&location.path)
            .await
            .map_err(|e| PublisherError::manifest_error(squad_path, e))
    }

    async fn run_step(
        &self,
        step: &str,
        program: &str,
        args: Vec<String>,
        cwd: Option<&Path>,
    ) -> PublisherResult<CommandOutput> {
        debug!("[SquadPublisher] {}: {} {}", step, program, args.join(" "));
        let output = self
            .runner
            .run(program, args, cwd.map(Path::to_path_buf))
            .await
            .map_err(|e| PublisherError::pr_error(step, e))?;
        if !output.success {
            return Err(PublisherError::pr_error(step, output.stderr.trim()));
        }
        Ok(output)
    }

    #[allow(clippy::too_many_arguments)]
    async fn submit(
        &self,
        squad_path: &Path,
        work_dir: &Path,
        manifest: &Manifest,
        category: SquadCategory,
        branch: &str,
        title: &str,
        body: &str,
    ) -> PublisherResult<String> {
        let cli = self.options.auth_cli.as_str();
        let name = manifest.name.as_deref().unwrap_or_default();
        let work = work_dir.to_string_lossy().into_owned();

        self.log(&format!("Cloning {}", self.options.repo));
        self.run_step(
            "clone repository",
            cli,
            vec!["repo".into(), "clone".into(), self.options.repo.clone(), work],
            None,
        )
        .await?;
        self.run_step("create branch", "git", args(&["checkout", "-b", branch]), Some(work_dir))
            .await?;

        let src = squad_path.to_path_buf();
        let package_rel = format!("packages/{}", name);
        let dst = work_dir.join(&package_rel);
        let copied = tokio::task::spawn_blocking(move || fsutil::copy_dir(&src, &dst, &COPY_EXCLUDES))
            .await
            .map_err(|e| PublisherError::pr_error("copy squad", e))?
            .map_err(|e| PublisherError::pr_error("copy squad", e))?;
        self.log(&format!("Copied {} files to {}", copied.len(), package_rel));

        update_registry(&work_dir.join(REGISTRY_FILE), manifest, category).await?;

        self.run_step(
            "stage changes",
            "git",
            args(&["add", package_rel.as_str(), REGISTRY_FILE]),
            Some(work_dir),
        )
        .await?;
        self.run_step("commit", "git", args(&["commit", "-m", title]), Some(work_dir))
            .await?;
        self.run_step("push branch", "git", args(&["push", "-u", "origin", branch]), Some(work_dir))
            .await?;
        let created = self
            .run_step(
                "create pull request",
                cli,
                args(&[
                    "pr",
                    "create",
                    "--repo",
                    self.options.repo.as_str(),
                    "--title",
                    title,
                    "--body",
                    body,
                    "--head",
                    branch,
                ]),
                Some(work_dir),
            )
            .await?;

        Ok(created
            .stdout
            .lines()
            .map(str::trim)
            .rfind(|l| l.starts_with("http"))
            .unwrap_or_else(|| created.stdout.trim())
            .to_string())
    }
}

#[cfg(test)]
mod tests;
