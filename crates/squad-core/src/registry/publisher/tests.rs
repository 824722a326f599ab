use super::*;
use crate::error::UnifiedError;
use crate::registry::{MockCommandRunner, PublisherErrorCode};
use crate::validator::{MockSquadValidator, ValidationIssue, ValidationReport};
use parking_lot::Mutex;
use tempfile::TempDir;

const MANIFEST: &str = r#"name: test-squad
version: 1.0.0
description: A test squad
author: Test Author
aios:
  type: squad
  minVersion: 2.1.0
components:
  tasks:
    - task1.md
  agents:
    - agent1.md
"#;

fn valid_squad() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    std::fs::write(root.join("squad.yaml"), MANIFEST).unwrap();
    std::fs::create_dir_all(root.join("tasks")).unwrap();
    std::fs::create_dir_all(root.join("agents")).unwrap();
    std::fs::create_dir_all(root.join(".backup/old")).unwrap();
    std::fs::write(root.join("tasks/task1.md"), "# task1\n").unwrap();
    std::fs::write(root.join("agents/agent1.md"), "# agent1\n").unwrap();
    std::fs::write(root.join(".backup/old/squad.yaml"), "stale").unwrap();
    temp
}

fn logged_in_runner() -> MockCommandRunner {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|_, args, _| args.join(" ") == "auth status")
        .returning(|_, _, _| Ok(CommandOutput::ok("Logged in to github.com as testuser")));
    runner
}

fn publisher(runner: MockCommandRunner) -> SquadPublisher {
    SquadPublisher::new(PublisherOptions::default()).with_runner(Arc::new(runner))
}

#[test]
fn test_sanitize_for_shell() {
    assert_eq!(sanitize_for_shell(""), "");
    assert_eq!(sanitize_for_shell("squad_v1.0"), "squad_v1.0");
    assert_eq!(sanitize_for_shell("my squad"), "my-squad");
    assert_eq!(sanitize_for_shell("test$squad"), "test-squad");
    assert_eq!(sanitize_for_shell("test;rm -rf /"), "test-rm-rf");
    assert_eq!(sanitize_for_shell("test   squad"), "test-squad");
    assert_eq!(sanitize_for_shell("my---squad"), "my-squad");
    assert_eq!(sanitize_for_shell("--test--"), "test");
}

#[test]
fn test_is_valid_name() {
    assert!(is_valid_name("my-squad"));
    assert!(is_valid_name("Squad-Name_v2.1.0"));
    assert!(!is_valid_name("my squad"));
    assert!(!is_valid_name("test;rm"));
    assert!(!is_valid_name("test\nline"));
    assert!(!is_valid_name(""));
}

#[test]
fn test_pr_body_contents() {
    let manifest = Manifest::from_yaml_str(MANIFEST).unwrap();
    let body = generate_pr_body(&manifest, SquadCategory::Community);

    assert!(body.starts_with("## New Squad: test-squad"));
    assert!(body.contains("**Version:** 1.0.0"));
    assert!(body.contains("**Author:** Test Author"));
    assert!(body.contains("**Category:** community"));
    assert!(body.contains("A test squad"));
    assert!(body.contains("| Tasks | 1 |"));
    assert!(body.contains("| Agents | 1 |"));
    assert!(body.contains("| Workflows | 0 |"));
    assert!(body.contains("### Pre-submission Checklist"));
    assert!(body.contains("[x] Squad follows AIOS task-first architecture"));
    assert!(body.contains("[ ] No sensitive data included"));
    assert!(body.contains("*publish-squad"));
    assert!(body.contains("AIOS-FullStack"));
}

#[test]
fn test_pr_body_defaults() {
    let manifest = Manifest {
        name: Some("minimal-squad".to_string()),
        ..Default::default()
    };
    let body = generate_pr_body(&manifest, SquadCategory::Official);
    assert!(body.contains("**Version:** 1.0.0"));
    assert!(body.contains("**Author:** Unknown"));
    assert!(body.contains("No description provided"));
    assert!(body.contains("**Category:** official"));
    assert!(body.contains("| Tasks | 0 |"));
}

#[tokio::test]
async fn test_update_registry_inserts_sorted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("registry.json");
    tokio::fs::write(
        &path,
        r#"{"version":"1.0.0","squads":{"official":[],"community":[{"name":"z-squad","version":"1.0.0"}]}}"#,
    )
    .await
    .unwrap();

    let manifest = Manifest {
        name: Some("a-squad".to_string()),
        version: Some("0.1.0".to_string()),
        ..Default::default()
    };
    update_registry(&path, &manifest, SquadCategory::Community)
        .await
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(written["squads"]["community"][0]["name"], "a-squad");
    assert_eq!(written["squads"]["community"][1]["name"], "z-squad");
}

#[tokio::test]
async fn test_update_registry_updates_in_place_and_initializes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("registry.json");
    let mut manifest = Manifest::from_yaml_str(MANIFEST).unwrap();

    let registry = update_registry(&path, &manifest, SquadCategory::Community)
        .await
        .unwrap();
    assert_eq!(registry.squads.community.len(), 1);
    assert!(registry.squads.official.is_empty());

    manifest.version = Some("2.0.0".to_string());
    manifest.description = Some("Updated".to_string());
    let registry = update_registry(&path, &manifest, SquadCategory::Community)
        .await
        .unwrap();
    assert_eq!(registry.squads.community.len(), 1);
    assert_eq!(registry.squads.community[0].version, "2.0.0");
    assert_eq!(registry.squads.community[0].description.as_deref(), Some("Updated"));
}

#[tokio::test]
async fn test_update_registry_rejects_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("registry.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();
    let manifest = Manifest::from_yaml_str(MANIFEST).unwrap();

    let err = update_registry(&path, &manifest, SquadCategory::Community)
        .await
        .unwrap_err();
    assert_eq!(err.code(), PublisherErrorCode::PrError);
}

#[tokio::test]
async fn test_publish_missing_squad() {
    let temp = TempDir::new().unwrap();
    let err = publisher(MockCommandRunner::new())
        .publish(&temp.path().join("ghost"), PublishOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "SQUAD_NOT_FOUND");
}

#[tokio::test]
async fn test_validation_is_checked_before_auth() {
    let squad = valid_squad();
    let mut validator = MockSquadValidator::new();
    validator.expect_validate().returning(|_| {
        Ok(ValidationReport::from_issues(
            vec![ValidationIssue::new("Missing required field: version")],
            Vec::new(),
        ))
    });
    // no auth expectation: the runner must not be called
    let publisher = publisher(MockCommandRunner::new()).with_validator(Arc::new(validator));

    let err = publisher
        .publish(squad.path(), PublishOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), PublisherErrorCode::ValidationFailed);
    assert_eq!(err.details, vec!["Missing required field: version"]);
}

#[tokio::test]
async fn test_auth_required() {
    let squad = valid_squad();
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .returning(|_, _, _| Ok(CommandOutput::failed("not logged in")));

    let err = publisher(runner)
        .publish(squad.path(), PublishOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), PublisherErrorCode::AuthRequired);
    assert_eq!(err.message, "Not authenticated");
    assert_eq!(err.suggestion.as_deref(), Some("Run: gh auth login"));
    assert!(err.to_string().contains("[AUTH_REQUIRED]"));
}

#[tokio::test]
async fn test_invalid_name_is_rejected() {
    let squad = valid_squad();
    std::fs::write(
        squad.path().join("squad.yaml"),
        MANIFEST.replace("name: test-squad", "name: \"test;rm\""),
    )
    .unwrap();
    let mut validator = MockSquadValidator::new();
    validator
        .expect_validate()
        .returning(|_| Ok(ValidationReport::from_issues(Vec::new(), Vec::new())));

    let err = publisher(MockCommandRunner::new())
        .with_validator(Arc::new(validator))
        .publish(squad.path(), PublishOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), PublisherErrorCode::InvalidSquadName);
}

#[tokio::test]
async fn test_dry_run_preview() {
    let squad = valid_squad();
    let result = publisher(logged_in_runner())
        .publish(
            squad.path(),
            PublishOptions {
                dry_run: true,
                category: SquadCategory::Community,
            },
        )
        .await
        .unwrap();

    assert_eq!(result.pr_url, DRY_RUN_PR_URL);
    assert_eq!(result.branch, "squad/test-squad-v1.0.0");
    let preview = result.preview.unwrap();
    assert_eq!(preview.title, "Add squad: test-squad v1.0.0");
    assert_eq!(preview.repo, "SynkraAI/aios-squads");
    assert_eq!(preview.category, SquadCategory::Community);
    assert!(preview.body.contains("## New Squad: test-squad"));
}

#[tokio::test]
async fn test_publish_runs_pr_flow() {
    let squad = valid_squad();
    let work = TempDir::new().unwrap();
    let work_dir = work.path().join("clone");
    let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let recorded = calls.clone();
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(move |program, args, _| {
        let line = format!("{} {}", program, args.join(" "));
        recorded.lock().push(line);
        match args.first().map(String::as_str) {
            Some("auth") => Ok(CommandOutput::ok("Logged in to github.com as testuser")),
            Some("repo") => {
                let dest = std::path::Path::new(&args[3]);
                std::fs::create_dir_all(dest).unwrap();
                std::fs::write(
                    dest.join("registry.json"),
                    r#"{"version":"1.0.0","squads":{"official":[],"community":[{"name":"z-squad","version":"1.0.0"}]}}"#,
                )
                .unwrap();
                Ok(CommandOutput::ok(""))
            }
            Some("pr") => Ok(CommandOutput::ok(
                "Creating pull request\nhttps://github.com/SynkraAI/aios-squads/pull/42\n",
            )),
            _ => Ok(CommandOutput::ok("")),
        }
    });

    let options = PublisherOptions {
        work_dir: Some(work_dir.clone()),
        ..Default::default()
    };
    let result = SquadPublisher::new(options)
        .with_runner(Arc::new(runner))
        .publish(squad.path(), PublishOptions::default())
        .await
        .unwrap();

    assert_eq!(result.pr_url, "https://github.com/SynkraAI/aios-squads/pull/42");
    assert!(result.preview.is_none());
    assert!(!work_dir.exists());

    let calls = calls.lock();
    let steps: Vec<&str> = calls
        .iter()
        .map(|c| c.split(' ').take(2).collect::<Vec<_>>())
        .map(|parts| match (parts[0], parts.get(1).copied()) {
            ("gh", Some("auth")) => "auth",
            ("gh", Some("repo")) => "clone",
            ("git", Some("checkout")) => "branch",
            ("git", Some("add")) => "add",
            ("git", Some("commit")) => "commit",
            ("git", Some("push")) => "push",
            ("gh", Some("pr")) => "pr",
            _ => "other",
        })
        .collect();
    assert_eq!(steps, vec!["auth", "clone", "branch", "add", "commit", "push", "pr"]);
}

#[tokio::test]
async fn test_failed_step_is_pr_error() {
    let squad = valid_squad();
    let work = TempDir::new().unwrap();
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(|_, args, _| {
        Ok(match args.first().map(String::as_str) {
            Some("auth") => CommandOutput::ok("Logged in to github.com as testuser"),
            _ => CommandOutput::failed("fatal: repository not found"),
        })
    });

    let options = PublisherOptions {
        work_dir: Some(work.path().join("clone")),
        ..Default::default()
    };
    let err = SquadPublisher::new(options)
        .with_runner(Arc::new(runner))
        .publish(squad.path(), PublishOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), PublisherErrorCode::PrError);
    assert!(err.message.contains("clone repository"));
    assert!(err.message.contains("repository not found"));
}
