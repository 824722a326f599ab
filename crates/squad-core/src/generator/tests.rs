use super::*;
use crate::blueprint::{AgentRecommendation, TaskRecommendation};
use crate::error::UnifiedError;
use crate::manifest::read_manifest;
use tempfile::TempDir;

const VALID_BLUEPRINT: &str = r#"
squad:
  name: test-squad
  description: Test squad from blueprint
  domain: test-domain
analysis:
  entities: [Order, Customer]
  workflows: [create-order, update-order]
  integrations: [Stripe API]
  stakeholders: [Admin, User]
recommendations:
  agents:
    - id: order-manager
      role: Manages order lifecycle
      commands: [create-order, update-order]
      confidence: 0.92
      user_added: false
      user_modified: false
  tasks:
    - name: create-order
      agent: order-manager
      entrada: [customer_id, items]
      saida: [order_id, status]
      confidence: 0.88
  template: basic
  config_mode: extend
metadata:
  created_at: "2025-12-18T00:00:00.000Z"
  source_docs: [./docs/prd.md]
  user_adjustments: 0
  overall_confidence: 0.87
"#;

fn generator(root: &Path) -> SquadGenerator {
    SquadGenerator::new(GeneratorOptions {
        squads_path: root.to_path_buf(),
        ..Default::default()
    })
}

fn valid_value() -> Value {
    serde_yaml::from_str(VALID_BLUEPRINT).unwrap()
}

fn valid_blueprint() -> Blueprint {
    Blueprint::from_yaml_str(VALID_BLUEPRINT).unwrap()
}

fn remove_key(value: &mut Value, path: &[&str]) {
    let (last, parents) = path.split_last().unwrap();
    let mut current = value;
    for key in parents {
        current = current.get_mut(*key).unwrap();
    }
    current.as_mapping_mut().unwrap().remove(*last);
}

async fn write_blueprint(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("test-blueprint.yaml");
    tokio::fs::write(&path, content).await.unwrap();
    path
}

#[tokio::test]
async fn test_generate_basic_template() {
    let temp = TempDir::new().unwrap();
    let result = generator(temp.path())
        .generate(&GenerateRequest::new("my-squad").author("Jane"))
        .await
        .unwrap();

    let squad = temp.path().join("my-squad");
    assert_eq!(result.path, squad);
    for kind in ComponentKind::ALL {
        assert!(squad.join(kind.dir_name()).is_dir());
    }
    assert!(squad.join("agents/example-agent.md").exists());
    assert!(squad.join("tasks/example-agent-example-task.md").exists());
    assert!(squad.join("workflows/.gitkeep").exists());
    assert!(!squad.join("agents/.gitkeep").exists());
    assert!(squad.join("README.md").exists());
    assert!(squad.join("config/coding-standards.md").exists());
    assert!(result.files.contains(&"squad.yaml".to_string()));

    let manifest = read_manifest(&squad.join("squad.yaml")).await.unwrap();
    assert_eq!(manifest.name.as_deref(), Some("my-squad"));
    assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
    assert_eq!(manifest.author.as_deref(), Some("Jane"));
    assert_eq!(manifest.aios_type(), Some("squad"));
    assert_eq!(manifest.aios_min_version(), Some("2.1.0"));
    assert_eq!(manifest.components_of(ComponentKind::Agents), ["example-agent.md"]);
    assert_eq!(
        manifest.components_of(ComponentKind::Tasks),
        ["example-agent-example-task.md"]
    );
    assert_eq!(
        manifest.config.as_ref().and_then(|c| c.extends),
        Some(ConfigMode::Extend)
    );
}

#[tokio::test]
async fn test_generate_etl_and_agent_only() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());

    generator
        .generate(&GenerateRequest::new("etl-squad").template(SquadTemplate::Etl))
        .await
        .unwrap();
    let etl = temp.path().join("etl-squad");
    assert!(etl.join("agents/data-extractor.md").exists());
    assert!(etl.join("agents/data-transformer.md").exists());
    assert!(etl.join("tasks/data-extractor-extract-data.md").exists());

    generator
        .generate(&GenerateRequest::new("solo-squad").template(SquadTemplate::AgentOnly))
        .await
        .unwrap();
    let solo = temp.path().join("solo-squad");
    assert!(solo.join("agents/primary-agent.md").exists());
    assert!(solo.join("agents/helper-agent.md").exists());
    assert!(solo.join("tasks/.gitkeep").exists());
    let manifest = read_manifest(&solo.join("squad.yaml")).await.unwrap();
    assert!(manifest.components_of(ComponentKind::Tasks).is_empty());
}

#[tokio::test]
async fn test_generate_config_modes() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());

    generator
        .generate(&GenerateRequest::new("own-config").config_mode(ConfigMode::Override))
        .await
        .unwrap();
    let content = tokio::fs::read_to_string(temp.path().join("own-config/config/tech-stack.md"))
        .await
        .unwrap();
    assert!(content.contains("Overrides project-level"));

    generator
        .generate(&GenerateRequest::new("no-config").config_mode(ConfigMode::None))
        .await
        .unwrap();
    let squad = temp.path().join("no-config");
    assert!(!squad.join("config").exists());
    let manifest = read_manifest(&squad.join("squad.yaml")).await.unwrap();
    assert!(manifest.config.is_none());
}

#[tokio::test]
async fn test_generate_rejects_existing_and_invalid_names() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());

    let err = generator
        .generate(&GenerateRequest::new("My_Squad"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_NAME");

    generator.generate(&GenerateRequest::new("dup")).await.unwrap();
    let err = generator.generate(&GenerateRequest::new("dup")).await.unwrap_err();
    assert_eq!(err.error_code(), "SQUAD_EXISTS");

    assert!(
        generator
            .generate(&GenerateRequest::new("dup").force(true))
            .await
            .is_ok()
    );
}

#[test]
fn test_parse_template() {
    assert_eq!(parse_template("agent-only").unwrap(), SquadTemplate::AgentOnly);
    assert_eq!(parse_template("nope").unwrap_err().error_code(), "TEMPLATE_NOT_FOUND");
}

#[tokio::test]
async fn test_load_blueprint() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());
    let path = write_blueprint(temp.path(), VALID_BLUEPRINT).await;

    let loaded = generator.load_blueprint(&path).await.unwrap();
    assert_eq!(loaded["squad"]["name"].as_str(), Some("test-squad"));

    let missing = generator
        .load_blueprint(Path::new("/nonexistent/blueprint.yaml"))
        .await
        .unwrap_err();
    assert_eq!(missing.error_code(), "BLUEPRINT_NOT_FOUND");

    let invalid = temp.path().join("invalid.yaml");
    tokio::fs::write(&invalid, "invalid: yaml: content: :::").await.unwrap();
    let err = generator.load_blueprint(&invalid).await.unwrap_err();
    assert_eq!(err.error_code(), "BLUEPRINT_PARSE_ERROR");
}

#[test]
fn test_validate_blueprint() {
    assert_eq!(
        validate_blueprint(&valid_value()),
        BlueprintValidation {
            is_valid: true,
            errors: vec![]
        }
    );

    let mut no_squad = valid_value();
    remove_key(&mut no_squad, &["squad"]);
    let result = validate_blueprint(&no_squad);
    assert!(!result.is_valid);
    assert!(result.errors.contains(&"Missing required field: squad".to_string()));

    let mut no_name = valid_value();
    remove_key(&mut no_name, &["squad", "name"]);
    assert!(
        validate_blueprint(&no_name)
            .errors
            .contains(&"Missing required field: squad.name".to_string())
    );

    let mut bad_name = valid_value();
    bad_name["squad"]["name"] = Value::from("Invalid Name");
    assert!(validate_blueprint(&bad_name).errors.iter().any(|e| e.contains("kebab-case")));

    let mut no_recs = valid_value();
    remove_key(&mut no_recs, &["recommendations"]);
    assert!(
        validate_blueprint(&no_recs)
            .errors
            .contains(&"Missing required field: recommendations".to_string())
    );

    let mut no_created = valid_value();
    remove_key(&mut no_created, &["metadata", "created_at"]);
    assert!(
        validate_blueprint(&no_created)
            .errors
            .contains(&"Missing required field: metadata.created_at".to_string())
    );
}

#[test]
fn test_validate_blueprint_components() {
    let mut value = valid_value();
    value["recommendations"]["agents"][0]["confidence"] = Value::from(1.5);
    value["recommendations"]["tasks"][0]["name"] = Value::from("Create_Order");
    value["recommendations"]["tasks"][0]["agent"] = Value::from("ghost-agent");

    let result = validate_blueprint(&value);
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 3);
    assert!(result.errors[0].contains("confidence"));
    assert!(result.errors[1].contains("kebab-case"));
    assert!(result.errors[2].contains("ghost-agent"));
}

#[test]
fn test_blueprint_to_config() {
    let config = blueprint_to_config(&valid_blueprint());
    assert_eq!(config.name, "test-squad");
    assert_eq!(config.description.as_deref(), Some("Test squad from blueprint"));
    assert_eq!(config.template, SquadTemplate::Basic);
    assert_eq!(config.config_mode, ConfigMode::Extend);
    assert!(!config.include_agent);
    assert!(!config.include_task);
    assert_eq!(config.source_blueprint().unwrap().squad.name, "test-squad");

    let mut bp = valid_blueprint();
    bp.squad.description = None;
    bp.squad.domain = Some("my-domain".to_string());
    assert!(blueprint_to_config(&bp).description.unwrap().contains("my-domain"));
}

#[test]
fn test_generate_agent_from_blueprint() {
    let bp = valid_blueprint();
    let agent = &bp.recommendations.agents[0];
    let md = generate_agent_from_blueprint(agent, "test-squad");
    assert!(md.contains("# order-manager"));
    assert!(md.contains("id: order-manager"));
    assert!(md.contains("Manages order lifecycle"));
    assert!(md.contains("create-order"));
    assert!(md.contains("update-order"));
    assert!(md.contains("92%"));

    let added = AgentRecommendation {
        user_added: true,
        ..agent.clone()
    };
    assert!(generate_agent_from_blueprint(&added, "test-squad").contains("Added by user"));
    let modified = AgentRecommendation {
        user_modified: true,
        ..agent.clone()
    };
    assert!(generate_agent_from_blueprint(&modified, "test-squad").contains("Modified by user"));
}

#[test]
fn test_generate_task_from_blueprint() {
    let task = TaskRecommendation {
        checklist: vec!["Validate customer".to_string(), "Check inventory".to_string()],
        entrada: vec!["customer_id".to_string(), "items".to_string(), "payment_method".to_string()],
        ..valid_blueprint().recommendations.tasks[0].clone()
    };
    let md = generate_task_from_blueprint(&task, "test-squad");
    assert!(md.contains("# *create-order"));
    assert!(md.contains("responsavel: \"@order-manager\""));
    assert!(md.contains("payment_method"));
    assert!(md.contains("order_id"));
    assert!(md.contains("Check inventory"));
    assert!(md.contains("88%"));

    let bare = &valid_blueprint().recommendations.tasks[0];
    assert!(generate_task_from_blueprint(bare, "test-squad").contains("Validate input parameters"));
}

#[tokio::test]
async fn test_generate_from_blueprint() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());
    let path = write_blueprint(temp.path(), VALID_BLUEPRINT).await;

    let result = generator.generate_from_blueprint(&path, false).await.unwrap();
    assert!(result.path.ends_with("test-squad"));
    assert!(result.files.contains(&"agents/order-manager.md".to_string()));
    assert!(result.files.contains(&"tasks/create-order.md".to_string()));
    assert_eq!(result.blueprint.agents, 1);
    assert_eq!(result.blueprint.tasks, 1);
    assert_eq!(result.blueprint.path, path);
    assert_eq!(result.blueprint.confidence, 0.87);
    assert_eq!(result.blueprint.source_docs, vec!["./docs/prd.md"]);

    let agent = tokio::fs::read_to_string(result.path.join("agents/order-manager.md"))
        .await
        .unwrap();
    assert!(agent.contains("Manages order lifecycle"));
    let task = tokio::fs::read_to_string(result.path.join("tasks/create-order.md"))
        .await
        .unwrap();
    assert!(task.contains("@order-manager"));
    assert!(!result.path.join("agents/example-agent.md").exists());

    let squad_yaml = tokio::fs::read_to_string(result.path.join("squad.yaml")).await.unwrap();
    assert!(squad_yaml.contains("order-manager.md"));
    assert!(squad_yaml.contains("create-order.md"));
    assert!(squad_yaml.contains("blueprint:"));
    assert!(squad_yaml.contains("confidence:"));
    let raw: serde_yaml::Value = serde_yaml::from_str(&squad_yaml).unwrap();
    assert_eq!(
        raw["blueprint"]["path"].as_str(),
        Some(path.display().to_string().as_str())
    );
    assert!(raw["blueprint"].get("source").is_none());
}

#[tokio::test]
async fn test_generate_from_blueprint_drops_placeholders() {
    let temp = TempDir::new().unwrap();
    let path = write_blueprint(temp.path(), VALID_BLUEPRINT).await;

    let result = generator(temp.path())
        .generate_from_blueprint(&path, false)
        .await
        .unwrap();
    assert!(!result.path.join("agents/.gitkeep").exists());
    assert!(!result.path.join("tasks/.gitkeep").exists());
    assert!(!result.files.iter().any(|f| f == "agents/.gitkeep" || f == "tasks/.gitkeep"));
    assert!(result.path.join("workflows/.gitkeep").exists());
}

#[tokio::test]
async fn test_generate_from_blueprint_existing_squad() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());
    let path = write_blueprint(temp.path(), VALID_BLUEPRINT).await;
    generator.generate_from_blueprint(&path, false).await.unwrap();

    let err = generator.generate_from_blueprint(&path, false).await.unwrap_err();
    assert_eq!(err.error_code(), "SQUAD_EXISTS");

    let squad = temp.path().join("test-squad");
    tokio::fs::write(squad.join("agents/order-manager.md"), "stale").await.unwrap();
    tokio::fs::write(squad.join("notes.md"), "keep me").await.unwrap();

    generator.generate_from_blueprint(&path, true).await.unwrap();
    let agent = tokio::fs::read_to_string(squad.join("agents/order-manager.md")).await.unwrap();
    assert!(agent.contains("Manages order lifecycle"));
    assert!(squad.join("notes.md").exists());
    let manifest = read_manifest(&squad.join("squad.yaml")).await.unwrap();
    assert_eq!(manifest.components_of(ComponentKind::Agents), ["order-manager.md"]);
}

#[tokio::test]
async fn test_generate_from_invalid_blueprint() {
    let temp = TempDir::new().unwrap();
    let path = write_blueprint(temp.path(), "squad:\n  name: Bad Name\n").await;

    let err = generator(temp.path())
        .generate_from_blueprint(&path, false)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "BLUEPRINT_INVALID");
    assert_eq!(err.details.len(), 3);
    assert!(!temp.path().join("Bad Name").exists());
}

#[tokio::test]
async fn test_update_squad_yaml_components() {
    let temp = TempDir::new().unwrap();
    let generator = generator(temp.path());
    let created = generator
        .generate(&GenerateRequest::new("test-squad"))
        .await
        .unwrap();
    let manifest_path = created.path.join("squad.yaml");

    let manifest = generator
        .update_squad_yaml_components(&manifest_path, &valid_blueprint(), None)
        .await
        .unwrap();
    assert_eq!(
        manifest.components_of(ComponentKind::Agents),
        ["example-agent.md", "order-manager.md"]
    );
    assert!(manifest.components_of(ComponentKind::Tasks).contains(&"create-order.md".to_string()));
    let provenance = manifest.blueprint.unwrap();
    assert_eq!(provenance.confidence, 0.87);
    assert_eq!(provenance.path, None);
}
