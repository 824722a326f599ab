use super::*;
use crate::error::UnifiedError;
use tempfile::TempDir;

async fn write_squad(root: &Path, name: &str, file: &str, content: &str) -> PathBuf {
    let dir = root.join(name);
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join(file), content).await.unwrap();
    dir
}

fn loader_for(root: &Path) -> SquadLoader {
    SquadLoader::new(LoaderOptions {
        squads_path: root.to_path_buf(),
        verbose: true,
    })
}

#[tokio::test]
async fn test_resolve_existing_squad() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(temp.path(), "my-squad", "squad.yaml", "name: my-squad\n").await;

    let location = loader_for(temp.path()).resolve("my-squad").await.unwrap();
    assert_eq!(location.path, dir);
    assert_eq!(location.manifest_path, dir.join("squad.yaml"));
}

#[tokio::test]
async fn test_resolve_missing_squad() {
    let temp = TempDir::new().unwrap();
    let err = loader_for(temp.path()).resolve("ghost").await.unwrap_err();

    assert_eq!(err.code, LoaderErrorCode::SquadNotFound);
    assert!(err.message.contains("ghost"));
    assert!(err.suggestion().unwrap().contains("@squad-creator *create-squad ghost"));
    assert!(err.to_string().starts_with("[SQUAD_NOT_FOUND]"));
    assert!(err.to_string().contains("\nSuggestion: "));
}

#[tokio::test]
async fn test_resolve_without_manifest_fails() {
    let temp = TempDir::new().unwrap();
    tokio::fs::create_dir_all(temp.path().join("empty-squad")).await.unwrap();

    let err = loader_for(temp.path()).resolve("empty-squad").await.unwrap_err();
    assert_eq!(err.code, LoaderErrorCode::ManifestNotFound);
    assert!(err.message.contains("empty-squad"));
}

#[tokio::test]
async fn test_resolve_legacy_manifest_path() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(temp.path(), "old", "config.yaml", "name: old\n").await;

    let location = loader_for(temp.path()).resolve("old").await.unwrap();
    assert_eq!(location.manifest_path, dir.join("config.yaml"));
}

#[tokio::test]
async fn test_load_primary_manifest() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(
        temp.path(),
        "s",
        "squad.yaml",
        "name: s\nversion: 1.0.0\nagents:\n  - test-agent\n",
    )
    .await;

    let loaded = loader_for(temp.path()).load_manifest(&dir).await.unwrap();
    assert!(!loaded.legacy);
    assert!(loaded.warnings.is_empty());
    assert_eq!(loaded.manifest.name.as_deref(), Some("s"));
    let agents = loaded.manifest.extra.get("agents").unwrap();
    assert_eq!(agents.as_sequence().unwrap()[0].as_str(), Some("test-agent"));
}

#[tokio::test]
async fn test_legacy_manifest_warns_once() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(temp.path(), "old", "config.yaml", "name: old\n").await;

    let loaded = loader_for(temp.path()).load_manifest(&dir).await.unwrap();
    assert!(loaded.legacy);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].contains("DEPRECATED"));
    assert!(loaded.warnings[0].contains("config.yaml"));
}

#[tokio::test]
async fn test_squad_yaml_wins_over_config_yaml() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(temp.path(), "both", "config.yaml", "name: legacy\n").await;
    tokio::fs::write(dir.join("squad.yaml"), "name: current\n").await.unwrap();

    let loaded = loader_for(temp.path()).load_manifest(&dir).await.unwrap();
    assert_eq!(loaded.manifest.name.as_deref(), Some("current"));
    assert!(loaded.warnings.is_empty());
}

#[tokio::test]
async fn test_missing_manifest() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("empty");
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let err = loader_for(temp.path()).load_manifest(&dir).await.unwrap_err();
    assert_eq!(err.code, LoaderErrorCode::ManifestNotFound);
    assert!(err.message.starts_with("No manifest found in"));
    assert!(err.suggestion().unwrap().contains("squad.yaml"));
}

#[tokio::test]
async fn test_malformed_yaml() {
    let temp = TempDir::new().unwrap();
    let dir = write_squad(temp.path(), "bad", "squad.yaml", "name: bad\nversion: [1.0.0\n").await;

    let err = loader_for(temp.path()).load_manifest(&dir).await.unwrap_err();
    assert_eq!(err.code, LoaderErrorCode::YamlParseError);
    assert!(err.suggestion().unwrap().contains("YAML linter"));
}

#[tokio::test]
async fn test_list_local() {
    let temp = TempDir::new().unwrap();
    write_squad(temp.path(), "zeta", "squad.yaml", "name: zeta\n").await;
    write_squad(temp.path(), "alpha", "config.yaml", "name: alpha\n").await;
    tokio::fs::create_dir_all(temp.path().join("no-manifest")).await.unwrap();
    tokio::fs::create_dir_all(temp.path().join(".designs")).await.unwrap();

    let squads = loader_for(temp.path()).list_local().await.unwrap();
    let names: Vec<_> = squads.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[tokio::test]
async fn test_list_local_skips_unparseable_manifest() {
    let temp = TempDir::new().unwrap();
    write_squad(temp.path(), "good", "squad.yaml", "name: good\n").await;
    write_squad(temp.path(), "broken", "squad.yaml", "name: broken\nversion: [1\n").await;

    let loader = loader_for(temp.path());
    let squads = loader.list_local().await.unwrap();
    let names: Vec<_> = squads.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["good"]);

    let err = loader.load_manifest(&temp.path().join("broken")).await.unwrap_err();
    assert_eq!(err.code, LoaderErrorCode::YamlParseError);
}

#[tokio::test]
async fn test_list_local_missing_root() {
    let temp = TempDir::new().unwrap();
    let loader = loader_for(&temp.path().join("nowhere"));
    assert!(loader.list_local().await.unwrap().is_empty());
}

#[test]
fn test_permission_denied_factory() {
    let err = LoaderError::permission_denied(Path::new("/x/squad.yaml"));
    assert!(err.message.starts_with("Permission denied"));
    assert!(err.suggestion().unwrap().contains("chmod 644"));
}
