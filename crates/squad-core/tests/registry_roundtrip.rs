//! Downloader against an in-memory hosting API, and local registry upkeep

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use squad_core::error::UnifiedError;
use squad_core::manifest::Manifest;
use squad_core::registry::{
    DownloadOptions, DownloaderOptions, HttpResponse, HttpTransport, SquadCategory,
    SquadDownloader, update_registry,
};
use tempfile::TempDir;

/// Serves canned responses by URL and counts requests.
#[derive(Default)]
struct FakeHost {
    routes: HashMap<String, HttpResponse>,
    hits: Mutex<Vec<String>>,
}

impl FakeHost {
    fn route(mut self, url: &str, response: HttpResponse) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    fn file(self, url: &str, content: &str) -> Self {
        self.route(
            url,
            HttpResponse {
                status: 200,
                body: content.as_bytes().to_vec(),
                ..Default::default()
            },
        )
    }

    fn hits(&self, url: &str) -> usize {
        self.hits.lock().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl HttpTransport for FakeHost {
    async fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
        self.hits.lock().push(url.to_string());
        Ok(self
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| HttpResponse::json(404, &json!({"message": "Not Found"}))))
    }
}

const REGISTRY: &str = "https://host.test/registry.json";
const API: &str = "https://api.host.test/packages";

fn host() -> FakeHost {
    FakeHost::default()
        .route(
            REGISTRY,
            HttpResponse::json(
                200,
                &json!({
                    "version": "1.0.0",
                    "squads": {
                        "official": [],
                        "community": [{"name": "report-squad", "version": "0.2.0", "author": "ops"}]
                    }
                }),
            ),
        )
        .route(
            "https://api.host.test/packages/report-squad",
            HttpResponse::json(
                200,
                &json!([
                    {"name": "squad.yaml", "type": "file", "download_url": "https://raw.host.test/report-squad/squad.yaml"},
                    {"name": "agents", "type": "dir", "url": "https://api.host.test/packages/report-squad/agents"},
                    {"name": "tasks", "type": "dir", "url": "https://api.host.test/packages/report-squad/tasks"}
                ]),
            ),
        )
        .route(
            "https://api.host.test/packages/report-squad/agents",
            HttpResponse::json(
                200,
                &json!([{"name": "reporter.md", "type": "file", "download_url": "https://raw.host.test/report-squad/agents/reporter.md"}]),
            ),
        )
        .route(
            "https://api.host.test/packages/report-squad/tasks",
            HttpResponse::json(
                200,
                &json!([{"name": "reporter-daily.md", "type": "file", "download_url": "https://raw.host.test/report-squad/tasks/reporter-daily.md"}]),
            ),
        )
        .file(
            "https://raw.host.test/report-squad/squad.yaml",
            "name: report-squad\nversion: 0.2.0\ndescription: Reports\nauthor: ops\naios:\n  type: squad\n  minVersion: 2.1.0\ncomponents:\n  agents:\n    - reporter.md\n  tasks:\n    - reporter-daily.md\n",
        )
        .file("https://raw.host.test/report-squad/agents/reporter.md", "# reporter\n")
        .file("https://raw.host.test/report-squad/tasks/reporter-daily.md", "# daily\n")
}

#[tokio::test]
async fn test_download_and_validate() {
    let root = TempDir::new().unwrap();
    let host = Arc::new(host());
    let downloader = SquadDownloader::with_transport(
        DownloaderOptions {
            squads_path: root.path().to_path_buf(),
            registry_url: REGISTRY.to_string(),
            github_api_base: API.to_string(),
            ..Default::default()
        },
        host.clone(),
    );

    let listed = downloader.list_available().await.unwrap();
    assert_eq!(listed.len(), 1);

    let result = downloader
        .download("report-squad", DownloadOptions { validate: true })
        .await
        .unwrap();
    assert_eq!(result.files.len(), 3);
    assert!(result.validation.unwrap().valid);
    assert!(root.path().join("report-squad/tasks/reporter-daily.md").exists());
    // listing and download share one registry fetch
    assert_eq!(host.hits(REGISTRY), 1);

    let err = downloader
        .download("report-squad", DownloadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "SQUAD_EXISTS");
}

#[tokio::test]
async fn test_registry_update_keeps_categories_sorted() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("registry.json");
    tokio::fs::write(
        &path,
        r#"{"version":"1.0.0","squads":{"official":[{"name":"core-squad","version":"1.0.0"}],"community":[{"name":"z-squad","version":"1.0.0"}]},"updated":"2024-01-01"}"#,
    )
    .await
    .unwrap();

    let manifest = Manifest {
        name: Some("a-squad".to_string()),
        version: Some("1.0.0".to_string()),
        ..Default::default()
    };
    update_registry(&path, &manifest, SquadCategory::Community)
        .await
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(written["squads"]["community"][0]["name"], "a-squad");
    assert_eq!(written["squads"]["community"][1]["name"], "z-squad");
    assert_eq!(written["squads"]["official"][0]["name"], "core-squad");
    assert_eq!(written["updated"], "2024-01-01");
}
