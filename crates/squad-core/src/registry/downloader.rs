//! Registry listing and squad download

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{DownloaderError, DownloaderResult};
use super::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use super::{AvailableSquad, Registry};
use crate::config::{DEFAULT_SQUADS_PATH, GITHUB_API_BASE, REGISTRY_URL, SquadSettings};
use crate::fsutil;
use crate::validator::{ManifestValidator, SquadValidator, ValidationIssue, ValidationReport};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DownloaderOptions {
    pub squads_path: PathBuf,
    pub registry_url: String,
    /// Contents API root; squads live at `<base>/<name>`
    pub github_api_base: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
    /// Replace an existing local copy
    pub overwrite: bool,
    pub verbose: bool,
}

impl Default for DownloaderOptions {
    fn default() -> Self {
        Self {
            squads_path: PathBuf::from(DEFAULT_SQUADS_PATH),
            registry_url: REGISTRY_URL.to_string(),
            github_api_base: GITHUB_API_BASE.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_TIMEOUT,
            overwrite: false,
            verbose: false,
        }
    }
}

impl DownloaderOptions {
    pub fn from_settings(settings: &SquadSettings) -> Self {
        Self {
            squads_path: settings.squads_path.clone(),
            registry_url: settings.registry.registry_url.clone(),
            github_api_base: settings.registry.github_api_base.clone(),
            cache_ttl: Duration::from_secs(settings.registry.cache_ttl_secs),
            timeout: Duration::from_secs(settings.registry.timeout_secs),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    /// Run the validator over the downloaded squad
    pub validate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    /// Downloaded files relative to the squad root, in download order
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

/// One entry of a contents API directory listing
#[derive(Debug, Clone, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Split `name@version` into its parts. An empty version counts as none.
pub fn parse_name_spec(spec: &str) -> (String, Option<String>) {
    match spec.split_once('@') {
        Some((name, version)) if !version.is_empty() => {
            (name.to_string(), Some(version.to_string()))
        }
        Some((name, _)) => (name.to_string(), None),
        None => (spec.to_string(), None),
    }
}

/// Replace `target` with the fully downloaded `staging` tree. The previous
/// copy is parked beside it until the rename succeeds.
async fn swap_into_place(
    name: &str,
    staging: &Path,
    target: &Path,
    existed: bool,
) -> DownloaderResult<()> {
    let parked = staging.with_file_name(format!(".{}.previous", name));
    if existed {
        if fsutil::path_exists(&parked).await {
            tokio::fs::remove_dir_all(&parked)
                .await
                .map_err(|e| DownloaderError::download_error(name, e))?;
        }
        tokio::fs::rename(target, &parked)
            .await
            .map_err(|e| DownloaderError::download_error(name, e))?;
    }

    if let Err(e) = tokio::fs::rename(staging, target).await {
        if existed {
            if let Err(restore) = tokio::fs::rename(&parked, target).await {
                warn!("Failed to restore {}: {}", target.display(), restore);
            }
        }
        return Err(DownloaderError::download_error(name, e));
    }

    if existed {
        if let Err(e) = tokio::fs::remove_dir_all(&parked).await {
            warn!("Failed to remove previous copy {}: {}", parked.display(), e);
        }
    }
    Ok(())
}

fn is_safe_entry_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub struct SquadDownloader {
    options: DownloaderOptions,
    transport: Arc<dyn HttpTransport>,
    validator: Option<Arc<dyn SquadValidator>>,
    cache: Mutex<Option<(Registry, Instant)>>,
}

impl SquadDownloader {
    pub fn new(options: DownloaderOptions) -> Self {
        let transport = Arc::new(ReqwestTransport::new(options.timeout));
        Self::with_transport(options, transport)
    }

    pub fn with_transport(options: DownloaderOptions, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            options,
            transport,
            validator: None,
            cache: Mutex::new(None),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn SquadValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn squads_path(&self) -> &Path {
        &self.options.squads_path
    }

    fn log(&self, message: &str) {
        if self.options.verbose {
            info!("[SquadDownloader] {}", message);
        } else {
            debug!("[SquadDownloader] {}", message);
        }
    }

    /// Drop the cached registry so the next call refetches it.
    pub fn clear_cache(&self) {
        *self.cache.lock() = None;
    }

    fn cached_registry(&self) -> Option<Registry> {
        let cache = self.cache.lock();
        cache
            .as_ref()
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.options.cache_ttl)
            .map(|(registry, _)| registry.clone())
    }

    async fn get(&self, url: &str) -> DownloaderResult<HttpResponse> {
        let response = self
            .transport
            .get(url)
            .await
            .map_err(|e| DownloaderError::registry_fetch_error(url, e))?;
        if response.is_success() {
            return Ok(response);
        }
        if response.header("x-ratelimit-remaining") == Some("0") {
            let reset = response
                .header("x-ratelimit-reset")
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .map(|at| at.to_rfc3339());
            return Err(DownloaderError::rate_limit(reset.as_deref()));
        }
        Err(DownloaderError::registry_fetch_error(
            url,
            format!("HTTP {}", response.status),
        ))
    }

    /// Fetch `registry.json`, served from cache while it is fresh.
    pub async fn fetch_registry(&self) -> DownloaderResult<Registry> {
        if let Some(registry) = self.cached_registry() {
            debug!("[SquadDownloader] Registry served from cache");
            return Ok(registry);
        }

        let url = self.options.registry_url.as_str();
        self.log(&format!("Fetching registry from {}", url));
        let response = self.get(url).await?;
        let registry: Registry = serde_json::from_slice(&response.body)
            .map_err(|e| DownloaderError::registry_fetch_error(url, e))?;

        *self.cache.lock() = Some((registry.clone(), Instant::now()));
        Ok(registry)
    }

    /// Every registry squad, official first, tagged with its category.
    pub async fn list_available(&self) -> DownloaderResult<Vec<AvailableSquad>> {
        Ok(self.fetch_registry().await?.flatten())
    }

    /// Look a squad up by name. `None` for unknown names or a missing registry.
    pub fn find_squad(&self, registry: Option<&Registry>, name: &str) -> Option<AvailableSquad> {
        if name.is_empty() {
            return None;
        }
        registry?.find(name)
    }

    /// Download a squad into `<squads_path>/<name>`.
    pub async fn download(
        &self,
        name_spec: &str,
        options: DownloadOptions,
    ) -> DownloaderResult<DownloadResult> {
        let (name, requested_version) = parse_name_spec(name_spec);
        let registry = self.fetch_registry().await?;
        let squad = self
            .find_squad(Some(&registry), &name)
            .ok_or_else(|| DownloaderError::squad_not_found(&name))?;

        if let Some(requested) = requested_version.as_deref() {
            if requested != squad.meta.version {
                warn!(
                    "Requested {}@{} but the registry lists {}; downloading the registry version",
                    name, requested, squad.meta.version
                );
            }
        }

        let target = self.options.squads_path.join(&name);
        let existed = fsutil::path_exists(&target).await;
        if existed && !self.options.overwrite {
            return Err(DownloaderError::squad_exists(&name, &target));
        }

        let staging = self.options.squads_path.join(format!(".{}.download", name));
        if fsutil::path_exists(&staging).await {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| DownloaderError::download_error(&name, e))?;
        }
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| DownloaderError::download_error(&name, e))?;

        self.log(&format!("Downloading {} ({}) to {}", name, squad.category, target.display()));
        let fetched = match self.download_tree(&name, &staging).await {
            Ok(files) => swap_into_place(&name, &staging, &target, existed)
                .await
                .map(|()| files),
            Err(e) => Err(e),
        };
        let files = match fetched {
            Ok(files) => files,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to clean up {}: {}", staging.display(), cleanup);
                    }
                }
                return Err(e);
            }
        };

        let validation = if options.validate {
            let report = match &self.validator {
                Some(validator) => validator.validate(&target).await,
                None => ManifestValidator.validate(&target).await,
            };
            match report {
                Ok(report) => {
                    if !report.valid {
                        warn!("Downloaded squad {} failed validation", name);
                    }
                    Some(report)
                }
                Err(e) => {
                    warn!("Validator crashed on {}: {}", name, e);
                    Some(ValidationReport::from_issues(
                        vec![ValidationIssue::new(format!(
                            "Validator error: {}",
                            e
                        ))],
                        Vec::new(),
                    ))
                }
            }
        } else {
            None
        };

        self.log(&format!("Downloaded {} files for {}", files.len(), name));
        Ok(DownloadResult {
            name,
            version: squad.meta.version,
            path: target,
            files,
            validation,
        })
    }

    async fn download_tree(&self, name: &str, target: &Path) -> DownloaderResult<Vec<String>> {
        let root_url = format!("{}/{}", self.options.github_api_base.trim_end_matches('/'), name);
        let mut pending = vec![(root_url, String::new())];
        let mut files = Vec::new();

        while let Some((url, prefix)) = pending.pop() {
            let listing = self.get(&url).await?;
            let entries: Vec<ContentEntry> = serde_json::from_slice(&listing.body)
                .map_err(|e| DownloaderError::download_error(name, e))?;

            for entry in entries {
                if !is_safe_entry_name(&entry.name) {
                    return Err(DownloaderError::download_error(
                        name,
                        format!("unsafe path in listing: '{}'", entry.name),
                    ));
                }
                let relative = if prefix.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", prefix, entry.name)
                };

                match entry.kind.as_str() {
                    "dir" => {
                        let dir_url = entry
                            .url
                            .clone()
                            .unwrap_or_else(|| format!("{}/{}", url.trim_end_matches('/'), entry.name));
                        tokio::fs::create_dir_all(target.join(&relative))
                            .await
                            .map_err(|e| DownloaderError::download_error(name, e))?;
                        pending.push((dir_url, relative));
                    }
                    "file" => {
                        let Some(download_url) = entry.download_url.as_deref() else {
                            warn!("No download URL for {}, skipping", relative);
                            continue;
                        };
                        let response = self.get(download_url).await?;
                        tokio::fs::write(target.join(&relative), &response.body)
                            .await
                            .map_err(|e| DownloaderError::download_error(name, e))?;
                        debug!("[SquadDownloader] Wrote {}", relative);
                        files.push(relative);
                    }
                    other => debug!("[SquadDownloader] Skipping {} entry {}", other, relative),
                }
            }
        }
        Ok(files)
    }
}
