//! Community registry: listing and downloading squads, publishing new ones
//!
//! The registry is a JSON index (`registry.json`) of squads split into
//! `official` and `community` categories. [`SquadDownloader`] reads it and
//! fetches squad trees through the hosting contents API; [`SquadPublisher`]
//! submits squads as pull requests through the hosting CLI.

mod auth;
mod downloader;
mod error;
mod publisher;
mod transport;

pub use auth::{AuthStatus, CommandOutput, CommandRunner, TokioCommandRunner, check_auth};
pub use downloader::{DownloadOptions, DownloadResult, DownloaderOptions, SquadDownloader, parse_name_spec};
pub use error::{
    DownloaderError, DownloaderErrorCode, DownloaderResult, PublisherError, PublisherErrorCode,
    PublisherResult,
};
pub use publisher::{
    DRY_RUN_PR_URL, PrPreview, PublishOptions, PublishResult, PublisherOptions, SAFE_NAME_PATTERN,
    SquadPublisher, generate_pr_body, is_valid_name, sanitize_for_shell, update_registry,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub use auth::MockCommandRunner;
#[cfg(test)]
pub use transport::MockHttpTransport;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const REGISTRY_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquadCategory {
    Official,
    #[default]
    Community,
}

impl SquadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Community => "community",
        }
    }
}

impl fmt::Display for SquadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SquadCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "official" => Ok(Self::Official),
            "community" => Ok(Self::Community),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// One registry entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadMeta {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySquads {
    #[serde(default)]
    pub official: Vec<SquadMeta>,
    #[serde(default)]
    pub community: Vec<SquadMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_registry_version() -> String {
    REGISTRY_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default = "default_registry_version")]
    pub version: String,
    #[serde(default)]
    pub squads: RegistrySquads,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            version: default_registry_version(),
            squads: RegistrySquads::default(),
            extra: Map::new(),
        }
    }
}

impl Registry {
    pub fn category(&self, category: SquadCategory) -> &[SquadMeta] {
        match category {
            SquadCategory::Official => &self.squads.official,
            SquadCategory::Community => &self.squads.community,
        }
    }

    pub fn category_mut(&mut self, category: SquadCategory) -> &mut Vec<SquadMeta> {
        match category {
            SquadCategory::Official => &mut self.squads.official,
            SquadCategory::Community => &mut self.squads.community,
        }
    }

    /// Official squads first, then community, each tagged with its category.
    pub fn flatten(&self) -> Vec<AvailableSquad> {
        [SquadCategory::Official, SquadCategory::Community]
            .into_iter()
            .flat_map(|category| {
                self.category(category).iter().map(move |meta| AvailableSquad {
                    meta: meta.clone(),
                    category,
                })
            })
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<AvailableSquad> {
        self.flatten().into_iter().find(|s| s.meta.name == name)
    }
}

/// A registry entry with the category it was listed under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableSquad {
    #[serde(flatten)]
    pub meta: SquadMeta,
    #[serde(rename = "type")]
    pub category: SquadCategory,
}
