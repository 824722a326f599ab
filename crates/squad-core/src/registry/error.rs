use std::fmt::Display;
use std::path::Path;

use crate::error::{ComponentError, error_codes};

error_codes!(DownloaderErrorCode {
    RegistryFetchError => "REGISTRY_FETCH_ERROR",
    SquadNotFound => "SQUAD_NOT_FOUND",
    DownloadError => "DOWNLOAD_ERROR",
    SquadExists => "SQUAD_EXISTS",
    RateLimit => "RATE_LIMIT",
} retryable [RegistryFetchError, RateLimit]);

pub type DownloaderError = ComponentError<DownloaderErrorCode>;

pub type DownloaderResult<T> = Result<T, DownloaderError>;

impl DownloaderError {
    pub fn registry_fetch_error(url: &str, reason: impl Display) -> Self {
        Self::new(
            DownloaderErrorCode::RegistryFetchError,
            format!("Failed to fetch registry from {}: {}", url, reason),
        )
        .with_suggestion("Check your network connection and try again")
        .with_context(url)
    }

    pub fn squad_not_found(name: &str) -> Self {
        Self::new(
            DownloaderErrorCode::SquadNotFound,
            format!("Squad \"{}\" not found in registry", name),
        )
        .with_suggestion("Use --list to see available squads")
    }

    pub fn download_error(name: &str, reason: impl Display) -> Self {
        Self::new(
            DownloaderErrorCode::DownloadError,
            format!("Failed to download squad \"{}\": {}", name, reason),
        )
    }

    pub fn squad_exists(name: &str, path: &Path) -> Self {
        Self::new(
            DownloaderErrorCode::SquadExists,
            format!("Squad \"{}\" already exists at {}", name, path.display()),
        )
        .with_suggestion("Use --overwrite to replace the local copy")
        .with_context(path.display().to_string())
    }

    pub fn rate_limit(reset: Option<&str>) -> Self {
        let message = match reset {
            Some(at) => format!("GitHub API rate limit exceeded; resets at {}", at),
            None => "GitHub API rate limit exceeded".to_string(),
        };
        Self::new(DownloaderErrorCode::RateLimit, message)
            .with_suggestion("Wait for the reset or authenticate with gh auth login for a higher limit")
    }
}

error_codes!(PublisherErrorCode {
    AuthRequired => "AUTH_REQUIRED",
    ValidationFailed => "VALIDATION_FAILED",
    SquadNotFound => "SQUAD_NOT_FOUND",
    ManifestError => "MANIFEST_ERROR",
    PrError => "PR_ERROR",
    InvalidSquadName => "INVALID_SQUAD_NAME",
});

pub type PublisherError = ComponentError<PublisherErrorCode>;

pub type PublisherResult<T> = Result<T, PublisherError>;

impl PublisherError {
    pub fn auth_required(cli: &str) -> Self {
        Self::new(PublisherErrorCode::AuthRequired, "Not authenticated")
            .with_suggestion(format!("Run: {} auth login", cli))
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::new(
            PublisherErrorCode::ValidationFailed,
            format!("Squad validation failed: {}", errors.join("; ")),
        )
        .with_suggestion("Run *validate-squad and fix the reported errors")
        .with_details(errors)
    }

    pub fn squad_not_found(path: &Path) -> Self {
        Self::new(
            PublisherErrorCode::SquadNotFound,
            format!("Squad not found: {}", path.display()),
        )
        .with_suggestion("Check the path or use *list-squads")
        .with_context(path.display().to_string())
    }

    pub fn manifest_error(path: &Path, reason: impl Display) -> Self {
        Self::new(
            PublisherErrorCode::ManifestError,
            format!("Cannot read manifest in {}: {}", path.display(), reason),
        )
        .with_context(path.display().to_string())
    }

    pub fn pr_error(step: &str, reason: impl Display) -> Self {
        Self::new(
            PublisherErrorCode::PrError,
            format!("Failed to {}: {}", step, reason),
        )
    }

    pub fn invalid_squad_name(name: &str) -> Self {
        Self::new(
            PublisherErrorCode::InvalidSquadName,
            format!("Invalid squad name for publishing: '{}'", name),
        )
        .with_suggestion("Use letters, numbers, dots, underscores and hyphens only")
    }
}
