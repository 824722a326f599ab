//! Error handling for squad components
//!
//! Each component owns a closed code enum and reports failures as
//! [`ComponentError`] values. [`SquadError`] wraps all of them for callers
//! that chain several components with `?`.

mod types;

pub use types::{ComponentError, ErrorCode, UnifiedError};
pub(crate) use types::error_codes;

use thiserror::Error;

use crate::analyzer::AnalyzerError;
use crate::designer::DesignerError;
use crate::extender::ExtenderError;
use crate::generator::GeneratorError;
use crate::loader::LoaderError;
use crate::migrator::MigratorError;
use crate::registry::{DownloaderError, PublisherError};

/// Result type alias for operations spanning several components
pub type SquadResult<T> = Result<T, SquadError>;

/// Any error raised by a squad component
#[derive(Debug, Error)]
pub enum SquadError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error(transparent)]
    Extender(#[from] ExtenderError),

    #[error(transparent)]
    Migrator(#[from] MigratorError),

    #[error(transparent)]
    Designer(#[from] DesignerError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Downloader(#[from] DownloaderError),

    #[error(transparent)]
    Publisher(#[from] PublisherError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SquadError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    fn inner(&self) -> Option<&dyn UnifiedError> {
        match self {
            Self::Loader(e) => Some(e),
            Self::Analyzer(e) => Some(e),
            Self::Extender(e) => Some(e),
            Self::Migrator(e) => Some(e),
            Self::Designer(e) => Some(e),
            Self::Generator(e) => Some(e),
            Self::Downloader(e) => Some(e),
            Self::Publisher(e) => Some(e),
            Self::Config { .. } | Self::Io(_) => None,
        }
    }
}

impl UnifiedError for SquadError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            _ => self.inner().map(|e| e.error_code()).unwrap_or("UNKNOWN"),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::Io(_) => "I/O error",
            _ => self.inner().map(|e| e.message()).unwrap_or_default(),
        }
    }

    fn suggestion(&self) -> Option<&str> {
        self.inner().and_then(|e| e.suggestion())
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            _ => self.inner().and_then(|e| e.context()),
        }
    }

    fn is_retryable(&self) -> bool {
        self.inner().is_some_and(|e| e.is_retryable())
    }
}
