//! Squad Core Library
//!
//! Loading, analyzing, extending, migrating, designing, generating,
//! downloading and publishing AIOS squads. Each component is a plain struct
//! built from an options value; shared I/O seams are traits so callers can
//! inject their own implementations.

pub mod analyzer;
pub mod blueprint;
pub mod config;
pub mod designer;
pub mod error;
pub mod extender;
pub mod fsutil;
pub mod generator;
pub mod loader;
pub mod manifest;
pub mod migrator;
pub mod naming;
pub mod registry;
pub mod templates;
pub mod validator;

// Re-export commonly used types
pub use analyzer::{AnalysisResult, AnalyzeOptions, AnalyzerOptions, ReportFormat, SquadAnalyzer};
pub use blueprint::{Blueprint, DomainAnalysis, SquadTemplate};
pub use config::{LoggingConfig, SquadSettings};
pub use designer::{DesignerOptions, DocumentationInput, SquadDesigner};
pub use error::{SquadError, SquadResult, UnifiedError};
pub use extender::{AddOptions, ComponentRequest, ExtenderOptions, SquadExtender};
pub use generator::{GenerateRequest, GeneratorOptions, SquadGenerator};
pub use loader::{LoaderOptions, SquadLoader};
pub use manifest::{ComponentKind, ConfigMode, Manifest};
pub use migrator::{MigrateOptions, MigratorOptions, SquadMigrator};
pub use registry::{
    DownloaderOptions, PublishOptions, PublisherOptions, SquadCategory, SquadDownloader,
    SquadPublisher,
};
pub use validator::{ManifestValidator, SquadValidator, ValidationReport};
