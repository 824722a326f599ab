use std::sync::Arc;

use tracing::debug;

use squad_core::analyzer::{AnalyzerOptions, SquadAnalyzer};
use squad_core::config::SquadSettings;
use squad_core::designer::{DesignerOptions, SquadDesigner};
use squad_core::extender::{ExtenderOptions, SquadExtender};
use squad_core::generator::{GeneratorOptions, SquadGenerator};
use squad_core::loader::{LoaderOptions, SquadLoader};
use squad_core::migrator::{MigratorOptions, SquadMigrator};
use squad_core::registry::{
    CommandRunner, DownloaderOptions, HttpTransport, PublisherOptions, ReqwestTransport,
    SquadDownloader, SquadPublisher, TokioCommandRunner,
};
use squad_core::validator::{ManifestValidator, SquadValidator};

/// Every squad component, wired from one settings value.
///
/// Shared seams (validator, HTTP transport, process runner) are created once
/// and handed to each component that needs them.
pub struct SquadContext {
    pub settings: SquadSettings,
    pub loader: SquadLoader,
    pub analyzer: SquadAnalyzer,
    pub extender: SquadExtender,
    pub migrator: SquadMigrator,
    pub designer: SquadDesigner,
    pub generator: SquadGenerator,
    pub downloader: SquadDownloader,
    pub publisher: SquadPublisher,
}

impl SquadContext {
    pub fn from_settings(settings: SquadSettings) -> Self {
        let downloader_options = DownloaderOptions::from_settings(&settings);
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(downloader_options.timeout));
        Self::with_seams(
            settings,
            Arc::new(ManifestValidator),
            transport,
            Arc::new(TokioCommandRunner),
        )
    }

    /// Build with caller-supplied seams, e.g. fakes in tests.
    pub fn with_seams(
        settings: SquadSettings,
        validator: Arc<dyn SquadValidator>,
        transport: Arc<dyn HttpTransport>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        debug!(
            "Building squad context for {}",
            settings.squads_path.display()
        );
        Self {
            loader: SquadLoader::new(LoaderOptions::from_settings(&settings)),
            analyzer: SquadAnalyzer::new(AnalyzerOptions::from_settings(&settings)),
            extender: SquadExtender::new(ExtenderOptions::from_settings(&settings)),
            migrator: SquadMigrator::new(MigratorOptions::from_settings(&settings))
                .with_validator(Some(validator.clone())),
            designer: SquadDesigner::new(DesignerOptions::from_settings(&settings)),
            generator: SquadGenerator::new(GeneratorOptions::from_settings(&settings)),
            downloader: SquadDownloader::with_transport(
                DownloaderOptions::from_settings(&settings),
                transport,
            )
            .with_validator(validator.clone()),
            publisher: SquadPublisher::new(PublisherOptions::from_settings(&settings))
                .with_runner(runner)
                .with_validator(validator),
            settings,
        }
    }
}
