use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::time::Instant;

use crate::app_config::Config;
use crate::catalog::{compile_all_catalogs, CatalogCompiler, MsgfmtCompiler};
use crate::crowdin::{CrowdinClient, TranslationRemote};
use crate::errors::PipelineError;
use crate::fetcher::TranslationFetcher;
use crate::merger::MetadataMerger;
use crate::metadata::AvailabilityIndex;
use crate::packager::Packager;
use crate::subtitles::{refresh_cutoff, CommandSubtitleRefresher, SubtitleCountIndex, SubtitleRefresher};
use crate::version::{DottedVersionComparator, VersionComparator};

// @module: Application controller for language pack builds

/// Message shown when the legacy subtitle layout is still in place
pub const OUTDATED_SRT_SCHEMA_MESSAGE: &str = "Please run the command 'move_existing_srts' before continuing.";

/// Steps of one build, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    SchemaCheck,
    FetchSubtitles,
    DownloadTranslations,
    MergeMetadata,
    CompileCatalogs,
    Package,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SchemaCheck => "schema check",
            Self::FetchSubtitles => "subtitle refresh",
            Self::DownloadTranslations => "translation download",
            Self::MergeMetadata => "metadata merge",
            Self::CompileCatalogs => "catalog compilation",
            Self::Package => "packaging",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Result of a completed build
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Stages that ran, in order, ending with `Done`
    pub stages: Vec<PipelineStage>,
    pub index: AvailabilityIndex,
    pub archives: Vec<std::path::PathBuf>,
}

/// Fail if subtitles still live in the legacy `<static_root>/srt` directory
pub fn check_srt_schema(static_root: &Path) -> Result<(), PipelineError> {
    if static_root.join("srt").exists() {
        return Err(PipelineError::Precondition(OUTDATED_SRT_SCHEMA_MESSAGE.to_string()));
    }
    Ok(())
}

/// Main application controller for language pack builds
pub struct Controller {
    // @field: App configuration
    config: Config,
    remote: Box<dyn TranslationRemote>,
    compiler: Box<dyn CatalogCompiler>,
    refresher: Box<dyn SubtitleRefresher>,
    comparator: Box<dyn VersionComparator>,
}

impl Controller {
    // @method: Create a new controller talking to the configured services
    pub fn with_config(config: Config) -> Result<Self, PipelineError> {
        let remote = CrowdinClient::new(&config.crowdin).map_err(|e| PipelineError::Config(e.to_string()))?;
        let compiler = MsgfmtCompiler::new(config.catalogs.msgfmt_path.clone());
        let refresher = CommandSubtitleRefresher::new(config.subtitles.refresh_commands.clone());

        Ok(Self::with_components(
            config,
            Box::new(remote),
            Box::new(compiler),
            Box::new(refresher),
        ))
    }

    /// Create a controller from explicit collaborators
    pub fn with_components(
        config: Config,
        remote: Box<dyn TranslationRemote>,
        compiler: Box<dyn CatalogCompiler>,
        refresher: Box<dyn SubtitleRefresher>,
    ) -> Self {
        Self {
            config,
            remote,
            compiler,
            refresher,
            comparator: Box::new(DottedVersionComparator),
        }
    }

    /// Replace the software version comparator
    pub fn with_comparator(mut self, comparator: Box<dyn VersionComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole build. `refresh_days` enables the subtitle refresh pre-step.
    pub async fn run(&self, refresh_days: Option<u32>) -> Result<RunSummary, PipelineError> {
        let start_time = Instant::now();
        let mut stages = Vec::new();

        self.enter(&mut stages, PipelineStage::SchemaCheck);
        check_srt_schema(&self.config.static_root)?;

        if let Some(days) = refresh_days {
            self.enter(&mut stages, PipelineStage::FetchSubtitles);
            self.refresh_subtitles(days)?;
        }

        self.enter(&mut stages, PipelineStage::DownloadTranslations);
        TranslationFetcher::new(self.remote.as_ref(), &self.config.locale_root)
            .fetch_latest_translations(&self.config.crowdin.language_filter)
            .await?;

        self.enter(&mut stages, PipelineStage::MergeMetadata);
        let index = self.generate_metadata().await?;

        self.enter(&mut stages, PipelineStage::CompileCatalogs);
        compile_all_catalogs(&self.config.locale_root, self.compiler.as_ref())?;

        self.enter(&mut stages, PipelineStage::Package);
        let archives = Packager::new(&self.config.locale_root, &self.config.language_pack_root)
            .build_archives(&self.config.software_version)?;

        self.enter(&mut stages, PipelineStage::Done);
        info!(
            "Language packs for {} updated in {}.",
            self.config.software_version,
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunSummary { stages, index, archives })
    }

    /// Ask the subtitle pipeline to refresh anything older than `days`
    pub fn refresh_subtitles(&self, days: u32) -> Result<(), PipelineError> {
        let cutoff = refresh_cutoff(chrono::Local::now().date_naive(), days);
        info!("Updating subtitles that haven't been refreshed since {}", cutoff);
        self.refresher
            .refresh_since(&cutoff)
            .map_err(|e| PipelineError::SubtitleRefresh(format!("{:#}", e)))
    }

    /// Fetch remote progress and merge it into every locale's metadata
    pub async fn generate_metadata(&self) -> Result<AvailabilityIndex, PipelineError> {
        let statuses = self.remote.fetch_status().await.map_err(PipelineError::Fetch)?;
        debug!("Remote reports {} locale(s)", statuses.len());
        let subtitle_counts = SubtitleCountIndex::load(self.config.subtitle_counts_path())?;

        MetadataMerger::new(
            &self.config.locale_root,
            self.config.availability_index_path(),
            &self.config.software_version,
            self.comparator.as_ref(),
        )
        .generate_metadata(&statuses, &subtitle_counts)
    }

    fn enter(&self, stages: &mut Vec<PipelineStage>, stage: PipelineStage) {
        debug!("Entering stage: {}", stage);
        stages.push(stage);
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
