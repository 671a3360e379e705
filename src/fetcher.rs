/*!
 * Translation fetcher.
 *
 * Downloads the latest translation export and installs its `.po` files into
 * the locale tree. Every extracted locale directory is converted to the local
 * code format, and each `<lang>/<any>/<file>.po` is copied to either
 * `LC_MESSAGES/djangojs.po` or `LC_MESSAGES/django.po` depending on whether its
 * name marks it as script strings. Existing files are overwritten.
 */

use log::{debug, error, info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

use crate::crowdin::TranslationRemote;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_utils::to_local_code;

/// Substring marking a file of script-embedded strings
pub const SCRIPT_CONTEXT_MARKER: &str = "js";

/// Destination of script-embedded strings
pub const SCRIPT_TRANSLATIONS_FILENAME: &str = "djangojs.po";

/// Destination of interface strings
pub const INTERFACE_TRANSLATIONS_FILENAME: &str = "django.po";

/// Catalog subdirectory inside each locale directory
pub const MESSAGES_DIR: &str = "LC_MESSAGES";

/// Pick the destination file name for a downloaded translation file
pub fn route_translation_file(file_name: &str) -> &'static str {
    if file_name.contains(SCRIPT_CONTEXT_MARKER) {
        SCRIPT_TRANSLATIONS_FILENAME
    } else {
        INTERFACE_TRANSLATIONS_FILENAME
    }
}

/// What one fetch installed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchReport {
    /// Local codes of the locales found in the archive
    pub locales: Vec<String>,
    /// Destination files written, in write order
    pub installed: Vec<PathBuf>,
}

/// Fetches translations into a locale tree
pub struct TranslationFetcher<'a> {
    remote: &'a dyn TranslationRemote,
    locale_root: PathBuf,
    // @field: Parent of the extraction directory; system temp dir when unset
    scratch_parent: Option<PathBuf>,
}

impl<'a> TranslationFetcher<'a> {
    pub fn new(remote: &'a dyn TranslationRemote, locale_root: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            locale_root: locale_root.into(),
            scratch_parent: None,
        }
    }

    /// Extract archives below `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    /// Trigger an export, download it and install its translation files.
    ///
    /// A failed export trigger is logged and ignored; a failed download aborts.
    pub async fn fetch_latest_translations(&self, language_filter: &str) -> Result<FetchReport, PipelineError> {
        info!("Requesting a fresh build of the translation export");
        if let Err(e) = self.remote.trigger_export().await {
            let err = PipelineError::BuildTrigger(e);
            error!("{} (continuing with the existing export)", err);
        }

        info!("Downloading translation archive for '{}'", language_filter);
        let archive = self
            .remote
            .download_archive(language_filter)
            .await
            .map_err(PipelineError::Fetch)?;
        info!("Downloaded translation archive ({} bytes)", archive.len());

        // Removed on drop, whichever way this function returns
        let scratch = match &self.scratch_parent {
            Some(parent) => {
                FileManager::ensure_dir(parent)?;
                TempDir::new_in(parent)?
            }
            None => TempDir::new()?,
        };
        extract_archive(&archive, scratch.path())?;
        let report = self.install_translations(scratch.path())?;

        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch directory: {}", e);
        }

        info!(
            "Installed {} translation file(s) for {} locale(s)",
            report.installed.len(),
            report.locales.len()
        );
        Ok(report)
    }

    /// Copy translation files from an extracted export into the locale tree
    pub fn install_translations(&self, extracted: &Path) -> Result<FetchReport, PipelineError> {
        let mut report = FetchReport::default();

        for lang in FileManager::list_subdirs(extracted)? {
            let code = to_local_code(&lang);
            let lang_dir = extracted.join(&lang);
            let messages_dir = self.locale_root.join(&code).join(MESSAGES_DIR);
            FileManager::ensure_dir(&messages_dir)?;

            // Only files one directory below the locale: <lang>/<group>/<file>.po
            let sources = FileManager::find_files(&lang_dir, "po", 2)?
                .into_iter()
                .filter(|p| p.parent() != Some(lang_dir.as_path()));

            for source in sources {
                let file_name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let destination = messages_dir.join(route_translation_file(&file_name));
                debug!("{:?} -> {:?}", source, destination);
                FileManager::copy_file(&source, &destination)?;
                report.installed.push(destination);
            }

            report.locales.push(code);
        }

        Ok(report)
    }
}

/// Unpack a zip archive held in memory into `destination`
pub fn extract_archive(archive: &[u8], destination: &Path) -> Result<(), PipelineError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    zip.extract(destination)?;
    Ok(())
}
