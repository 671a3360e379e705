/*!
 * Metadata merger.
 *
 * For every locale directory, folds the remote progress report and the local
 * subtitle count into the locale's stored metadata, writes the record back
 * and collects it into the availability index.
 */

use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_utils::{base_language, codes_match, get_language_name, plain_language_name, to_remote_code};
use crate::metadata::{metadata_file_name, AvailabilityIndex, LocaleMetadata, MetadataUpdate, RemoteTranslationStatus};
use crate::subtitles::SubtitleCountIndex;
use crate::version::{next_version, VersionComparator};

/// File name of the aggregate index inside the language pack root
pub const LANGUAGE_PACK_AVAILABILITY_FILENAME: &str = "language_pack_availability.json";

/// Find the remote status of a local locale directory.
///
/// An exact code match wins. A region-less local code such as `es` also
/// matches a single regional remote entry such as `es-ES`.
pub fn find_remote_status<'s>(
    locale: &str,
    statuses: &'s [RemoteTranslationStatus],
) -> Option<&'s RemoteTranslationStatus> {
    if let Some(status) = statuses.iter().find(|s| codes_match(locale, &s.code)) {
        return Some(status);
    }

    let language = base_language(locale);
    if language != to_remote_code(locale) {
        return None;
    }
    let mut same_language = statuses.iter().filter(|s| base_language(&s.code) == language);
    match (same_language.next(), same_language.next()) {
        (Some(status), None) => Some(status),
        _ => None,
    }
}

pub struct MetadataMerger<'a> {
    locale_root: PathBuf,
    index_path: PathBuf,
    software_version: String,
    comparator: &'a dyn VersionComparator,
}

impl<'a> MetadataMerger<'a> {
    pub fn new(
        locale_root: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        software_version: impl Into<String>,
        comparator: &'a dyn VersionComparator,
    ) -> Self {
        Self {
            locale_root: locale_root.into(),
            index_path: index_path.into(),
            software_version: software_version.into(),
            comparator,
        }
    }

    /// Update every locale's metadata file and write the availability index.
    ///
    /// A locale that fails is logged and left out of the index; the others
    /// are still written.
    pub fn generate_metadata(
        &self,
        statuses: &[RemoteTranslationStatus],
        subtitle_counts: &SubtitleCountIndex,
    ) -> Result<AvailabilityIndex, PipelineError> {
        info!("Generating language pack metadata");
        let mut index = AvailabilityIndex::new();

        for locale in FileManager::list_subdirs(&self.locale_root)? {
            match self.merge_locale(&locale, statuses, subtitle_counts) {
                Ok(metadata) => index.push(metadata),
                Err(e) => error!("Skipping locale '{}': {}", locale, e),
            }
        }

        index.save(&self.index_path)?;
        info!(
            "Local record of translations updated ({} locale(s), index at {:?})",
            index.len(),
            self.index_path
        );
        Ok(index)
    }

    /// Merge and persist one locale
    pub fn merge_locale(
        &self,
        locale: &str,
        statuses: &[RemoteTranslationStatus],
        subtitle_counts: &SubtitleCountIndex,
    ) -> Result<LocaleMetadata, PipelineError> {
        let status = find_remote_status(locale, statuses);
        if status.is_none() {
            warn!(
                "{}; keeping stored translation fields",
                PipelineError::UnmatchedRemoteLocale(locale.to_string())
            );
        }

        let path = self.metadata_path(locale);
        let previous = self.load_previous(locale, &path);
        let fallback = synthesize(locale, status);
        let mut record = previous.clone().unwrap_or_else(|| fallback.clone());
        if record.code.is_empty() {
            record.code = fallback.code;
        }
        if record.name.is_empty() {
            record.name = fallback.name;
        }

        let subtitle_count = subtitle_name_candidates(locale, status, &record.name)
            .iter()
            .find(|name| subtitle_counts.contains(name))
            .map(|name| subtitle_counts.count_for(name))
            .unwrap_or(0);

        let update = match status {
            Some(status) => {
                let crowdin_version = next_version(
                    previous.as_ref(),
                    status,
                    &self.software_version,
                    self.comparator,
                );
                MetadataUpdate::from_remote(status, &self.software_version, crowdin_version, subtitle_count)
            }
            None => {
                let mut update = MetadataUpdate::local_only(subtitle_count);
                if record.crowdin_version.is_none() {
                    update.crowdin_version = Some(1);
                }
                update
            }
        };
        record.apply(&update);
        debug!("{}: {:?}", locale, update);

        record.save(&path)?;
        Ok(record)
    }

    /// Location of a locale's metadata file
    pub fn metadata_path(&self, locale: &str) -> PathBuf {
        self.locale_root.join(locale).join(metadata_file_name(locale))
    }

    fn load_previous(&self, locale: &str, path: &Path) -> Option<LocaleMetadata> {
        match LocaleMetadata::load(path, locale) {
            Ok(metadata) => Some(metadata),
            Err(e) if FileManager::file_exists(path) => {
                warn!("{}; starting a fresh record", e);
                None
            }
            Err(_) => {
                debug!("No stored metadata for '{}'", locale);
                None
            }
        }
    }
}

/// Names a locale may be listed under in the subtitle counts, most specific first:
/// the ISO reference name, its plain form, the remote name, then the stored name
pub fn subtitle_name_candidates(
    locale: &str,
    status: Option<&RemoteTranslationStatus>,
    record_name: &str,
) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Ok(reference) = get_language_name(locale) {
        candidates.push(plain_language_name(&reference));
        candidates.insert(0, reference);
    }
    if let Some(status) = status {
        candidates.push(status.name.clone());
    }
    candidates.push(record_name.to_string());

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for name in candidates {
        if !name.is_empty() && !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

/// Minimal record for a locale without usable stored metadata
fn synthesize(locale: &str, status: Option<&RemoteTranslationStatus>) -> LocaleMetadata {
    match status {
        Some(s) => {
            let name = if s.name.is_empty() {
                get_language_name(locale).unwrap_or_else(|_| locale.to_string())
            } else {
                s.name.clone()
            };
            LocaleMetadata::new(s.code.clone(), name)
        }
        None => LocaleMetadata::new(
            to_remote_code(locale),
            get_language_name(locale).unwrap_or_else(|_| locale.to_string()),
        ),
    }
}
