/*!
 * Locale metadata records.
 *
 * - `LocaleMetadata`: the per-locale record persisted as `<code>_metadata.json`
 * - `AvailabilityIndex`: every record of one run, persisted as a single array
 * - `RemoteTranslationStatus`: one entry of the remote progress report
 */

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::PipelineError;
use crate::file_utils::FileManager;

/// File name of the metadata record inside a locale directory
pub fn metadata_file_name(locale: &str) -> String {
    format!("{}_metadata.json", locale)
}

/// Per-locale language pack metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleMetadata {
    /// Locale code as known by the remote service
    #[serde(default)]
    pub code: String,

    /// Display name of the language
    #[serde(default)]
    pub name: String,

    /// Approved translation progress, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_translated: Option<u64>,

    /// Number of source phrases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrases: Option<u64>,

    /// Number of approved translations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_translations: Option<u64>,

    /// Software release the pack was last built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,

    /// Pack version within the software release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowdin_version: Option<u32>,

    /// Number of available subtitles in this language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_count: Option<u64>,

    /// Approved count the current `crowdin_version` was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_translated: Option<u64>,

    /// Keys this crate does not know about, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocaleMetadata {
    /// Minimal record holding only a code and a name
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            percent_translated: None,
            phrases: None,
            approved_translations: None,
            software_version: None,
            crowdin_version: None,
            subtitle_count: None,
            total_translated: None,
            extra: Map::new(),
        }
    }

    /// Load a record from disk
    pub fn load<P: AsRef<Path>>(path: P, locale: &str) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let load_error = |reason: String| PipelineError::LocaleMetadataLoad {
            locale: locale.to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| load_error(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))
    }

    /// Write the record to disk, replacing any previous file in one step
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        FileManager::write_atomic(path, &json)
    }

    /// Overwrite the fields present in `update`, leaving every other field as is
    pub fn apply(&mut self, update: &MetadataUpdate) {
        if let Some(v) = update.percent_translated {
            self.percent_translated = Some(v);
        }
        if let Some(v) = update.phrases {
            self.phrases = Some(v);
        }
        if let Some(v) = update.approved_translations {
            self.approved_translations = Some(v);
        }
        if let Some(v) = &update.software_version {
            self.software_version = Some(v.clone());
        }
        if let Some(v) = update.crowdin_version {
            self.crowdin_version = Some(v);
        }
        if let Some(v) = update.subtitle_count {
            self.subtitle_count = Some(v);
        }
        if let Some(v) = update.total_translated {
            self.total_translated = Some(v);
        }
    }
}

/// The set of fields refreshed by one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataUpdate {
    pub percent_translated: Option<u64>,
    pub phrases: Option<u64>,
    pub approved_translations: Option<u64>,
    pub software_version: Option<String>,
    pub crowdin_version: Option<u32>,
    pub subtitle_count: Option<u64>,
    pub total_translated: Option<u64>,
}

impl MetadataUpdate {
    /// Full update from a matched remote status
    pub fn from_remote(
        status: &RemoteTranslationStatus,
        software_version: &str,
        crowdin_version: u32,
        subtitle_count: u64,
    ) -> Self {
        Self {
            percent_translated: Some(status.approved_progress),
            phrases: Some(status.phrases),
            approved_translations: Some(status.approved),
            software_version: Some(software_version.to_string()),
            crowdin_version: Some(crowdin_version),
            subtitle_count: Some(subtitle_count),
            total_translated: Some(status.approved),
        }
    }

    /// Update for a locale the remote service knows nothing about
    pub fn local_only(subtitle_count: u64) -> Self {
        Self {
            subtitle_count: Some(subtitle_count),
            ..Default::default()
        }
    }
}

/// Every locale record produced by one run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityIndex {
    entries: Vec<LocaleMetadata>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metadata: LocaleMetadata) {
        self.entries.push(metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LocaleMetadata] {
        &self.entries
    }

    /// Find a record by its code
    pub fn get(&self, code: &str) -> Option<&LocaleMetadata> {
        self.entries.iter().find(|m| m.code == code)
    }

    /// Read an index file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = FileManager::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the index, replacing any previous file in one step
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        FileManager::write_atomic(path, &json)
    }
}

/// Progress of one locale as reported by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTranslationStatus {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub phrases: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub approved: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub approved_progress: u64,
}

// The status endpoint reports counts as numbers or as numeric strings
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f >= 0.0 => Ok(f as u64),
        Number::Float(f) => Err(serde::de::Error::custom(format!("negative count: {}", f))),
        Number::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("not a count: {:?}", s))),
    }
}
