/*!
 * Subtitle inputs of the language pack build.
 *
 * The subtitle pipeline is an external collaborator: it produces
 * `subtitle_counts.json` (language name -> `{count, ...}`) and is asked to
 * refresh stale subtitles before a build when `--days` is given.
 */

use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::file_utils::FileManager;

/// File name of the subtitle count index inside the subtitles data root
pub const SUBTITLE_COUNTS_FILENAME: &str = "subtitle_counts.json";

#[derive(Debug, Clone, Default, Deserialize)]
struct SubtitleCountEntry {
    #[serde(default)]
    count: u64,
}

/// Language display name -> number of available subtitles. Read only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SubtitleCountIndex {
    counts: HashMap<String, SubtitleCountEntry>,
}

impl SubtitleCountIndex {
    /// Load the index. A missing file is an empty index; a malformed one is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            warn!("Subtitle counts not found at {:?}, assuming no subtitles", path);
            return Ok(Self::default());
        }

        let content = FileManager::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse subtitle counts: {:?}", path))
    }

    /// Build an index from `(name, count)` pairs
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            counts: counts
                .into_iter()
                .map(|(name, count)| (name.into(), SubtitleCountEntry { count }))
                .collect(),
        }
    }

    /// Subtitle count for a language name; unknown languages have none
    pub fn count_for(&self, language_name: &str) -> u64 {
        self.counts.get(language_name).map(|e| e.count).unwrap_or(0)
    }

    /// Whether the index lists this language name at all
    pub fn contains(&self, language_name: &str) -> bool {
        self.counts.contains_key(language_name)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Cutoff date for a refresh of subtitles older than `days`, as `M/D/YYYY`
pub fn refresh_cutoff(today: NaiveDate, days: u32) -> String {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
        .format("%-m/%-d/%Y")
        .to_string()
}

/// Refreshes subtitles that have not been fetched since a cutoff date
pub trait SubtitleRefresher {
    fn refresh_since(&self, cutoff: &str) -> Result<()>;
}

/// Runs external commands, substituting `{date}` with the cutoff
#[derive(Debug, Clone)]
pub struct CommandSubtitleRefresher {
    commands: Vec<String>,
}

impl CommandSubtitleRefresher {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    /// Program and arguments of one configured command line
    pub fn command_line(template: &str, cutoff: &str) -> Vec<String> {
        template
            .split_whitespace()
            .map(|part| part.replace("{date}", cutoff))
            .collect()
    }
}

impl SubtitleRefresher for CommandSubtitleRefresher {
    fn refresh_since(&self, cutoff: &str) -> Result<()> {
        if self.commands.is_empty() {
            warn!("No subtitle refresh commands configured, skipping refresh");
            return Ok(());
        }

        for template in &self.commands {
            let parts = Self::command_line(template, cutoff);
            let Some((program, args)) = parts.split_first() else {
                continue;
            };

            info!("Running: {}", parts.join(" "));
            let status = Command::new(program)
                .args(args)
                .status()
                .with_context(|| format!("Failed to start subtitle refresh command: {}", program))?;

            if !status.success() {
                return Err(anyhow!(
                    "Subtitle refresh command failed ({}): {}",
                    status,
                    parts.join(" ")
                ));
            }
        }

        Ok(())
    }
}
