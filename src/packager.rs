/*!
 * Language pack packager.
 *
 * Writes `<language_pack_root>/<version>/<locale>.zip` for every locale
 * directory. An archive holds the locale's metadata JSON files at its root
 * and its compiled catalogs under `LC_MESSAGES/`. An existing archive at the
 * same path is replaced.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::PipelineError;
use crate::fetcher::MESSAGES_DIR;
use crate::file_utils::FileManager;
use crate::language_utils::to_local_code;

pub struct Packager {
    locale_root: PathBuf,
    language_pack_root: PathBuf,
}

impl Packager {
    pub fn new(locale_root: impl Into<PathBuf>, language_pack_root: impl Into<PathBuf>) -> Self {
        Self {
            locale_root: locale_root.into(),
            language_pack_root: language_pack_root.into(),
        }
    }

    /// Directory holding the archives of one software version
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.language_pack_root.join(version)
    }

    /// Build one archive per locale directory and return their paths
    pub fn build_archives(&self, version: &str) -> Result<Vec<PathBuf>, PipelineError> {
        info!("Zipping up language packs");
        let locales = FileManager::list_subdirs(&self.locale_root)?;
        let output_dir = self.version_dir(version);
        FileManager::ensure_dir(&output_dir)?;

        let progress = ProgressBar::new(locales.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut archives = Vec::with_capacity(locales.len());
        for locale in &locales {
            progress.set_message(locale.clone());
            let archive_path = output_dir.join(format!("{}.zip", to_local_code(locale)));
            self.build_archive(&self.locale_root.join(locale), &archive_path)?;
            archives.push(archive_path);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Wrote {} language pack(s) to {:?}", archives.len(), output_dir);
        Ok(archives)
    }

    /// Zip one locale directory into `archive_path`
    pub fn build_archive(&self, locale_dir: &Path, archive_path: &Path) -> Result<(), PipelineError> {
        let file = File::create(archive_path)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for metadata_file in FileManager::find_files(locale_dir, "json", 1)? {
            add_file(&mut zip, &metadata_file, archive_name(&metadata_file, None), options)?;
        }

        let messages_dir = locale_dir.join(MESSAGES_DIR);
        if FileManager::dir_exists(&messages_dir) {
            for mo_file in FileManager::find_files(&messages_dir, "mo", 1)? {
                add_file(&mut zip, &mo_file, archive_name(&mo_file, Some(MESSAGES_DIR)), options)?;
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        debug!("Wrote {:?}", archive_path);
        Ok(())
    }
}

// Archive paths always use '/', whatever the host separator
fn archive_name(path: &Path, prefix: Option<&str>) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match prefix {
        Some(prefix) => format!("{}/{}", prefix, file_name),
        None => file_name,
    }
}

fn add_file<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    name: String,
    options: SimpleFileOptions,
) -> Result<(), PipelineError> {
    let content = std::fs::read(source)?;
    zip.start_file(name, options)?;
    zip.write_all(&content)?;
    Ok(())
}
