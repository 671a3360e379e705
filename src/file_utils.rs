use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Names of the immediate subdirectories of `dir`, sorted. Files are ignored.
    pub fn list_subdirs<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        let mut names = Vec::new();

        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Find files with a specific extension at most `max_depth` levels below `dir`, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str, max_depth: usize) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref())
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file through a temporary sibling and a rename,
    /// so readers never see a partially written file
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("Failed to replace file: {:?}", path))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }
}
