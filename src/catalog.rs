/*!
 * Message catalog compilation.
 *
 * Turns each `.po` source under a locale's `LC_MESSAGES` into the `.mo` binary served
 * at runtime and shipped in the language pack.
 */

use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::PipelineError;
use crate::fetcher::MESSAGES_DIR;
use crate::file_utils::FileManager;

/// Compiles one source catalog into its binary form
pub trait CatalogCompiler {
    fn compile(&self, po_file: &Path, mo_file: &Path) -> Result<(), PipelineError>;
}

/// Compiler backed by GNU gettext's `msgfmt`
#[derive(Debug, Clone)]
pub struct MsgfmtCompiler {
    program: String,
}

impl MsgfmtCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl CatalogCompiler for MsgfmtCompiler {
    fn compile(&self, po_file: &Path, mo_file: &Path) -> Result<(), PipelineError> {
        let output = Command::new(&self.program)
            .arg("-o")
            .arg(mo_file)
            .arg(po_file)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PipelineError::Config(format!(
                    "'{}' not found; install gettext or set catalogs.msgfmt_path",
                    self.program
                )),
                _ => PipelineError::Compile(format!("{:?}: {}", po_file, e)),
            })?;

        if !output.status.success() {
            return Err(PipelineError::Compile(format!(
                "{:?}: {}",
                po_file,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Outcome of compiling a locale tree
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompileReport {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Compile every catalog under `locale_root`. Individual failures are logged
/// and skipped; fatal errors stop the stage.
pub fn compile_all_catalogs(
    locale_root: &Path,
    compiler: &dyn CatalogCompiler,
) -> Result<CompileReport, PipelineError> {
    info!("Compiling message catalogs");
    let mut report = CompileReport::default();

    for locale in FileManager::list_subdirs(locale_root)? {
        let messages_dir = locale_root.join(&locale).join(MESSAGES_DIR);
        if !FileManager::dir_exists(&messages_dir) {
            continue;
        }

        for po_file in FileManager::find_files(&messages_dir, "po", 1)? {
            let mo_file = po_file.with_extension("mo");
            match compiler.compile(&po_file, &mo_file) {
                Ok(()) => report.compiled.push(mo_file),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("{}", e);
                    report.failed.push(po_file);
                }
            }
        }
    }

    info!(
        "Compiled {} catalog(s), {} failed",
        report.compiled.len(),
        report.failed.len()
    );
    Ok(report)
}
