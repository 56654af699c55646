//! Conversion driver.
//!
//! Walks a source directory and pushes every file through
//! extract → directives → rewrite → emit. Files are independent, so they can
//! be read and transformed in parallel; emission always happens on a single
//! writer in file-name order.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::emit::{ArtifactEmitter, TransformedHandler};
use crate::error::{ConvertError, ConvertResult};
use crate::extract::extract_handlers;
use crate::paths::ProjectDirs;
use crate::rewrite::{AppServicesDispatch, Dispatcher, InvocationRewriter};
use crate::skeleton::create_skeleton;

/// Default source file extension.
pub const DEFAULT_SOURCE_EXTENSION: &str = "js";

/// Options controlling a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extensions (without the dot) of files to scan.
    pub source_extensions: Vec<String>,

    /// Read and transform source files on the rayon pool.
    pub parallel: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_extensions: vec![DEFAULT_SOURCE_EXTENSION.to_string()],
            parallel: false,
        }
    }
}

impl ConvertOptions {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.source_extensions.iter().any(|e| e == ext))
    }
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub files_scanned: usize,
    pub handlers_extracted: usize,
    pub handlers_skipped: usize,
    pub artifacts_written: usize,
    pub endpoints_registered: usize,
}

/// Handlers recovered from one source file.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub handlers: Vec<TransformedHandler>,
}

impl SourceUnit {
    /// Read a source file and transform every handler in it.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the file.
    pub fn load<D: Dispatcher>(path: &Path, rewriter: &InvocationRewriter<D>) -> ConvertResult<Self> {
        let bytes = fs::read(path).map_err(|e| ConvertError::read(path, e))?;
        let source = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = source {
            tracing::warn!("{} is not valid UTF-8, invalid bytes replaced", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            handlers: transform_source(&source, rewriter),
        })
    }
}

/// Transform all handlers of a source text.
pub fn transform_source<D: Dispatcher>(
    source: &str,
    rewriter: &InvocationRewriter<D>,
) -> Vec<TransformedHandler> {
    extract_handlers(source.lines())
        .map(|handler| TransformedHandler::from_handler(handler, rewriter))
        .collect()
}

/// List the scannable files of a directory, sorted by file name.
///
/// Only regular files are considered; symlinks and subdirectories are ignored.
pub fn collect_source_files(dir: &Path, options: &ConvertOptions) -> ConvertResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ConvertError::read(dir, e))? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if options.accepts(&path) {
            files.push(path);
        } else {
            tracing::debug!("Skipping {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

/// Conversion pipeline bound to a dispatcher.
pub struct Pipeline<D = AppServicesDispatch> {
    options: ConvertOptions,
    rewriter: InvocationRewriter<D>,
}

impl Pipeline<AppServicesDispatch> {
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_dispatcher(options, AppServicesDispatch)
    }
}

impl<D: Dispatcher + Sync> Pipeline<D> {
    pub fn with_dispatcher(options: ConvertOptions, dispatcher: D) -> Self {
        Self {
            options,
            rewriter: InvocationRewriter::new(dispatcher),
        }
    }

    /// Generate artifacts and manifests for every source file in `source_dir`.
    ///
    /// # Errors
    /// The first read or write failure aborts the run. Manifests written so
    /// far stay on disk unterminated.
    pub fn run(&self, source_dir: &Path, dirs: ProjectDirs) -> ConvertResult<ConversionReport> {
        let start = Instant::now();
        let files = collect_source_files(source_dir, &self.options)?;
        let mut emitter = ArtifactEmitter::open(dirs)?;
        let mut report = ConversionReport {
            files_scanned: files.len(),
            ..Default::default()
        };

        if self.options.parallel {
            let units = files
                .par_iter()
                .map(|path| SourceUnit::load(path, &self.rewriter))
                .collect::<ConvertResult<Vec<_>>>()?;
            for unit in &units {
                emit_unit(&mut emitter, unit, &mut report)?;
            }
        } else {
            for path in &files {
                let unit = SourceUnit::load(path, &self.rewriter)?;
                emit_unit(&mut emitter, &unit, &mut report)?;
            }
        }

        let stats = emitter.finish()?;
        report.artifacts_written = stats.artifacts_written;
        report.endpoints_registered = stats.endpoints_registered;

        tracing::info!(
            "Converted {} files: {} handlers, {} artifacts, {} endpoints ({:.2}ms)",
            report.files_scanned,
            report.handlers_extracted,
            report.artifacts_written,
            report.endpoints_registered,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(report)
    }
}

fn emit_unit(
    emitter: &mut ArtifactEmitter,
    unit: &SourceUnit,
    report: &mut ConversionReport,
) -> ConvertResult<()> {
    tracing::debug!(
        "{}: {} handlers",
        unit.path.display(),
        unit.handlers.len()
    );

    for handler in &unit.handlers {
        report.handlers_extracted += 1;
        if !handler.category.is_transferable() {
            report.handlers_skipped += 1;
            tracing::debug!("Skipping handler '{}' (no recognised prefix)", handler.name);
            continue;
        }
        emitter.emit(handler)?;
    }

    Ok(())
}

/// Settings for a full project conversion.
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    pub app_name: String,
    pub cluster_name: String,
    pub source_dir: PathBuf,
    pub template_dir: PathBuf,
    pub app_dir: PathBuf,
    pub options: ConvertOptions,
}

/// Create the project skeleton, then generate functions and endpoints into it.
pub fn convert_project(settings: &ProjectSettings) -> ConvertResult<ConversionReport> {
    create_skeleton(
        &settings.template_dir,
        &settings.app_dir,
        &settings.app_name,
        &settings.cluster_name,
    )?;
    let dirs = ProjectDirs::from_app_dir(&settings.app_dir)?;
    Pipeline::new(settings.options.clone()).run(&settings.source_dir, dirs)
}
