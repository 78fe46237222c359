// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver. Walks a directory tree, runs the edit pipeline on every PDF
// and collects the results.
//
// Layout: `<dir>/name.pdf` is written to `<dir>/processed/name.pdf`.
// Directories named like the output folder are never descended into, so a
// second run does not pick up the first run's output.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::Local;
use folio_core::error::{FolioError, Result};
use folio_core::{BatchConfig, ProcessingResult, RunSummary};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::pipeline::DocumentPipeline;
use crate::properties::DocumentProperties;
use crate::report::ComparisonReport;

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Discovery finished.
    Discovered { total: usize },
    /// About to process `source`.
    Started {
        source: &'a Path,
        index: usize,
        total: usize,
    },
    /// `source` finished, successfully or not.
    Finished(&'a ProcessingResult),
}

/// Runs the edit pipeline over a directory tree, one file at a time.
pub struct BatchRunner {
    config: BatchConfig,
    pipeline: DocumentPipeline,
}

impl BatchRunner {
    /// Runner with a pipeline built from `config`.
    pub fn new(config: BatchConfig) -> Result<Self> {
        let pipeline = DocumentPipeline::from_config(&config);
        Self::with_pipeline(config, pipeline)
    }

    /// Runner using a caller-supplied pipeline (e.g. a different linearizer).
    pub fn with_pipeline(config: BatchConfig, pipeline: DocumentPipeline) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Every PDF under `root` (case-insensitive extension), sorted by name,
    /// excluding anything inside an output folder.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        validate_root(root)?;

        let output_folder = self.config.output_folder.as_str();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir() && entry.file_name() == output_folder)
            });

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if is_file_entry(&entry) && has_pdf_extension(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "Skipping unreadable entry"),
            }
        }

        Ok(files)
    }

    /// `<source dir>/<output folder>/<source file name>`.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        source
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.config.output_folder)
            .join(source.file_name().unwrap_or_default())
    }

    /// Process every PDF under `root`.
    ///
    /// Only an invalid root is an error; per-file failures are recorded in
    /// the returned summary and the run continues.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn run(&self, root: &Path, mut on_event: impl FnMut(BatchEvent<'_>)) -> Result<RunSummary> {
        let sources = self.discover(root)?;
        let total = sources.len();
        info!(total, "Discovered PDF files");
        on_event(BatchEvent::Discovered { total });

        let mut summary = RunSummary::new();
        let mut report = ComparisonReport::new();
        let mut report_dir: Option<PathBuf> = None;

        for (index, source) in sources.iter().enumerate() {
            let dest = self.destination_for(source);
            on_event(BatchEvent::Started {
                source,
                index,
                total,
            });

            let before = self
                .config
                .write_report
                .then(|| DocumentProperties::inspect(source));

            let result = self.pipeline.process(source, &dest);

            if let (true, Some(before)) = (result.is_success(), before) {
                let after = DocumentProperties::inspect(&dest);
                report.add(relative_to(root, source).display().to_string(), before, after);
                if let Some(dir) = dest.parent() {
                    report_dir.get_or_insert_with(|| dir.to_path_buf());
                }
            }

            on_event(BatchEvent::Finished(&result));
            summary.record(result);
        }

        if let Some(dir) = report_dir {
            match report.write_to_dir(&dir, Local::now()) {
                Ok(path) => summary.set_report_path(path),
                Err(err) => warn!(%err, dir = %dir.display(), "Could not write comparison report"),
            }
        }

        info!(
            total = summary.total(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Batch complete"
        );
        Ok(summary)
    }
}

/// `path` relative to `root`, or `path` unchanged when it lies elsewhere.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn validate_root(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root)
        .map_err(|err| FolioError::InvalidRoot(format!("{}: {}", root.display(), err)))?;
    if !metadata.is_dir() {
        return Err(FolioError::InvalidRoot(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    std::fs::read_dir(root)
        .map_err(|err| FolioError::InvalidRoot(format!("{}: {}", root.display(), err)))?;
    Ok(())
}

/// Regular files, plus symlinks that resolve to one. Symlinked directories
/// are not descended into.
fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
