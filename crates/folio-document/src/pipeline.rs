// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document edit pipeline.
//
// Steps run in a fixed order: open, page mode, layout/magnification,
// metadata, outline visibility, tag removal, save. The first failing step
// ends processing for that file and is reported in the returned
// `ProcessingResult`; nothing escapes to the caller as an error.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

use folio_core::error::{FolioError, Result};
use folio_core::{BatchConfig, BookmarkLevel, ProcessingResult};
use tracing::{debug, info, instrument, warn};

use crate::pdf::document::PdfDocument;
use crate::pdf::linearize::{Linearizer, QpdfLinearizer};

/// `/PageMode` that opens the bookmarks panel next to the page.
pub const PAGE_MODE_BOOKMARKS: &str = "UseOutlines";

/// `/PageLayout` applied to every document.
pub const DEFAULT_PAGE_LAYOUT: &str = "SinglePage";

/// Pipeline stage, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStep {
    Open,
    PageMode,
    Layout,
    Metadata,
    Outline,
    Tags,
    Save,
}

impl fmt::Display for EditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::PageMode => "set page mode",
            Self::Layout => "set page layout",
            Self::Metadata => "remove metadata",
            Self::Outline => "reduce outline",
            Self::Tags => "remove tags",
            Self::Save => "save",
        };
        f.write_str(label)
    }
}

/// A failure tagged with the step it happened in.
#[derive(Debug)]
struct StepError {
    step: EditStep,
    source: FolioError,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.source)
    }
}

fn at(step: EditStep) -> impl FnOnce(FolioError) -> StepError {
    move |source| StepError { step, source }
}

/// Applies the Folio edits to one document at a time.
pub struct DocumentPipeline {
    level: BookmarkLevel,
    linearize: bool,
    linearizer: Box<dyn Linearizer>,
}

impl DocumentPipeline {
    /// Pipeline with the given outline level, linearizing through `qpdf`.
    pub fn new(level: BookmarkLevel) -> Self {
        Self {
            level,
            linearize: true,
            linearizer: Box::new(QpdfLinearizer::default()),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.bookmark_level)
            .with_linearize(config.linearize)
            .with_linearizer(QpdfLinearizer::new(config.qpdf_path.clone()))
    }

    /// Enable or disable fast web view on save.
    pub fn with_linearize(mut self, enabled: bool) -> Self {
        self.linearize = enabled;
        self
    }

    pub fn with_linearizer(mut self, linearizer: impl Linearizer + 'static) -> Self {
        self.linearizer = Box::new(linearizer);
        self
    }

    /// Edit `source` and write the result to `dest`.
    ///
    /// Never modifies `source`. On failure no file is left at `dest`.
    #[instrument(skip_all, fields(source = %source.display(), dest = %dest.display()))]
    pub fn process(&self, source: &Path, dest: &Path) -> ProcessingResult {
        match self.run(source, dest) {
            Ok(()) => {
                info!("Document processed");
                ProcessingResult::success(source, dest)
            }
            Err(err) => {
                warn!(step = %err.step, error = %err.source, "Document failed");
                ProcessingResult::failure(source, dest, err.to_string())
            }
        }
    }

    fn run(&self, source: &Path, dest: &Path) -> std::result::Result<(), StepError> {
        let mut doc = PdfDocument::open(source).map_err(at(EditStep::Open))?;

        doc.set_page_mode(PAGE_MODE_BOOKMARKS)
            .map_err(at(EditStep::PageMode))?;
        apply_default_layout(&mut doc).map_err(at(EditStep::Layout))?;

        let removed = doc.clear_metadata().map_err(at(EditStep::Metadata))?;
        debug!(removed, "Metadata cleared");

        self.reduce_outline(&mut doc).map_err(at(EditStep::Outline))?;

        let was_tagged = doc.remove_structure_tree().map_err(at(EditStep::Tags))?;
        debug!(was_tagged, "Structure tree removed");

        self.save(&mut doc, dest).map_err(at(EditStep::Save))
    }

    fn reduce_outline(&self, doc: &mut PdfDocument) -> Result<()> {
        let Some(mut outline) = doc.open_outline()? else {
            debug!("No outline present");
            return Ok(());
        };

        outline.reduce(self.level);
        doc.write_outline(&outline)?;

        debug!(
            top_level = outline.items.len(),
            depth = outline.depth(),
            level = %self.level,
            "Outline visibility reduced"
        );
        Ok(())
    }

    /// Write to a temporary file beside `dest`, then linearize into place or
    /// move it there.
    fn save(&self, doc: &mut PdfDocument, dest: &Path) -> Result<()> {
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".folio-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            doc.save_to(&mut writer)?;
            writer.flush()?;
        }

        if self.linearize {
            if let Err(err) = self.linearizer.linearize(staged.path(), dest) {
                // Never leave partial output at `dest`.
                let _ = std::fs::remove_file(dest);
                return Err(err);
            }
        } else {
            staged
                .persist(dest)
                .map_err(|err| FolioError::Io(err.error))?;
        }

        Ok(())
    }
}

/// Single-page layout, viewer preferences present, magnification left to
/// the viewer.
fn apply_default_layout(doc: &mut PdfDocument) -> Result<()> {
    doc.set_page_layout(DEFAULT_PAGE_LAYOUT)?;
    doc.ensure_viewer_preferences()?;
    doc.reset_open_action_zoom()?;
    Ok(())
}
