// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document: Document processing for the Folio batch editor.
//
// Provides the lopdf-backed document wrapper, the outline visibility reducer,
// the per-file edit pipeline, property inspection for before/after reports,
// and the directory-walking batch driver.

pub mod batch;
pub mod outline;
pub mod pdf;
pub mod pipeline;
pub mod properties;
pub mod report;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the primary structs so callers can use `folio_document::PdfDocument` etc.
pub use batch::{BatchEvent, BatchRunner};
pub use outline::{OutlineItem, OutlineRoot, apply_level, reduce_visibility};
pub use pdf::document::PdfDocument;
pub use pdf::linearize::{Linearizer, QpdfLinearizer};
pub use pipeline::DocumentPipeline;
pub use properties::DocumentProperties;
