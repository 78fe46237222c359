// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: opening, editing, and saving documents, plus linearization.

pub mod document;
pub mod linearize;

pub use document::PdfDocument;
pub use linearize::{Linearizer, QpdfLinearizer};
