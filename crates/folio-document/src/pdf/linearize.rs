// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Linearization (fast web view).
//
// lopdf writes a single classic cross-reference table and cannot produce the
// linearized layout, so the final rewrite is handed to an external tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use folio_core::error::{FolioError, Result};
use tracing::{debug, instrument};

/// qpdf exit status meaning "succeeded, but printed warnings".
const QPDF_EXIT_WARNINGS: i32 = 3;

/// Rewrites a finished PDF at `input` into a linearized file at `output`.
pub trait Linearizer {
    fn linearize(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Linearizer backed by the `qpdf` command-line tool.
#[derive(Debug, Clone)]
pub struct QpdfLinearizer {
    program: PathBuf,
}

impl QpdfLinearizer {
    /// Use `program` (a path or a name looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for QpdfLinearizer {
    fn default() -> Self {
        Self::new("qpdf")
    }
}

impl Linearizer for QpdfLinearizer {
    #[instrument(skip(self), fields(program = %self.program.display()))]
    fn linearize(&self, input: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .arg("--linearize")
            .arg(input)
            .arg(output)
            .output()
            .map_err(|err| {
                FolioError::Linearize(format!(
                    "failed to execute {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        match result.status.code() {
            Some(0) => Ok(()),
            Some(QPDF_EXIT_WARNINGS) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&result.stderr).trim(),
                    "qpdf finished with warnings"
                );
                Ok(())
            }
            code => Err(FolioError::Linearize(format!(
                "{} failed (exit code {}): {}",
                self.program.display(),
                code.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                String::from_utf8_lossy(&result.stderr).trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_linearize_error() {
        let dir = tempfile::tempdir().unwrap();
        let linearizer = QpdfLinearizer::new(dir.path().join("no-such-qpdf"));
        let err = linearizer
            .linearize(&dir.path().join("in.pdf"), &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, FolioError::Linearize(_)));
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[test]
    fn default_program_is_qpdf() {
        assert_eq!(QpdfLinearizer::default().program(), Path::new("qpdf"));
    }
}
