// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::types::BookmarkLevel;

/// Name of the folder edited copies are written into.
pub const DEFAULT_OUTPUT_FOLDER: &str = "processed";

/// Settings for one batch run. Missing fields in a config file take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Outline levels left expanded.
    pub bookmark_level: BookmarkLevel,
    /// Subfolder created beside each input PDF; also skipped during discovery.
    pub output_folder: String,
    /// Save with fast web view.
    pub linearize: bool,
    /// Program used for linearization.
    pub qpdf_path: PathBuf,
    /// Write the before/after CSV comparison report.
    pub write_report: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            bookmark_level: BookmarkLevel::default(),
            output_folder: DEFAULT_OUTPUT_FOLDER.to_string(),
            linearize: true,
            qpdf_path: PathBuf::from("qpdf"),
            write_report: true,
        }
    }
}

impl BatchConfig {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            FolioError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make discovery or output ambiguous.
    pub fn validate(&self) -> Result<()> {
        let name = self.output_folder.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(FolioError::Config(format!(
                "output folder must be a plain directory name, got {name:?}"
            )));
        }
        Ok(())
    }
}
