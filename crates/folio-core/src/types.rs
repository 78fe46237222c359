// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio batch editor.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FolioError;

/// How many outline levels stay expanded after processing.
///
/// `0` expands every level. `N >= 1` keeps nodes shallower than `N` open and
/// collapses the rest, except that top-level nodes are always open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct BookmarkLevel(u32);

impl BookmarkLevel {
    /// Every level expanded.
    pub const ALL: Self = Self(0);
    /// Only the top level expanded (the default).
    pub const TOP_ONLY: Self = Self(1);

    /// Validate a signed level. Negative values are rejected.
    pub fn new(level: i64) -> Result<Self, FolioError> {
        if level < 0 {
            return Err(FolioError::InvalidArgument(format!(
                "bookmark level must be 0 or greater, got {level}"
            )));
        }
        u32::try_from(level).map(Self).map_err(|_| {
            FolioError::InvalidArgument(format!("bookmark level {level} is out of range"))
        })
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether a node at `depth` (top level = 1) should be left open.
    pub fn keeps_open(self, depth: usize) -> bool {
        match self.0 {
            0 => true,
            level => depth == 1 || depth < level as usize,
        }
    }

    /// Short human description used in console banners.
    pub fn describe(self) -> String {
        match self.0 {
            0 => "All levels expanded".to_string(),
            1 => "Only top-level visible".to_string(),
            n => format!("{n} levels visible"),
        }
    }
}

impl Default for BookmarkLevel {
    fn default() -> Self {
        Self::TOP_ONLY
    }
}

impl TryFrom<i64> for BookmarkLevel {
    type Error = FolioError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<BookmarkLevel> for u32 {
    fn from(level: BookmarkLevel) -> Self {
        level.0
    }
}

impl fmt::Display for BookmarkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of processing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failure,
}

/// Per-file result produced by the edit pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: FileStatus,
    /// Human-readable reason, present only on failure.
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn success(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            status: FileStatus::Success,
            error: None,
        }
    }

    pub fn failure(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            status: FileStatus::Failure,
            error: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

/// Aggregated results of one batch run.
///
/// Serializes with its counts and failure list alongside the raw results.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    results: Vec<ProcessingResult>,
    /// CSV comparison report, when one was written.
    report_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: ProcessingResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ProcessingResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Failed source paths with their reasons, in processing order.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| (r.source.as_path(), r.error.as_deref().unwrap_or("unknown error")))
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }

    pub fn set_report_path(&mut self, path: impl Into<PathBuf>) {
        self.report_path = Some(path.into());
    }
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    source: &'a Path,
    reason: &'a str,
}

impl Serialize for RunSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failures: Vec<FailureRecord<'_>> = self
            .failures()
            .map(|(source, reason)| FailureRecord { source, reason })
            .collect();

        let mut state = serializer.serialize_struct("RunSummary", 6)?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("succeeded", &self.succeeded())?;
        state.serialize_field("failed", &self.failed())?;
        state.serialize_field("failures", &failures)?;
        state.serialize_field("results", &self.results)?;
        state.serialize_field("report_path", &self.report_path)?;
        state.end()
    }
}
