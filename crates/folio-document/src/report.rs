// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Before/after comparison report, written as CSV.
//
// Columns: PDF Name, Property, Before Processing, After Processing.
// One row per property per successfully processed file; a property missing
// on one side is reported as `N/A`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use folio_core::error::Result;
use tracing::info;

use crate::properties::DocumentProperties;

const HEADER: [&str; 4] = [
    "PDF Name",
    "Property",
    "Before Processing",
    "After Processing",
];

const MISSING: &str = "N/A";

struct ReportEntry {
    name: String,
    before: DocumentProperties,
    after: DocumentProperties,
}

/// Accumulates property snapshots for the files of one run.
#[derive(Default)]
pub struct ComparisonReport {
    entries: Vec<ReportEntry>,
}

impl ComparisonReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        before: DocumentProperties,
        after: DocumentProperties,
    ) {
        self.entries.push(ReportEntry {
            name: name.into(),
            before,
            after,
        });
    }

    /// Write the report as CSV.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_record(writer, &HEADER)?;

        for entry in &self.entries {
            for property in property_names(&entry.before, &entry.after) {
                let before = entry.before.get(property).unwrap_or(MISSING);
                let after = entry.after.get(property).unwrap_or(MISSING);
                write_record(writer, &[entry.name.as_str(), property, before, after])?;
            }
        }
        Ok(())
    }

    /// Write `processing_report_<timestamp>.csv` into `dir` and return its path.
    pub fn write_to_dir(&self, dir: &Path, at: DateTime<Local>) -> Result<PathBuf> {
        let path = dir.join(report_file_name(at));
        let mut writer = BufWriter::new(File::create(&path)?);
        self.write_csv(&mut writer)?;
        writer.flush()?;

        info!(path = %path.display(), files = self.entries.len(), "Comparison report written");
        Ok(path)
    }
}

pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("processing_report_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Property names from `before` in order, then any only present in `after`.
fn property_names<'a>(
    before: &'a DocumentProperties,
    after: &'a DocumentProperties,
) -> Vec<&'a str> {
    let mut names: Vec<&str> = before.iter().map(|(name, _)| name).collect();
    for (name, _) in after.iter() {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn write_record<W: Write>(writer: &mut W, fields: &[&str]) -> Result<()> {
    let line = fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")?;
    Ok(())
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
