// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document property snapshot for before/after comparison reports.

use std::path::Path;

use tracing::debug;

use crate::pdf::document::PdfDocument;

/// Metadata keys reported individually.
const REPORTED_INFO_KEYS: &[&str] = &["Title", "Author", "Subject", "Keywords", "Creator", "Producer"];

/// Ordered property name/value pairs describing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    entries: Vec<(String, String)>,
}

impl DocumentProperties {
    /// Inspect the PDF at `path`. A file that cannot be opened yields a
    /// single `Error` entry.
    pub fn inspect(path: impl AsRef<Path>) -> Self {
        match PdfDocument::open(path.as_ref()) {
            Ok(doc) => Self::from_document(&doc),
            Err(err) => {
                debug!(path = %path.as_ref().display(), %err, "Cannot inspect document");
                let mut properties = Self::default();
                properties.push("Error", err.to_string());
                properties
            }
        }
    }

    pub fn from_document(doc: &PdfDocument) -> Self {
        let mut properties = Self::default();

        properties.push("Fast Web View", yes_no(doc.is_linearized()));
        properties.push(
            "Page Mode",
            doc.page_mode().unwrap_or_else(|| "Not Set".into()),
        );
        properties.push(
            "Page Layout",
            doc.page_layout().unwrap_or_else(|| "Not Set".into()),
        );
        properties.push("Tagged PDF", yes_no(doc.is_tagged()));

        let metadata = doc.metadata();
        for key in REPORTED_INFO_KEYS {
            let value = metadata.get(*key).cloned().unwrap_or_else(|| "None".into());
            properties.push(key, value);
        }

        properties.push("XMP Metadata", yes_no(doc.has_xmp_metadata()));
        properties.push("Child Bookmarks", child_bookmarks(doc));

        properties
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((name.to_string(), value.into()));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Collapsed/expanded state of the first top-level bookmark's children.
fn child_bookmarks(doc: &PdfDocument) -> String {
    let first = match doc.open_outline() {
        Ok(Some(outline)) => outline.items.into_iter().next(),
        Ok(None) => None,
        Err(err) => return format!("Unreadable ({err})"),
    };

    match first {
        None => "No Bookmarks",
        Some(item) if item.children.is_empty() => "No Children",
        Some(item) if item.is_open => "Expanded",
        Some(_) => "Collapsed",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixtureBuilder, write_bytes, write_sample_pdf};
    use crate::pipeline::DocumentPipeline;
    use folio_core::BookmarkLevel;

    #[test]
    fn sample_properties_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        write_sample_pdf(&path);

        let props = DocumentProperties::inspect(&path);
        assert_eq!(props.get("Fast Web View"), Some("No"));
        assert_eq!(props.get("Page Mode"), Some("UseNone"));
        assert_eq!(props.get("Page Layout"), Some("Not Set"));
        assert_eq!(props.get("Tagged PDF"), Some("Yes"));
        assert_eq!(props.get("Title"), Some("X"));
        assert_eq!(props.get("Author"), Some("Y"));
        assert_eq!(props.get("Subject"), Some("None"));
        assert_eq!(props.get("XMP Metadata"), Some("Yes"));
        assert_eq!(props.get("Child Bookmarks"), Some("Expanded"));
    }

    #[test]
    fn properties_after_processing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sample.pdf");
        let dest = dir.path().join("processed").join("sample.pdf");
        write_sample_pdf(&source);

        let pipeline = DocumentPipeline::new(BookmarkLevel::TOP_ONLY).with_linearize(false);
        assert!(pipeline.process(&source, &dest).is_success());

        let props = DocumentProperties::inspect(&dest);
        assert_eq!(props.get("Page Mode"), Some("UseOutlines"));
        assert_eq!(props.get("Page Layout"), Some("SinglePage"));
        assert_eq!(props.get("Tagged PDF"), Some("No"));
        assert_eq!(props.get("Title"), Some("None"));
        assert_eq!(props.get("XMP Metadata"), Some("No"));
        // Top-level items stay open so their children remain listed.
        assert_eq!(props.get("Child Bookmarks"), Some("Expanded"));
    }

    #[test]
    fn no_outline_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.pdf");
        write_bytes(&path, &FixtureBuilder::new().build());

        let props = DocumentProperties::inspect(&path);
        assert_eq!(props.get("Child Bookmarks"), Some("No Bookmarks"));
    }

    #[test]
    fn unreadable_file_yields_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        write_bytes(&path, b"garbage");

        let props = DocumentProperties::inspect(&path);
        assert_eq!(props.iter().count(), 1);
        assert!(props.get("Error").is_some());
    }
}
