// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF document: open, inspect, edit, and save existing PDF documents using
// the `lopdf` crate.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

use crate::outline::{OutlineItem, OutlineRoot};

/// Outlines nested deeper than this are treated as malformed.
const MAX_OUTLINE_DEPTH: usize = 256;

/// Trailer keys left over from cross-reference streams and incremental
/// updates. The document is always written back with a single classic table.
const STALE_TRAILER_KEYS: &[&[u8]] = &[
    b"Type",
    b"W",
    b"Index",
    b"Filter",
    b"DecodeParms",
    b"Length",
    b"Prev",
    b"XRefStm",
];

/// Convert a `lopdf::Error` into a `FolioError::PdfError`.
fn pdf_err(err: lopdf::Error) -> FolioError {
    FolioError::PdfError(err.to_string())
}

/// An opened PDF, edited in place and consumed by one save.
///
/// Wraps `lopdf::Document` and exposes the handful of catalog, trailer, and
/// outline operations the edit pipeline needs.
pub struct PdfDocument {
    document: Document,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    ///
    /// Encrypted documents are refused; Folio never writes encrypted output.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        Self::from_document(document)
    }

    /// Create a document from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;
        Self::from_document(document)
    }

    fn from_document(document: Document) -> Result<Self> {
        if document.is_encrypted() {
            return Err(FolioError::PdfError("document is encrypted".into()));
        }
        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Whether the file carries a linearization parameter dictionary.
    pub fn is_linearized(&self) -> bool {
        self.document
            .objects
            .values()
            .any(|obj| matches!(obj, Object::Dictionary(dict) if dict.has(b"Linearized")))
    }

    /// The catalog's `/PageMode`, if set.
    pub fn page_mode(&self) -> Option<String> {
        self.catalog_name(b"PageMode")
    }

    /// The catalog's `/PageLayout`, if set.
    pub fn page_layout(&self) -> Option<String> {
        self.catalog_name(b"PageLayout")
    }

    /// Whether the catalog declares tagged structure.
    pub fn is_tagged(&self) -> bool {
        self.catalog()
            .map(|catalog| catalog.has(b"MarkInfo") || catalog.has(b"StructTreeRoot"))
            .unwrap_or(false)
    }

    /// Whether the catalog references an XMP metadata stream.
    pub fn has_xmp_metadata(&self) -> bool {
        self.catalog()
            .map(|catalog| catalog.has(b"Metadata"))
            .unwrap_or(false)
    }

    /// Document information entries (`/Title`, `/Author`, ...) decoded to text.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let Some(info) = self.info_dictionary() else {
            return BTreeMap::new();
        };

        info.iter()
            .filter_map(|(key, value)| {
                let resolved = self.resolve(value).ok()?;
                let text = match resolved {
                    Object::String(..) => text_string(resolved)?,
                    Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                    Object::Integer(number) => number.to_string(),
                    _ => return None,
                };
                Some((String::from_utf8_lossy(key).into_owned(), text))
            })
            .collect()
    }

    // -- Catalog edits --------------------------------------------------------

    /// Set the catalog's `/PageMode` (e.g. `UseOutlines`).
    pub fn set_page_mode(&mut self, mode: &str) -> Result<()> {
        self.catalog_mut()?
            .set("PageMode", Object::Name(mode.as_bytes().to_vec()));
        Ok(())
    }

    /// Set the catalog's `/PageLayout` (e.g. `SinglePage`).
    pub fn set_page_layout(&mut self, layout: &str) -> Result<()> {
        self.catalog_mut()?
            .set("PageLayout", Object::Name(layout.as_bytes().to_vec()));
        Ok(())
    }

    /// Make sure the catalog has a `/ViewerPreferences` dictionary.
    pub fn ensure_viewer_preferences(&mut self) -> Result<()> {
        let catalog = self.catalog_mut()?;
        if !catalog.has(b"ViewerPreferences") {
            catalog.set("ViewerPreferences", Object::Dictionary(Dictionary::new()));
        }
        Ok(())
    }

    /// Replace an explicit zoom in the catalog's `/OpenAction` destination
    /// with `/XYZ null null null`, which leaves magnification to the viewer.
    ///
    /// Handles a bare destination array and a `/GoTo` action, inline or
    /// indirect. Named destinations and other actions are left alone.
    /// Returns whether anything changed.
    pub fn reset_open_action_zoom(&mut self) -> Result<bool> {
        let open_action = match self.catalog()?.get(b"OpenAction") {
            Ok(action) => action.clone(),
            Err(_) => return Ok(false),
        };

        let changed = match open_action {
            Object::Reference(id) => {
                let target = self.document.get_object_mut(id).map_err(pdf_err)?;
                reset_destination_zoom(target)
            }
            mut inline => {
                let changed = reset_destination_zoom(&mut inline);
                if changed {
                    self.catalog_mut()?.set("OpenAction", inline);
                }
                changed
            }
        };

        if changed {
            debug!("Reset /OpenAction magnification to viewer default");
        }
        Ok(changed)
    }

    /// Remove the trailer `/Info` dictionary and the catalog `/Metadata` XMP
    /// stream. Returns whether anything was removed.
    pub fn clear_metadata(&mut self) -> Result<bool> {
        let mut removed = false;

        if let Some(info) = self.document.trailer.remove(b"Info") {
            if let Object::Reference(id) = info {
                self.document.objects.remove(&id);
            }
            removed = true;
        }

        if let Some(xmp) = self.catalog_mut()?.remove(b"Metadata") {
            if let Object::Reference(id) = xmp {
                self.document.objects.remove(&id);
            }
            removed = true;
        }

        Ok(removed)
    }

    /// Remove `/StructTreeRoot` and `/MarkInfo` from the catalog and
    /// `/StructParents` from every page. Returns whether the catalog was tagged.
    pub fn remove_structure_tree(&mut self) -> Result<bool> {
        let catalog = self.catalog_mut()?;
        let had_tree = catalog.remove(b"StructTreeRoot").is_some();
        let had_marks = catalog.remove(b"MarkInfo").is_some();

        let page_ids: Vec<ObjectId> = self.document.get_pages().into_values().collect();
        for page_id in page_ids {
            if let Ok(page) = self.document.get_dictionary_mut(page_id) {
                page.remove(b"StructParents");
            }
        }

        Ok(had_tree || had_marks)
    }

    // -- Outline --------------------------------------------------------------

    /// Read the bookmark tree. `Ok(None)` when the document has no outline.
    ///
    /// An item's open state is taken from the sign of its `/Count`. Cycles in
    /// the `/First`/`/Next` chain and absurd nesting are reported as errors.
    pub fn open_outline(&self) -> Result<Option<OutlineRoot>> {
        let (root, root_id) = match self.catalog()?.get(b"Outlines") {
            Ok(Object::Reference(id)) => {
                let root = self.document.get_dictionary(*id).map_err(|err| {
                    FolioError::Outline(format!("cannot read outline root: {}", err))
                })?;
                (root, Some(*id))
            }
            Ok(Object::Dictionary(root)) => (root, None),
            Ok(_) => {
                warn!("/Outlines is not a dictionary, ignoring outline");
                return Ok(None);
            }
            Err(_) => return Ok(None),
        };

        let mut visited: HashSet<ObjectId> = root_id.into_iter().collect();
        let items = self.read_outline_level(root, 1, &mut visited)?;

        Ok(Some(OutlineRoot {
            object_id: root_id,
            items,
        }))
    }

    /// Write every item's `/Count` back from its open state, and the root's
    /// total visible count.
    pub fn write_outline(&mut self, outline: &OutlineRoot) -> Result<()> {
        for item in &outline.items {
            self.write_outline_item(item)?;
        }

        let visible = outline.visible_count();
        let root = match outline.object_id {
            Some(id) => self.document.get_dictionary_mut(id).map_err(|err| {
                FolioError::Outline(format!("cannot update outline root: {}", err))
            })?,
            None => match self.catalog_mut()?.get_mut(b"Outlines") {
                Ok(Object::Dictionary(root)) => root,
                _ => {
                    return Err(FolioError::Outline(
                        "inline outline root is no longer in the catalog".into(),
                    ));
                }
            },
        };
        if visible > 0 {
            root.set("Count", Object::Integer(visible));
        } else {
            root.remove(b"Count");
        }
        Ok(())
    }

    fn read_outline_level(
        &self,
        parent: &Dictionary,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Result<Vec<OutlineItem>> {
        if depth > MAX_OUTLINE_DEPTH {
            return Err(FolioError::Outline(format!(
                "outline nested deeper than {MAX_OUTLINE_DEPTH} levels"
            )));
        }

        let mut items = Vec::new();
        let mut next = reference_entry(parent, b"First");

        while let Some(id) = next {
            if !visited.insert(id) {
                return Err(FolioError::Outline(format!(
                    "outline item {} {} R is reachable twice",
                    id.0, id.1
                )));
            }

            let dict = self.document.get_dictionary(id).map_err(|err| {
                FolioError::Outline(format!("cannot read outline item {} {} R: {}", id.0, id.1, err))
            })?;

            let title = dict
                .get(b"Title")
                .ok()
                .and_then(|title| self.resolve(title).ok())
                .and_then(|title| text_string(title))
                .unwrap_or_default();
            let count = dict
                .get(b"Count")
                .ok()
                .and_then(|count| count.as_i64().ok())
                .unwrap_or(0);

            let children = self.read_outline_level(dict, depth + 1, visited)?;
            items.push(OutlineItem {
                title,
                is_open: count > 0,
                children,
                object_id: Some(id),
            });

            next = reference_entry(dict, b"Next");
        }

        Ok(items)
    }

    fn write_outline_item(&mut self, item: &OutlineItem) -> Result<()> {
        let id = item.object_id.ok_or_else(|| {
            FolioError::Outline(format!("outline item {:?} has no backing object", item.title))
        })?;

        let dict = self.document.get_dictionary_mut(id).map_err(|err| {
            FolioError::Outline(format!("cannot update outline item {} {} R: {}", id.0, id.1, err))
        })?;
        match item.count_entry() {
            Some(count) => {
                dict.set("Count", Object::Integer(count));
            }
            None => {
                dict.remove(b"Count");
            }
        }

        for child in &item.children {
            self.write_outline_item(child)?;
        }
        Ok(())
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the document, dropping objects no longer reachable after
    /// the edits (old `/Info`, XMP, structure tree).
    #[instrument(skip_all)]
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        for &key in STALE_TRAILER_KEYS {
            self.document.trailer.remove(key);
        }

        let pruned = self.document.prune_objects();
        debug!(pruned = pruned.len(), "Pruned unreachable objects");

        self.document.save_to(writer).map_err(|err| {
            FolioError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        Ok(())
    }

    /// Serialise the document into a byte vector.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.save_to(&mut output)?;
        info!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    // -- Helpers --------------------------------------------------------------

    fn catalog_id(&self) -> Result<ObjectId> {
        match self.document.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => Ok(*id),
            Ok(_) => Err(FolioError::PdfError("/Root is not a reference".into())),
            Err(err) => Err(FolioError::PdfError(format!("no catalog: {}", err))),
        }
    }

    fn catalog(&self) -> Result<&Dictionary> {
        let id = self.catalog_id()?;
        self.document.get_dictionary(id).map_err(pdf_err)
    }

    fn catalog_mut(&mut self) -> Result<&mut Dictionary> {
        let id = self.catalog_id()?;
        self.document.get_dictionary_mut(id).map_err(pdf_err)
    }

    fn catalog_name(&self, key: &[u8]) -> Option<String> {
        let value = self.catalog().ok()?.get(key).ok()?;
        match self.resolve(value).ok()? {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        let info = self.document.trailer.get(b"Info").ok()?;
        match self.resolve(info).ok()? {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Follow a single level of indirection.
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).map_err(pdf_err),
            direct => Ok(direct),
        }
    }
}

/// `/First`, `/Next` and friends: an indirect reference or nothing.
fn reference_entry(dict: &Dictionary, key: &[u8]) -> Option<ObjectId> {
    match dict.get(key) {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

/// Rewrite a destination array, or the `/D` of a `/GoTo` action, to
/// `[page /XYZ null null null]`.
fn reset_destination_zoom(object: &mut Object) -> bool {
    match object {
        Object::Array(destination) => reset_destination_array(destination),
        Object::Dictionary(action) => {
            let is_goto = matches!(action.get(b"S"), Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo");
            if !is_goto {
                return false;
            }
            match action.get_mut(b"D") {
                Ok(Object::Array(destination)) => reset_destination_array(destination),
                _ => false,
            }
        }
        _ => false,
    }
}

fn reset_destination_array(destination: &mut Vec<Object>) -> bool {
    let Some(page) = destination.first().cloned() else {
        return false;
    };
    *destination = vec![
        page,
        Object::Name(b"XYZ".to_vec()),
        Object::Null,
        Object::Null,
        Object::Null,
    ];
    true
}

/// Decode a PDF text string (PDFDocEncoding, UTF-16BE or UTF-8). Bytes
/// lopdf cannot decode are kept as lossy UTF-8.
fn text_string(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(
            lopdf::decode_text_string(object)
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        ),
        _ => None,
    }
}
