// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outline (bookmark) tree model and the visibility reducer.
//
// The tree is read out of the document by `PdfDocument::open_outline`, edited
// here, and written back by `PdfDocument::write_outline`. The reducer only
// ever flips `is_open`; nodes are never added, removed, or reordered.

use folio_core::BookmarkLevel;
use folio_core::error::Result;
use lopdf::ObjectId;

/// One bookmark. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub title: String,
    /// Whether the item's children are shown.
    pub is_open: bool,
    pub children: Vec<OutlineItem>,
    /// Backing outline item dictionary, when loaded from a document.
    pub(crate) object_id: Option<ObjectId>,
}

impl OutlineItem {
    /// A collapsed item with no children and no backing object.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_open: false,
            children: Vec::new(),
            object_id: None,
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineItem>) -> Self {
        self.children = children;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    /// Items that become visible when this item is expanded, counting deeper
    /// levels only through children that are themselves open.
    pub fn visible_descendants(&self) -> i64 {
        visible_count(&self.children)
    }

    /// Signed `/Count` entry for this item: positive when open, negative when
    /// closed, `None` for leaves.
    pub fn count_entry(&self) -> Option<i64> {
        if self.children.is_empty() {
            return None;
        }
        let visible = self.visible_descendants();
        Some(if self.is_open { visible } else { -visible })
    }
}

/// The document outline: the `/Outlines` dictionary and its top-level items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRoot {
    /// `None` when `/Outlines` is a direct dictionary inside the catalog.
    pub(crate) object_id: Option<ObjectId>,
    pub items: Vec<OutlineItem>,
}

impl OutlineRoot {
    pub fn object_id(&self) -> Option<ObjectId> {
        self.object_id
    }

    /// Total number of items shown in a freshly opened bookmarks panel.
    pub fn visible_count(&self) -> i64 {
        visible_count(&self.items)
    }

    /// Deepest level present (0 for an empty outline).
    pub fn depth(&self) -> usize {
        forest_depth(&self.items)
    }

    /// Apply a bookmark level to the whole forest.
    pub fn reduce(&mut self, level: BookmarkLevel) {
        apply_level(&mut self.items, level);
    }
}

/// Validate `level` and set the open state of every node in `forest`.
///
/// Negative levels fail with `InvalidArgument` before any node is touched.
pub fn reduce_visibility(forest: &mut [OutlineItem], level: i64) -> Result<()> {
    let level = BookmarkLevel::new(level)?;
    apply_level(forest, level);
    Ok(())
}

/// Set the open state of every node in `forest` for an already validated level.
pub fn apply_level(forest: &mut [OutlineItem], level: BookmarkLevel) {
    apply_at_depth(forest, 1, level);
}

fn apply_at_depth(items: &mut [OutlineItem], depth: usize, level: BookmarkLevel) {
    for item in items {
        item.is_open = level.keeps_open(depth);
        // Children are visited whether or not this node ends up open.
        apply_at_depth(&mut item.children, depth + 1, level);
    }
}

fn visible_count(items: &[OutlineItem]) -> i64 {
    items
        .iter()
        .map(|item| {
            if item.is_open {
                1 + item.visible_descendants()
            } else {
                1
            }
        })
        .sum()
}

fn forest_depth(items: &[OutlineItem]) -> usize {
    items
        .iter()
        .map(|item| 1 + forest_depth(&item.children))
        .max()
        .unwrap_or(0)
}
