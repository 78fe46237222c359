// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: small PDFs assembled with lopdf.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

const XMP_PACKET: &[u8] = br#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>X</dc:title></rdf:Description>
</rdf:RDF></x:xmpmeta>
<?xpacket end="w"?>"#;

/// Outline shape used by fixtures.
pub(crate) struct Node {
    title: &'static str,
    children: Vec<Node>,
}

pub(crate) fn node(title: &'static str, children: Vec<Node>) -> Node {
    Node { title, children }
}

/// Two top-level parts, three levels deep.
pub(crate) fn three_level_outline() -> Vec<Node> {
    vec![
        node(
            "Part A",
            vec![
                node("A.1", vec![node("A.1.a", vec![]), node("A.1.b", vec![])]),
                node("A.2", vec![]),
            ],
        ),
        node("Part B", vec![node("B.1", vec![node("B.1.a", vec![])])]),
    ]
}

/// Four levels deep along one branch.
pub(crate) fn four_level_outline() -> Vec<Node> {
    vec![
        node(
            "One",
            vec![node("Two", vec![node("Three", vec![node("Four", vec![])])])],
        ),
        node("Other", vec![node("Other.1", vec![])]),
    ]
}

/// Title "X", author "Y", a three-level expanded outline, tags and XMP.
pub(crate) fn sample_pdf() -> Vec<u8> {
    FixtureBuilder::new()
        .with_info("Title", "X")
        .with_info("Author", "Y")
        .with_outline(three_level_outline())
        .tagged()
        .with_xmp()
        .build()
}

pub(crate) fn write_sample_pdf(path: &Path) {
    write_bytes(path, &sample_pdf());
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

#[derive(Default)]
pub(crate) struct FixtureBuilder {
    info: Vec<(&'static str, &'static str)>,
    outline: Option<Vec<Node>>,
    tagged: bool,
    xmp: bool,
    zoomed_open_action: bool,
    inline_outline: bool,
}

impl FixtureBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_info(mut self, key: &'static str, value: &'static str) -> Self {
        self.info.push((key, value));
        self
    }

    pub(crate) fn with_outline(mut self, outline: Vec<Node>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub(crate) fn tagged(mut self) -> Self {
        self.tagged = true;
        self
    }

    pub(crate) fn with_xmp(mut self) -> Self {
        self.xmp = true;
        self
    }

    pub(crate) fn with_zoomed_open_action(mut self) -> Self {
        self.zoomed_open_action = true;
        self
    }

    /// Embed `/Outlines` directly in the catalog instead of as an object.
    pub(crate) fn inline_outline(mut self) -> Self {
        self.inline_outline = true;
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let catalog_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT ET".to_vec()));

        let mut page = Dictionary::new();
        page.set("Type", name("Page"));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        if self.tagged {
            page.set("StructParents", Object::Integer(0));
        }
        let page_id = doc.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", name("Pages"));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", Object::Reference(pages_id));
        catalog.set("PageMode", name("UseNone"));

        if let Some(outline) = &self.outline {
            let outlines_id = if self.inline_outline {
                catalog_id
            } else {
                doc.new_object_id()
            };
            let (first, last, visible) = add_outline_items(&mut doc, outlines_id, outline);
            let mut outlines = Dictionary::new();
            outlines.set("Type", name("Outlines"));
            if let (Some(first), Some(last)) = (first, last) {
                outlines.set("First", Object::Reference(first));
                outlines.set("Last", Object::Reference(last));
                outlines.set("Count", Object::Integer(visible));
            }
            if self.inline_outline {
                catalog.set("Outlines", Object::Dictionary(outlines));
            } else {
                doc.objects.insert(outlines_id, Object::Dictionary(outlines));
                catalog.set("Outlines", Object::Reference(outlines_id));
            }
        }

        if self.tagged {
            let mut mark_info = Dictionary::new();
            mark_info.set("Marked", Object::Boolean(true));
            catalog.set("MarkInfo", Object::Dictionary(mark_info));

            let mut struct_tree = Dictionary::new();
            struct_tree.set("Type", name("StructTreeRoot"));
            let struct_tree_id = doc.add_object(struct_tree);
            catalog.set("StructTreeRoot", Object::Reference(struct_tree_id));
        }

        if self.xmp {
            let mut xmp_dict = Dictionary::new();
            xmp_dict.set("Type", name("Metadata"));
            xmp_dict.set("Subtype", name("XML"));
            let xmp_id = doc.add_object(Stream::new(xmp_dict, XMP_PACKET.to_vec()));
            catalog.set("Metadata", Object::Reference(xmp_id));
        }

        if self.zoomed_open_action {
            catalog.set(
                "OpenAction",
                Object::Array(vec![
                    Object::Reference(page_id),
                    name("XYZ"),
                    Object::Integer(0),
                    Object::Integer(842),
                    Object::Real(2.5),
                ]),
            );
        }

        doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in &self.info {
                info.set(*key, Object::string_literal(*value));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        let mut output = Vec::new();
        doc.save_to(&mut output).unwrap();
        output
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Add `nodes` as siblings under `parent_id`. Items with children start
/// expanded. Returns the first and last sibling ids and the number of items
/// visible under the parent.
fn add_outline_items(
    doc: &mut Document,
    parent_id: ObjectId,
    nodes: &[Node],
) -> (Option<ObjectId>, Option<ObjectId>, i64) {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();
    let mut visible = 0;

    for (index, node) in nodes.iter().enumerate() {
        let id = ids[index];
        let (first, last, below) = add_outline_items(doc, id, &node.children);

        let mut item = Dictionary::new();
        item.set("Title", Object::string_literal(node.title));
        item.set("Parent", Object::Reference(parent_id));
        if index > 0 {
            item.set("Prev", Object::Reference(ids[index - 1]));
        }
        if let Some(next) = ids.get(index + 1) {
            item.set("Next", Object::Reference(*next));
        }
        if let (Some(first), Some(last)) = (first, last) {
            item.set("First", Object::Reference(first));
            item.set("Last", Object::Reference(last));
            item.set("Count", Object::Integer(below));
        }
        doc.objects.insert(id, Object::Dictionary(item));

        visible += 1 + below;
    }

    (ids.first().copied(), ids.last().copied(), visible)
}
