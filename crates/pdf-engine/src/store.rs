//! Default `lopdf`-backed document store.
//!
//! Parses page geometry up front, queues draw commands per page, and on save
//! appends one content-stream section per touched page. Font resources
//! (Helvetica regular + bold) and opacity graphics states are registered per
//! save call, scoped to the pages that need them.

use crate::{DocumentHandle, DocumentStore, DrawCommand, PageSize, StoreError};
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Bezier circle approximation constant (4-arc construction).
const KAPPA: f32 = 0.552_284_8;

const FONT_REGULAR: &str = "FAnno";
const FONT_BOLD: &str = "FAnnoB";

#[derive(Debug)]
struct OpenDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    page_sizes: Vec<PageSize>,
    queued: HashMap<usize, Vec<DrawCommand>>,
}

/// Document store backed by `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfStore {
    next_handle: u64,
    docs: HashMap<DocumentHandle, OpenDocument>,
}

impl LopdfStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_pages(bytes: &[u8]) -> Result<(Document, Vec<ObjectId>, Vec<PageSize>), StoreError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(StoreError::EncryptedUnsupported);
        }

        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages();
        let mut page_ids = Vec::with_capacity(pages.len());
        let mut page_sizes = Vec::with_capacity(pages.len());

        for (_, object_id) in pages {
            let dict = doc.get_dictionary(object_id)?;
            let size = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| obj.as_array().ok())
                .and_then(|array| {
                    if array.len() != 4 {
                        return None;
                    }
                    let x0 = array[0].as_float().ok()?;
                    let y0 = array[1].as_float().ok()?;
                    let x1 = array[2].as_float().ok()?;
                    let y1 = array[3].as_float().ok()?;
                    Some(PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() })
                })
                .unwrap_or(PageSize { width_pt: 612.0, height_pt: 792.0 });

            page_ids.push(object_id);
            page_sizes.push(size);
        }

        if page_ids.is_empty() {
            return Err(StoreError::Backend("document has no pages".to_owned()));
        }

        Ok((doc, page_ids, page_sizes))
    }

    fn record(&self, handle: DocumentHandle) -> Result<&OpenDocument, StoreError> {
        self.docs.get(&handle).ok_or(StoreError::InvalidHandle(handle.raw()))
    }

    fn record_mut(&mut self, handle: DocumentHandle) -> Result<&mut OpenDocument, StoreError> {
        self.docs.get_mut(&handle).ok_or(StoreError::InvalidHandle(handle.raw()))
    }
}

impl DocumentStore for LopdfStore {
    fn open(&mut self, bytes: &[u8]) -> Result<DocumentHandle, StoreError> {
        let (doc, page_ids, page_sizes) = Self::parse_pages(bytes)?;

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        debug!("opened document {} with {} page(s)", handle.raw(), page_ids.len());
        self.docs
            .insert(handle, OpenDocument { doc, page_ids, page_sizes, queued: HashMap::new() });

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<usize, StoreError> {
        Ok(self.record(handle)?.page_ids.len())
    }

    fn page_size(&self, handle: DocumentHandle, page_index: usize) -> Result<PageSize, StoreError> {
        let record = self.record(handle)?;
        record.page_sizes.get(page_index).copied().ok_or(StoreError::PageOutOfRange {
            page: page_index,
            page_count: record.page_sizes.len(),
        })
    }

    fn draw(
        &mut self,
        handle: DocumentHandle,
        page_index: usize,
        command: DrawCommand,
    ) -> Result<(), StoreError> {
        let record = self.record_mut(handle)?;
        if page_index >= record.page_ids.len() {
            return Err(StoreError::PageOutOfRange {
                page: page_index,
                page_count: record.page_ids.len(),
            });
        }

        record.queued.entry(page_index).or_default().push(command);
        Ok(())
    }

    fn save(&mut self, handle: DocumentHandle) -> Result<Vec<u8>, StoreError> {
        let record = self.record_mut(handle)?;
        let mut queued: Vec<(usize, Vec<DrawCommand>)> =
            std::mem::take(&mut record.queued).into_iter().collect();
        queued.sort_by_key(|(page_index, _)| *page_index);

        for (page_index, commands) in queued {
            let page_id = record.page_ids[page_index];
            let plan = ResourcePlan::build(&mut record.doc, page_id, &commands)?;

            let mut operations = Vec::new();
            for command in &commands {
                append_operations(&mut operations, command, &plan);
            }

            let addition = Content { operations }
                .encode()
                .map_err(|err| StoreError::Backend(err.to_string()))?;

            let mut content = record.doc.get_page_content(page_id)?;
            content.push(b'\n');
            content.extend_from_slice(&addition);
            record.doc.change_page_content(page_id, content)?;
            debug!("composited page {}", page_index);
        }

        let mut bytes = Vec::new();
        record.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), StoreError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(StoreError::InvalidHandle(handle.raw()))
    }
}

/// Per-page resource registrations for one save call.
struct ResourcePlan {
    /// Unique fill opacities, indexed by the graphics-state name suffix.
    opacities: Vec<f32>,
}

impl ResourcePlan {
    fn build(
        doc: &mut Document,
        page_id: ObjectId,
        commands: &[DrawCommand],
    ) -> Result<Self, StoreError> {
        let mut needs_regular = false;
        let mut needs_bold = false;
        let mut opacities: Vec<f32> = Vec::new();

        for command in commands {
            match command {
                DrawCommand::Text { bold, .. } => {
                    if *bold {
                        needs_bold = true;
                    } else {
                        needs_regular = true;
                    }
                }
                DrawCommand::Rect { fill: Some(fill), .. } if fill.opacity < 1.0 => {
                    if !opacities.iter().any(|known| (known - fill.opacity).abs() < 1e-6) {
                        opacities.push(fill.opacity);
                    }
                }
                _ => {}
            }
        }

        let font_regular = needs_regular.then(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            })
        });
        let font_bold = needs_bold.then(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica-Bold",
            })
        });
        let gstates: Vec<ObjectId> = opacities
            .iter()
            .map(|opacity| {
                doc.add_object(dictionary! {
                    "Type" => "ExtGState",
                    "ca" => Object::Real(*opacity),
                    "CA" => Object::Real(*opacity),
                })
            })
            .collect();

        if font_regular.is_some() || font_bold.is_some() || !gstates.is_empty() {
            let resources = page_resources_mut(doc, page_id)?;

            if font_regular.is_some() || font_bold.is_some() {
                let fonts = nested_dict_mut(resources, b"Font");
                if let Some(id) = font_regular {
                    fonts.set(FONT_REGULAR, id);
                }
                if let Some(id) = font_bold {
                    fonts.set(FONT_BOLD, id);
                }
            }

            if !gstates.is_empty() {
                let states = nested_dict_mut(resources, b"ExtGState");
                for (index, id) in gstates.iter().enumerate() {
                    states.set(gs_name(index), *id);
                }
            }
        }

        Ok(Self { opacities })
    }

    fn gs_for(&self, opacity: f32) -> Option<String> {
        self.opacities
            .iter()
            .position(|known| (known - opacity).abs() < 1e-6)
            .map(gs_name)
    }
}

fn gs_name(index: usize) -> String {
    format!("GSAnno{}", index)
}

/// Resolve the page's Resources entry to a mutable dictionary.
///
/// A page without a direct entry may inherit Resources from an ancestor
/// Pages node; writing a fresh direct dictionary would shadow the inherited
/// one and break the page's own named resources. Such pages get a copy of
/// the inherited dictionary first, then our entries are added to it.
fn page_resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, StoreError> {
    let resources_ref = doc
        .get_dictionary(page_id)?
        .get(b"Resources")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    if let Some(id) = resources_ref {
        return Ok(doc.get_object_mut(id)?.as_dict_mut()?);
    }

    let has_direct =
        matches!(doc.get_dictionary(page_id)?.get(b"Resources"), Ok(Object::Dictionary(_)));
    if !has_direct {
        let inherited = inherited_resources(doc, page_id)?.unwrap_or_else(Dictionary::new);
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Resources", inherited);
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    Ok(page.get_mut(b"Resources")?.as_dict_mut()?)
}

/// Walk the Parent chain and return a copy of the nearest Resources entry.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Option<Dictionary>, StoreError> {
    let mut current = doc
        .get_dictionary(page_id)?
        .get(b"Parent")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    while let Some(node_id) = current {
        let node = doc.get_dictionary(node_id)?;
        match node.get(b"Resources") {
            Ok(Object::Reference(resources_id)) => {
                return Ok(Some(doc.get_dictionary(*resources_id)?.clone()));
            }
            Ok(Object::Dictionary(resources)) => return Ok(Some(resources.clone())),
            _ => {}
        }
        current = node.get(b"Parent").ok().and_then(|obj| obj.as_reference().ok());
    }
    Ok(None)
}

fn nested_dict_mut<'a>(dict: &'a mut Dictionary, key: &[u8]) -> &'a mut Dictionary {
    if !matches!(dict.get(key), Ok(Object::Dictionary(_))) {
        dict.set(key, Dictionary::new());
    }
    match dict.get_mut(key) {
        Ok(Object::Dictionary(nested)) => nested,
        // Unreachable: the entry was just set to a dictionary above.
        _ => unreachable!("resource entry must be a dictionary"),
    }
}

fn append_operations(operations: &mut Vec<Operation>, command: &DrawCommand, plan: &ResourcePlan) {
    match command {
        DrawCommand::Text { x, y, size, color, content, bold } => {
            let font = if *bold { FONT_BOLD } else { FONT_REGULAR };
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "rg",
                vec![color.r.into(), color.g.into(), color.b.into()],
            ));
            operations.push(Operation::new("Tf", vec![Object::Name(font.into()), (*size).into()]));
            operations.push(Operation::new("TL", vec![(size * 1.2).into()]));
            operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            for (index, line) in content.split('\n').enumerate() {
                if index > 0 {
                    operations.push(Operation::new("T*", vec![]));
                }
                operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            }
            operations.push(Operation::new("ET", vec![]));
            operations.push(Operation::new("Q", vec![]));
        }

        DrawCommand::Rect { x, y, width, height, rotation_rad, color, stroke_width, fill } => {
            operations.push(Operation::new("q", vec![]));
            match fill {
                Some(fill) => {
                    if let Some(name) = plan.gs_for(fill.opacity) {
                        operations.push(Operation::new("gs", vec![Object::Name(name.into())]));
                    }
                    operations.push(Operation::new(
                        "rg",
                        vec![fill.color.r.into(), fill.color.g.into(), fill.color.b.into()],
                    ));
                }
                None => {
                    operations.push(Operation::new(
                        "RG",
                        vec![color.r.into(), color.g.into(), color.b.into()],
                    ));
                    operations.push(Operation::new("w", vec![(*stroke_width).into()]));
                }
            }

            if rotation_rad.abs() > f32::EPSILON {
                let (sin, cos) = rotation_rad.sin_cos();
                operations.push(Operation::new(
                    "cm",
                    vec![cos.into(), sin.into(), (-sin).into(), cos.into(), (*x).into(), (*y).into()],
                ));
                operations.push(Operation::new(
                    "re",
                    vec![0.0_f32.into(), 0.0_f32.into(), (*width).into(), (*height).into()],
                ));
            } else {
                operations.push(Operation::new(
                    "re",
                    vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
                ));
            }

            let paint = if fill.is_some() { "f" } else { "S" };
            operations.push(Operation::new(paint, vec![]));
            operations.push(Operation::new("Q", vec![]));
        }

        DrawCommand::Circle { cx, cy, radius, color, stroke_width } => {
            let r = *radius;
            let k = r * KAPPA;
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "RG",
                vec![color.r.into(), color.g.into(), color.b.into()],
            ));
            operations.push(Operation::new("w", vec![(*stroke_width).into()]));
            operations.push(Operation::new("m", vec![(cx + r).into(), (*cy).into()]));
            operations.push(Operation::new(
                "c",
                vec![
                    (cx + r).into(),
                    (cy + k).into(),
                    (cx + k).into(),
                    (cy + r).into(),
                    (*cx).into(),
                    (cy + r).into(),
                ],
            ));
            operations.push(Operation::new(
                "c",
                vec![
                    (cx - k).into(),
                    (cy + r).into(),
                    (cx - r).into(),
                    (cy + k).into(),
                    (cx - r).into(),
                    (*cy).into(),
                ],
            ));
            operations.push(Operation::new(
                "c",
                vec![
                    (cx - r).into(),
                    (cy - k).into(),
                    (cx - k).into(),
                    (cy - r).into(),
                    (*cx).into(),
                    (cy - r).into(),
                ],
            ));
            operations.push(Operation::new(
                "c",
                vec![
                    (cx + k).into(),
                    (cy - r).into(),
                    (cx + r).into(),
                    (cy - k).into(),
                    (cx + r).into(),
                    (*cy).into(),
                ],
            ));
            operations.push(Operation::new("s", vec![]));
            operations.push(Operation::new("Q", vec![]));
        }
    }
}

/// Build a minimal valid document with `page_count` empty pages.
///
/// Used by integration tests and demos in place of an on-disk fixture.
pub fn blank_document(
    width_pt: f32,
    height_pt: f32,
    page_count: usize,
) -> Result<Vec<u8>, StoreError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);

    for _ in 0..page_count.max(1) {
        let content = Content { operations: Vec::new() }
            .encode()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width_pt),
                Object::Real(height_pt),
            ],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FillStyle, Rgb};

    fn sample_bytes() -> Vec<u8> {
        blank_document(612.0, 792.0, 2).expect("fixture should build")
    }

    fn open_sample(store: &mut LopdfStore) -> DocumentHandle {
        store.open(&sample_bytes()).expect("open should succeed")
    }

    #[test]
    fn opens_document_and_reads_page_geometry() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        assert_eq!(store.page_count(handle).expect("count should succeed"), 2);

        let size = store.page_size(handle, 0).expect("size should succeed");
        assert!((size.width_pt - 612.0).abs() < 0.01);
        assert!((size.height_pt - 792.0).abs() < 0.01);
    }

    #[test]
    fn page_size_out_of_range_is_rejected() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        let err = store.page_size(handle, 9).expect_err("page 9 should be out of range");
        assert!(matches!(err, StoreError::PageOutOfRange { page: 9, page_count: 2 }));
    }

    #[test]
    fn invalid_handle_is_rejected() {
        let store = LopdfStore::new();
        let err = store.page_count(DocumentHandle(42)).expect_err("unknown handle should fail");
        assert!(matches!(err, StoreError::InvalidHandle(42)));
    }

    #[test]
    fn encrypted_document_is_rejected() {
        let mut store = LopdfStore::new();
        let err = store.open(b"%PDF-1.5 /Encrypt garbage").expect_err("should reject");
        assert!(matches!(err, StoreError::EncryptedUnsupported));
    }

    #[test]
    fn save_appends_draw_commands_to_page_content() {
        let mut store = LopdfStore::new();
        let input = sample_bytes();
        let handle = store.open(&input).expect("open should succeed");

        store
            .draw(
                handle,
                0,
                DrawCommand::Rect {
                    x: 10.0,
                    y: 20.0,
                    width: 100.0,
                    height: 50.0,
                    rotation_rad: 0.0,
                    color: Rgb::new(1.0, 0.0, 0.0),
                    stroke_width: 2.0,
                    fill: None,
                },
            )
            .expect("draw should queue");

        let saved = store.save(handle).expect("save should succeed");
        assert_ne!(saved, input);

        let doc = Document::load_mem(&saved).expect("output should re-parse");
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 2);

        let content = doc.get_page_content(pages[0]).expect("content should read");
        let decoded = Content::decode(&content).expect("content should decode");
        let operators: Vec<&str> =
            decoded.operations.iter().map(|op| op.operator.as_str()).collect();
        assert!(operators.contains(&"re"));
        assert!(operators.contains(&"S"));
    }

    #[test]
    fn drawing_to_missing_page_fails() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        let err = store
            .draw(
                handle,
                7,
                DrawCommand::Circle {
                    cx: 0.0,
                    cy: 0.0,
                    radius: 1.0,
                    color: Rgb::new(0.0, 0.0, 0.0),
                    stroke_width: 1.0,
                },
            )
            .expect_err("page 7 should be out of range");
        assert!(matches!(err, StoreError::PageOutOfRange { page: 7, .. }));
    }

    #[test]
    fn text_registers_font_resources() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        store
            .draw(
                handle,
                0,
                DrawCommand::Text {
                    x: 50.0,
                    y: 700.0,
                    size: 12.0,
                    color: Rgb::new(0.0, 0.0, 0.0),
                    content: "note".to_owned(),
                    bold: true,
                },
            )
            .expect("draw should queue");

        let saved = store.save(handle).expect("save should succeed");
        let doc = Document::load_mem(&saved).expect("output should re-parse");
        let page_id = doc.get_pages().into_values().next().expect("page expected");
        let page = doc.get_dictionary(page_id).expect("page dict expected");
        let resources = page
            .get(b"Resources")
            .and_then(|obj| obj.as_dict())
            .expect("resources dict expected");
        let fonts = resources.get(b"Font").and_then(|obj| obj.as_dict()).expect("font dict");
        assert!(fonts.has(FONT_BOLD.as_bytes()));
        assert!(!fonts.has(FONT_REGULAR.as_bytes()));
    }

    #[test]
    fn translucent_fill_registers_ext_g_state() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        store
            .draw(
                handle,
                1,
                DrawCommand::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 40.0,
                    height: 10.0,
                    rotation_rad: 0.0,
                    color: Rgb::new(1.0, 1.0, 0.0),
                    stroke_width: 0.0,
                    fill: Some(FillStyle { color: Rgb::new(1.0, 1.0, 0.0), opacity: 0.3 }),
                },
            )
            .expect("draw should queue");

        let saved = store.save(handle).expect("save should succeed");
        let doc = Document::load_mem(&saved).expect("output should re-parse");
        let page_id = doc.get_pages().into_values().nth(1).expect("second page expected");
        let page = doc.get_dictionary(page_id).expect("page dict expected");
        let resources = page
            .get(b"Resources")
            .and_then(|obj| obj.as_dict())
            .expect("resources dict expected");
        assert!(resources.has(b"ExtGState"));
    }

    /// One page inheriting `/F1` from the Pages-node Resources entry.
    fn inherited_resources_bytes() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let pages_id = doc.new_object_id();
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, b"BT /F1 12 Tf ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(612.0), Object::Real(792.0)],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("fixture should serialize");
        bytes
    }

    #[test]
    fn inherited_resources_survive_resource_registration() {
        let mut store = LopdfStore::new();
        let handle =
            store.open(&inherited_resources_bytes()).expect("open should succeed");

        store
            .draw(
                handle,
                0,
                DrawCommand::Text {
                    x: 50.0,
                    y: 700.0,
                    size: 12.0,
                    color: Rgb::new(0.0, 0.0, 0.0),
                    content: "note".to_owned(),
                    bold: false,
                },
            )
            .expect("draw should queue");

        let saved = store.save(handle).expect("save should succeed");
        let doc = Document::load_mem(&saved).expect("output should re-parse");
        let page_id = doc.get_pages().into_values().next().expect("page expected");
        let page = doc.get_dictionary(page_id).expect("page dict expected");
        let resources = page
            .get(b"Resources")
            .and_then(|obj| obj.as_dict())
            .expect("direct resources expected");
        let fonts = resources.get(b"Font").and_then(|obj| obj.as_dict()).expect("font dict");

        // The inherited /F1 must still resolve from the page alongside ours.
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(FONT_REGULAR.as_bytes()));
    }

    #[test]
    fn io_errors_convert_into_store_errors() {
        let err: StoreError =
            std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn save_without_commands_round_trips() {
        let mut store = LopdfStore::new();
        let handle = open_sample(&mut store);

        let saved = store.save(handle).expect("save should succeed");
        let doc = Document::load_mem(&saved).expect("output should re-parse");
        assert_eq!(doc.get_pages().len(), 2);
    }
}
