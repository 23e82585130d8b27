//! PDF document collaborators for the annotation engine.
//!
//! Exposes the two narrow interfaces the annotation core composes against:
//! [`DocumentStore`] (open a byte stream, queue draw commands against pages,
//! serialize a new byte stream) and [`PageRenderer`] (raster placeholder used
//! to size the interactive canvas). The default store is built on `lopdf`.

mod render;
mod store;

pub use render::{Overlay, PageRenderer, RasterRenderer, RenderedPage};
pub use store::{blank_document, LopdfStore};

/// Opaque handle to an open document inside a [`DocumentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(pub(crate) u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Native page dimensions in points (1/72 inch), origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// RGB color with channel fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Fill style for closed shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Rgb,
    /// Alpha fraction in `[0, 1]`; applied through an ExtGState.
    pub opacity: f32,
}

/// One native draw command in page space.
///
/// Coordinates are page-native (origin bottom-left, points). Rotated
/// rectangles rotate about their `(x, y)` anchor.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        content: String,
        bold: bool,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Rotation about the `(x, y)` anchor, radians counter-clockwise.
        rotation_rad: f32,
        color: Rgb,
        stroke_width: f32,
        /// `Some` fills the rectangle instead of stroking its outline.
        fill: Option<FillStyle>,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Rgb,
        stroke_width: f32,
    },
}

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: usize, page_count: usize },
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Mutable paged-document container consumed by the export compositor.
///
/// The store owns parsed state per handle; the caller's input bytes are never
/// mutated. Draw commands queue until [`DocumentStore::save`] composites them
/// into page content and serializes a fresh byte stream.
pub trait DocumentStore {
    fn open(&mut self, bytes: &[u8]) -> Result<DocumentHandle, StoreError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<usize, StoreError>;
    fn page_size(&self, handle: DocumentHandle, page_index: usize) -> Result<PageSize, StoreError>;
    fn draw(
        &mut self,
        handle: DocumentHandle,
        page_index: usize,
        command: DrawCommand,
    ) -> Result<(), StoreError>;
    fn save(&mut self, handle: DocumentHandle) -> Result<Vec<u8>, StoreError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), StoreError>;
}
