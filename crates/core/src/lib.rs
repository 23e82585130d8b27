//! PDF annotation core: element model, pointer interaction, undo/redo
//! history, and export compositing over a pluggable document store.
//!
//! The usual entry point is [`AnnotationSession`], which wires the engines
//! together over a [`pdf_engine::DocumentStore`]; the individual engines are
//! public for hosts that want to compose them differently.

pub mod annotation;
pub mod export;
pub mod history;
pub mod interaction;
pub mod session;

pub use annotation::{
    AnnotationElement, CanvasPoint, ElementId, ElementKind, ElementSet, ElementUpdate, TextFormat,
};
pub use export::{
    commands_for_element, export, parse_hex_color, to_canvas_point, to_page_point, ExportError,
};
pub use history::History;
pub use interaction::{
    text_element_at, ApproxTextMeasure, Effect, InteractionEngine, PointerInput, PointerOutcome,
    TextMeasure, Tool, ToolSettings, DOUBLE_CLICK_WINDOW_MS,
};
pub use session::{AnnotationSession, SessionError};
