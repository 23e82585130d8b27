//! Export/compositing engine
//!
//! Flattens the committed element set onto a page of the source document and
//! serializes a new byte stream. Canvas coordinates (top-left origin, zoom
//! scaled) are converted to page-native coordinates (bottom-left origin,
//! points) here; everything downstream of this module speaks page space.

use log::{debug, warn};
use pdf_engine::{DocumentStore, DrawCommand, FillStyle, Rgb, StoreError};

use crate::annotation::{AnnotationElement, CanvasPoint, ElementKind};

/// Arrow head stroke length, in canvas pixels before scaling.
const ARROW_HEAD_LEN_PX: f32 = 15.0;
/// Fallback highlight band height for a zero-height drag, canvas pixels.
const HIGHLIGHT_FALLBACK_HEIGHT_PX: f32 = 20.0;
/// Highlight fill opacity.
const HIGHLIGHT_OPACITY: f32 = 0.3;
/// Substitute for unparseable colors: opaque red, hard to miss in output.
const FALLBACK_COLOR: Rgb = Rgb::new(1.0, 0.0, 0.0);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("page {page} not found (document has {page_count} pages)")]
    PageNotFound { page: usize, page_count: usize },
    #[error("a text element is still being edited; confirm or cancel it first")]
    EditInProgress,
    #[error("scale factor must be positive, got {0}")]
    InvalidScale(f32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse a `#RRGGBB` color into channel fractions
///
/// Anything else falls back to opaque red with a warning record, so a bad
/// color never aborts an export but never passes silently either.
pub fn parse_hex_color(color: &str) -> Rgb {
    let parsed = color.strip_prefix('#').filter(|hex| hex.len() == 6).and_then(|hex| {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
    });
    match parsed {
        Some(rgb) => rgb,
        None => {
            warn!("unparseable color {color:?}, substituting red");
            FALLBACK_COLOR
        }
    }
}

/// Canvas point → page-native point
///
/// `page_x = canvas_x / scale`, `page_y = page_height − canvas_y / scale`.
pub fn to_page_point(point: CanvasPoint, scale: f32, page_height: f32) -> (f32, f32) {
    (point.x / scale, page_height - point.y / scale)
}

/// Page-native point → canvas point, exact inverse of [`to_page_point`]
pub fn to_canvas_point(x: f32, y: f32, scale: f32, page_height: f32) -> CanvasPoint {
    CanvasPoint::new(x * scale, (page_height - y) * scale)
}

/// Oriented filled rectangle covering the segment from `start` to `end`
///
/// Both endpoints are page-space. The rectangle is `thickness` tall,
/// centered on the segment line, rotated about its start-side anchor.
fn segment_rect(
    start: (f32, f32),
    end: (f32, f32),
    thickness: f32,
    color: Rgb,
) -> DrawCommand {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = (dx * dx + dy * dy).sqrt();
    let rotation = dy.atan2(dx);
    let half = thickness / 2.0;
    DrawCommand::Rect {
        x: start.0 + half * rotation.sin(),
        y: start.1 - half * rotation.cos(),
        width: length,
        height: thickness,
        rotation_rad: rotation,
        color,
        stroke_width: 0.0,
        fill: Some(FillStyle { color, opacity: 1.0 }),
    }
}

/// Page-space draw commands for one exportable element
///
/// The caller guarantees `element.is_exportable()`; incomplete geometry
/// yields no commands rather than panicking.
pub fn commands_for_element(
    element: &AnnotationElement,
    scale: f32,
    page_height: f32,
) -> Vec<DrawCommand> {
    let color = parse_hex_color(&element.color);
    let stroke = element.stroke_width / scale;

    match element.kind {
        ElementKind::Text => {
            let Some(anchor) = element.points.first() else {
                return Vec::new();
            };
            let Some(text) = element.text.as_deref() else {
                return Vec::new();
            };
            let format = element.text_format.clone().unwrap_or_default();
            if format.is_italic || format.is_underline {
                warn!("italic/underline styling is not supported in export, dropping");
            }
            let (x, y) = to_page_point(*anchor, scale, page_height);
            let size = element.font_size.unwrap_or(format.font_size) / scale;
            vec![DrawCommand::Text {
                x,
                y,
                size,
                color: parse_hex_color(&format.color),
                content: text.to_string(),
                bold: format.is_bold,
            }]
        }
        ElementKind::Rectangle => {
            let [Some(a), Some(b)] = [element.points.first(), element.points.get(1)] else {
                return Vec::new();
            };
            let (x1, y1) = to_page_point(*a, scale, page_height);
            let (x2, y2) = to_page_point(*b, scale, page_height);
            vec![DrawCommand::Rect {
                x: x1.min(x2),
                y: y1.min(y2),
                width: (x2 - x1).abs(),
                height: (y2 - y1).abs(),
                rotation_rad: 0.0,
                color,
                stroke_width: stroke,
                fill: None,
            }]
        }
        ElementKind::Circle => {
            let [Some(a), Some(b)] = [element.points.first(), element.points.get(1)] else {
                return Vec::new();
            };
            let (cx, cy) = to_page_point(*a, scale, page_height);
            vec![DrawCommand::Circle {
                cx,
                cy,
                radius: a.distance_to(b) / scale,
                color,
                stroke_width: stroke,
            }]
        }
        ElementKind::Highlight => {
            let [Some(a), Some(b)] = [element.points.first(), element.points.get(1)] else {
                return Vec::new();
            };
            let (x1, y1) = to_page_point(*a, scale, page_height);
            let (x2, y2) = to_page_point(*b, scale, page_height);
            let mut y = y1.min(y2);
            let mut height = (y2 - y1).abs();
            if height == 0.0 {
                // Zero-height drag still gets a readable band over the line.
                height = HIGHLIGHT_FALLBACK_HEIGHT_PX / scale;
                y -= height;
            }
            vec![DrawCommand::Rect {
                x: x1.min(x2),
                y,
                width: (x2 - x1).abs(),
                height,
                rotation_rad: 0.0,
                color,
                stroke_width: 0.0,
                fill: Some(FillStyle { color, opacity: HIGHLIGHT_OPACITY }),
            }]
        }
        ElementKind::Draw => element
            .points
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .map(|pair| {
                let start = to_page_point(pair[0], scale, page_height);
                let end = to_page_point(pair[1], scale, page_height);
                segment_rect(start, end, stroke, color)
            })
            .collect(),
        ElementKind::Arrow => {
            let [Some(a), Some(b)] = [element.points.first(), element.points.get(1)] else {
                return Vec::new();
            };
            let start = to_page_point(*a, scale, page_height);
            let end = to_page_point(*b, scale, page_height);
            let shaft_angle = (end.1 - start.1).atan2(end.0 - start.0);
            let head_len = ARROW_HEAD_LEN_PX / scale;

            let mut commands = vec![segment_rect(start, end, stroke, color)];
            for barb in [std::f32::consts::FRAC_PI_6, -std::f32::consts::FRAC_PI_6] {
                let angle = shaft_angle + std::f32::consts::PI + barb;
                let tip = (end.0 + head_len * angle.cos(), end.1 + head_len * angle.sin());
                commands.push(segment_rect(end, tip, stroke, color));
            }
            commands
        }
    }
}

/// Composite the element set onto one page and serialize a new byte stream
///
/// The input bytes are never mutated. Any element still under edit makes the
/// whole call fail; incomplete or empty-text elements are filtered out.
pub fn export<S: DocumentStore>(
    store: &mut S,
    document_bytes: &[u8],
    elements: &[AnnotationElement],
    page_index: usize,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    if scale <= 0.0 || !scale.is_finite() {
        return Err(ExportError::InvalidScale(scale));
    }
    if elements.iter().any(|element| element.is_editing) {
        return Err(ExportError::EditInProgress);
    }

    let handle = store.open(document_bytes)?;
    let result = compose(store, handle, elements, page_index, scale);
    let closed = store.close(handle);
    let bytes = result?;
    closed?;
    Ok(bytes)
}

fn compose<S: DocumentStore>(
    store: &mut S,
    handle: pdf_engine::DocumentHandle,
    elements: &[AnnotationElement],
    page_index: usize,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let page_count = store.page_count(handle)?;
    if page_index >= page_count {
        return Err(ExportError::PageNotFound { page: page_index, page_count });
    }
    let page = store.page_size(handle, page_index)?;

    let mut queued = 0usize;
    for element in elements.iter().filter(|element| element.is_exportable()) {
        for command in commands_for_element(element, scale, page.height_pt) {
            store.draw(handle, page_index, command)?;
            queued += 1;
        }
    }
    debug!("queued {queued} draw commands for page {page_index} at scale {scale}");

    Ok(store.save(handle)?)
}
