//! Annotation element data model
//!
//! Canonical, serializable representation of one annotation. Geometry is
//! recorded in interactive-canvas pixels; a text element's anchor moves to
//! viewport space only while it is under live edit (see the interaction
//! engine for the exact re-basing).

use serde::{Deserialize, Serialize};

/// Unique identifier for an annotation element
///
/// Assigned at creation, immutable, used for all later lookup/update/delete.
pub type ElementId = uuid::Uuid;

/// A point in canvas or viewport pixel space
///
/// The containing element declares which space its points live in; the two
/// are never mixed within one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &CanvasPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Text styling captured when a text element is confirmed
///
/// Pure value type, no identity. Colors are `#RRGGBB` strings; parsing
/// happens at export time with a documented fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
    pub font_family: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub color: String,
    pub background_color: Option<String>,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 16.0,
            is_bold: false,
            is_italic: false,
            is_underline: false,
            color: "#000000".to_string(),
            background_color: None,
        }
    }
}

/// Kind of a persisted annotation element
///
/// The `select` and `eraser` tools are interaction-only and never produce an
/// element of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Draw,
    Rectangle,
    Circle,
    Arrow,
    Text,
    Highlight,
}

impl ElementKind {
    /// Two-point shape kinds (start anchor + latest drag position)
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Arrow | Self::Highlight)
    }
}

/// One annotation element in the working set
///
/// `points` semantics depend on `kind`: full path vertices for `Draw`,
/// exactly two corner points for shape kinds, one anchor point for `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub points: Vec<CanvasPoint>,
    /// Stroke/fill color as `#RRGGBB`
    pub color: String,
    pub stroke_width: f32,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub text_format: Option<TextFormat>,
    /// Transient: true while this element is under live text editing.
    /// Editing elements are excluded from redraw and from export.
    pub is_editing: bool,
}

impl AnnotationElement {
    /// Create a new geometry element with a generated id
    pub fn new(kind: ElementKind, points: Vec<CanvasPoint>, color: String, stroke_width: f32) -> Self {
        Self {
            id: ElementId::new_v4(),
            kind,
            points,
            color,
            stroke_width,
            text: None,
            font_size: None,
            text_format: None,
            is_editing: false,
        }
    }

    /// Create a new text element in its editing state
    ///
    /// The anchor is a viewport-space point until the edit is confirmed.
    pub fn new_text(anchor: CanvasPoint, format: TextFormat) -> Self {
        Self {
            id: ElementId::new_v4(),
            kind: ElementKind::Text,
            points: vec![anchor],
            color: format.color.clone(),
            stroke_width: 1.0,
            text: None,
            font_size: Some(format.font_size),
            text_format: Some(format),
            is_editing: true,
        }
    }

    /// Points non-empty, and at least two points for shape kinds
    pub fn is_complete(&self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        if self.kind.is_shape() {
            return self.points.len() >= 2;
        }
        true
    }

    /// Complete, committed, and (for text) carrying non-empty text
    pub fn is_exportable(&self) -> bool {
        if !self.is_complete() || self.is_editing {
            return false;
        }
        if self.kind == ElementKind::Text {
            return self.text.as_deref().is_some_and(|text| !text.trim().is_empty());
        }
        true
    }
}

/// Partial update applied to an element by id
///
/// `None` fields leave the current value untouched. The `is_editing`
/// transition is owned by the interaction engine and is not part of the
/// public update surface.
#[derive(Debug, Clone, Default)]
pub struct ElementUpdate {
    pub points: Option<Vec<CanvasPoint>>,
    pub color: Option<String>,
    pub stroke_width: Option<f32>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub text_format: Option<TextFormat>,
}

/// Insertion-ordered element set with unique ids
///
/// Insertion order is the z-order: later elements draw on top and win
/// reverse-order hit testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSet {
    elements: Vec<AnnotationElement>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, replacing in place if the id already exists
    pub fn add(&mut self, element: AnnotationElement) {
        match self.elements.iter().position(|existing| existing.id == element.id) {
            Some(index) => self.elements[index] = element,
            None => self.elements.push(element),
        }
    }

    /// Apply a partial update to an element; returns false if the id is unknown
    pub fn update(&mut self, id: ElementId, update: ElementUpdate) -> bool {
        let Some(element) = self.get_mut(id) else {
            return false;
        };

        if let Some(points) = update.points {
            element.points = points;
        }
        if let Some(color) = update.color {
            element.color = color;
        }
        if let Some(stroke_width) = update.stroke_width {
            element.stroke_width = stroke_width;
        }
        if let Some(text) = update.text {
            element.text = Some(text);
        }
        if let Some(font_size) = update.font_size {
            element.font_size = Some(font_size);
        }
        if let Some(text_format) = update.text_format {
            element.text_format = Some(text_format);
        }
        true
    }

    /// Remove an element by id
    pub fn remove(&mut self, id: ElementId) -> Option<AnnotationElement> {
        let index = self.elements.iter().position(|element| element.id == id)?;
        Some(self.elements.remove(index))
    }

    pub fn get(&self, id: ElementId) -> Option<&AnnotationElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut AnnotationElement> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotationElement> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[AnnotationElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if any element is under live text editing
    pub fn has_editing(&self) -> bool {
        self.elements.iter().any(|element| element.is_editing)
    }

    /// Deep copy of the current elements, for history snapshots
    pub fn snapshot(&self) -> Vec<AnnotationElement> {
        self.elements.clone()
    }

    /// Replace the whole set with a snapshot (undo/redo restore)
    pub fn restore(&mut self, snapshot: Vec<AnnotationElement>) {
        self.elements = snapshot;
    }
}
