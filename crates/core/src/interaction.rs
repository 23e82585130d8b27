//! Pointer interaction engine
//!
//! Turns tool-scoped pointer gestures into element mutations. All state that
//! drives a transition (active gesture, edit session, last-click memory,
//! canvas origin) is explicit and first-class so every transition is directly
//! testable; there are no ambient globals.

use log::debug;

use crate::annotation::{
    AnnotationElement, CanvasPoint, ElementId, ElementKind, ElementSet, TextFormat,
};

/// Clicks on the same text element within this window count as a double-click.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 300;

/// Active tool selected by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw,
    Rectangle,
    Circle,
    Arrow,
    Text,
    Highlight,
    Eraser,
}

impl Tool {
    fn element_kind(self) -> Option<ElementKind> {
        match self {
            Tool::Draw => Some(ElementKind::Draw),
            Tool::Rectangle => Some(ElementKind::Rectangle),
            Tool::Circle => Some(ElementKind::Circle),
            Tool::Arrow => Some(ElementKind::Arrow),
            Tool::Highlight => Some(ElementKind::Highlight),
            Tool::Select | Tool::Text | Tool::Eraser => None,
        }
    }
}

/// Current tool defaults, seeded into new elements
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub color: String,
    pub stroke_width: f32,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            font_family: "Helvetica".to_string(),
            font_size: 16.0,
        }
    }
}

impl ToolSettings {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    fn text_format(&self) -> TextFormat {
        TextFormat {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            color: self.color.clone(),
            ..TextFormat::default()
        }
    }
}

/// Pointer event in canvas space with an explicit millisecond timestamp
///
/// Timestamps come from the caller, never from a wall clock, so click-timing
/// behavior is deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub point: CanvasPoint,
    pub timestamp_ms: u64,
}

impl PointerInput {
    pub fn new(point: CanvasPoint, timestamp_ms: u64) -> Self {
        Self { point, timestamp_ms }
    }
}

/// Side effect requested of the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Clear a disc of overlay pixels. Raster-only: the element set is
    /// untouched.
    EraseDisc { center: CanvasPoint, radius: f32 },
}

/// Result of feeding one pointer event into the engine
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing changed (miss, absorbed event, or no active gesture).
    Ignored,
    /// A drag gesture started; the new element is in the set but not committed.
    GestureStarted { id: ElementId },
    /// The dragging element's geometry changed (never checkpoints).
    GestureUpdated { id: ElementId },
    /// A drag gesture finished and the element is committed (one checkpoint).
    Committed { id: ElementId },
    /// A text edit session opened for this element.
    EditEntered { id: ElementId },
    /// The caller should apply this rendering effect.
    Apply(Effect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging { id: ElementId },
    Erasing { radius: f32 },
}

/// Open text edit session
///
/// `was_committed` distinguishes a fresh draft from a re-edit of an element
/// that already lives in history; cancelling the latter is a structural
/// delete.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EditSession {
    id: ElementId,
    was_committed: bool,
}

/// Measures a rendered line of text, used by hit testing
pub trait TextMeasure {
    fn line_width(&self, line: &str, font_size: f32) -> f32;
}

/// Average-glyph-width approximation, good enough for hit boxes
#[derive(Debug, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn line_width(&self, line: &str, font_size: f32) -> f32 {
        line.chars().count() as f32 * font_size * 0.5
    }
}

/// Pointer gesture state machine
#[derive(Debug)]
pub struct InteractionEngine {
    gesture: Gesture,
    edit: Option<EditSession>,
    canvas_origin: CanvasPoint,
    last_click: Option<(ElementId, u64)>,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionEngine {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            edit: None,
            canvas_origin: CanvasPoint::new(0.0, 0.0),
            last_click: None,
        }
    }

    /// Canvas position inside the host viewport, used for text re-basing
    pub fn set_canvas_origin(&mut self, origin: CanvasPoint) {
        self.canvas_origin = origin;
    }

    pub fn canvas_origin(&self) -> CanvasPoint {
        self.canvas_origin
    }

    /// Id of the element under live edit, if any
    pub fn editing_element(&self) -> Option<ElementId> {
        self.edit.map(|session| session.id)
    }

    /// Canvas anchor → viewport anchor for an opening edit session
    ///
    /// `viewport = canvas + origin − (0, font_size)`
    fn to_viewport(&self, anchor: CanvasPoint, font_size: f32) -> CanvasPoint {
        CanvasPoint::new(
            anchor.x + self.canvas_origin.x,
            anchor.y + self.canvas_origin.y - font_size,
        )
    }

    /// Viewport anchor → canvas anchor on confirm, with the confirmed size
    ///
    /// Exact inverse of [`Self::to_viewport`]; the confirmed font size may
    /// differ from the size the session opened with.
    fn to_canvas(&self, anchor: CanvasPoint, font_size: f32) -> CanvasPoint {
        CanvasPoint::new(
            anchor.x - self.canvas_origin.x,
            anchor.y - self.canvas_origin.y + font_size,
        )
    }

    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        tool: Tool,
        settings: &ToolSettings,
        elements: &mut ElementSet,
        measure: &dyn TextMeasure,
    ) -> PointerOutcome {
        match tool {
            Tool::Select => self.select_down(input, elements, measure),
            Tool::Text => self.text_down(input, settings, elements, measure),
            Tool::Eraser => {
                self.gesture = Gesture::Erasing { radius: settings.stroke_width };
                PointerOutcome::Apply(Effect::EraseDisc {
                    center: input.point,
                    radius: settings.stroke_width,
                })
            }
            _ => self.shape_down(input, tool, settings, elements),
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput, elements: &mut ElementSet) -> PointerOutcome {
        match self.gesture {
            Gesture::Idle => PointerOutcome::Ignored,
            Gesture::Erasing { radius } => {
                PointerOutcome::Apply(Effect::EraseDisc { center: input.point, radius })
            }
            Gesture::Dragging { id } => {
                let Some(element) = elements.get_mut(id) else {
                    self.gesture = Gesture::Idle;
                    return PointerOutcome::Ignored;
                };
                if element.kind.is_shape() {
                    element.points.truncate(1);
                    element.points.push(input.point);
                } else {
                    element.points.push(input.point);
                }
                PointerOutcome::GestureUpdated { id }
            }
        }
    }

    pub fn pointer_up(&mut self, elements: &mut ElementSet) -> PointerOutcome {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle | Gesture::Erasing { .. } => PointerOutcome::Ignored,
            Gesture::Dragging { id } => {
                let complete = elements.get(id).map(|e| e.is_complete()).unwrap_or(false);
                if complete {
                    PointerOutcome::Committed { id }
                } else {
                    // A shape gesture that never moved leaves nothing behind.
                    elements.remove(id);
                    PointerOutcome::Ignored
                }
            }
        }
    }

    /// Confirm the open edit session with the final text and format
    ///
    /// Re-bases the anchor viewport→canvas using the confirmed font size and
    /// commits the element. Empty or whitespace-only text behaves exactly
    /// like cancel. Returns true when the session ends in a structural change
    /// that must checkpoint.
    pub fn confirm_text(
        &mut self,
        text: &str,
        format: TextFormat,
        elements: &mut ElementSet,
    ) -> bool {
        if text.trim().is_empty() {
            debug!("empty text confirm treated as cancel");
            return self.cancel_text(elements);
        }
        let Some(session) = self.edit.take() else {
            return false;
        };
        let Some(element) = elements.get_mut(session.id) else {
            return false;
        };

        if let Some(anchor) = element.points.first().copied() {
            element.points = vec![self.to_canvas(anchor, format.font_size)];
        }
        element.text = Some(text.to_string());
        element.font_size = Some(format.font_size);
        element.color = format.color.clone();
        element.text_format = Some(format);
        element.is_editing = false;
        true
    }

    /// Cancel the open edit session, deleting the element outright
    ///
    /// Returns true only when the element had been committed before this
    /// session (the delete is structural and must checkpoint); an abandoned
    /// draft leaves no trace.
    pub fn cancel_text(&mut self, elements: &mut ElementSet) -> bool {
        let Some(session) = self.edit.take() else {
            return false;
        };
        elements.remove(session.id);
        session.was_committed
    }

    fn select_down(
        &mut self,
        input: PointerInput,
        elements: &mut ElementSet,
        measure: &dyn TextMeasure,
    ) -> PointerOutcome {
        let Some(id) = text_element_at(elements, input.point, measure) else {
            self.last_click = None;
            return PointerOutcome::Ignored;
        };

        let is_double = matches!(
            self.last_click,
            Some((last_id, last_ts))
                if last_id == id && input.timestamp_ms.saturating_sub(last_ts) <= DOUBLE_CLICK_WINDOW_MS
        );
        if is_double && self.edit.is_none() {
            self.last_click = None;
            self.enter_edit(id, elements)
        } else {
            self.last_click = Some((id, input.timestamp_ms));
            PointerOutcome::Ignored
        }
    }

    fn text_down(
        &mut self,
        input: PointerInput,
        settings: &ToolSettings,
        elements: &mut ElementSet,
        measure: &dyn TextMeasure,
    ) -> PointerOutcome {
        // Single concurrent edit session; extra clicks are absorbed.
        if self.edit.is_some() || elements.has_editing() {
            return PointerOutcome::Ignored;
        }

        if let Some(id) = text_element_at(elements, input.point, measure) {
            return self.enter_edit(id, elements);
        }

        let anchor = CanvasPoint::new(
            input.point.x + self.canvas_origin.x,
            input.point.y + self.canvas_origin.y,
        );
        let element = AnnotationElement::new_text(anchor, settings.text_format());
        let id = element.id;
        elements.add(element);
        self.edit = Some(EditSession { id, was_committed: false });
        PointerOutcome::EditEntered { id }
    }

    fn shape_down(
        &mut self,
        input: PointerInput,
        tool: Tool,
        settings: &ToolSettings,
        elements: &mut ElementSet,
    ) -> PointerOutcome {
        let Some(kind) = tool.element_kind() else {
            return PointerOutcome::Ignored;
        };
        let element = AnnotationElement::new(
            kind,
            vec![input.point],
            settings.color.clone(),
            settings.stroke_width,
        );
        let id = element.id;
        elements.add(element);
        self.gesture = Gesture::Dragging { id };
        PointerOutcome::GestureStarted { id }
    }

    fn enter_edit(&mut self, id: ElementId, elements: &mut ElementSet) -> PointerOutcome {
        let origin = self.canvas_origin;
        let Some(element) = elements.get_mut(id) else {
            return PointerOutcome::Ignored;
        };
        let font_size = element.font_size.unwrap_or(16.0);
        if let Some(anchor) = element.points.first().copied() {
            element.points = vec![CanvasPoint::new(
                anchor.x + origin.x,
                anchor.y + origin.y - font_size,
            )];
        }
        element.is_editing = true;
        self.edit = Some(EditSession { id, was_committed: true });
        PointerOutcome::EditEntered { id }
    }
}

/// Topmost committed text element whose rendered box contains `point`
///
/// Iterates in reverse insertion order so the element drawn last wins. Each
/// line `i` of the text gets a box around its baseline at
/// `anchor.y + i * font_size * 1.2`, padded 2px left/right/top and 4px below
/// the baseline for descenders.
pub fn text_element_at(
    elements: &ElementSet,
    point: CanvasPoint,
    measure: &dyn TextMeasure,
) -> Option<ElementId> {
    for element in elements.iter().rev() {
        if element.kind != ElementKind::Text || element.is_editing {
            continue;
        }
        let Some(anchor) = element.points.first() else {
            continue;
        };
        let Some(text) = element.text.as_deref() else {
            continue;
        };
        let font_size = element.font_size.unwrap_or(16.0);

        for (i, line) in text.split('\n').enumerate() {
            let baseline = anchor.y + i as f32 * font_size * 1.2;
            let width = measure.line_width(line, font_size);
            let hit = point.x >= anchor.x - 2.0
                && point.x <= anchor.x + width + 2.0
                && point.y >= baseline - font_size - 2.0
                && point.y <= baseline + 4.0;
            if hit {
                return Some(element.id);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed glyph width keeps hit boxes exact under test.
    struct FixedMeasure(f32);

    impl TextMeasure for FixedMeasure {
        fn line_width(&self, line: &str, _font_size: f32) -> f32 {
            line.chars().count() as f32 * self.0
        }
    }

    fn committed_text(anchor: CanvasPoint, text: &str, font_size: f32) -> AnnotationElement {
        let mut element = AnnotationElement::new_text(
            anchor,
            TextFormat { font_size, ..TextFormat::default() },
        );
        element.is_editing = false;
        element.text = Some(text.to_string());
        element
    }

    fn input(x: f32, y: f32, ts: u64) -> PointerInput {
        PointerInput::new(CanvasPoint::new(x, y), ts)
    }

    #[test]
    fn test_rectangle_drag_keeps_two_points_and_commits() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        let started = engine.pointer_down(input(10.0, 10.0, 0), Tool::Rectangle, &settings, &mut elements, &measure);
        let PointerOutcome::GestureStarted { id } = started else {
            panic!("expected gesture start, got {started:?}");
        };

        engine.pointer_move(input(30.0, 20.0, 16), &mut elements);
        engine.pointer_move(input(50.0, 40.0, 32), &mut elements);

        let element = elements.get(id).expect("element should exist");
        assert_eq!(element.points.len(), 2);
        assert_eq!(element.points[1], CanvasPoint::new(50.0, 40.0));

        assert_eq!(engine.pointer_up(&mut elements), PointerOutcome::Committed { id });
    }

    #[test]
    fn test_draw_appends_every_move_point() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        let PointerOutcome::GestureStarted { id } =
            engine.pointer_down(input(0.0, 0.0, 0), Tool::Draw, &settings, &mut elements, &measure)
        else {
            panic!("expected gesture start");
        };
        for i in 1..=4 {
            engine.pointer_move(input(i as f32, i as f32, i * 16), &mut elements);
        }
        assert_eq!(elements.get(id).map(|e| e.points.len()), Some(5));
    }

    #[test]
    fn test_click_only_shape_leaves_no_element() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        engine.pointer_down(input(5.0, 5.0, 0), Tool::Circle, &settings, &mut elements, &measure);
        assert_eq!(engine.pointer_up(&mut elements), PointerOutcome::Ignored);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_eraser_emits_raster_effect_without_touching_elements() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default().with_stroke_width(12.0);
        let measure = ApproxTextMeasure;

        elements.add(committed_text(CanvasPoint::new(5.0, 5.0), "keep", 16.0));

        let down = engine.pointer_down(input(5.0, 5.0, 0), Tool::Eraser, &settings, &mut elements, &measure);
        assert_eq!(
            down,
            PointerOutcome::Apply(Effect::EraseDisc { center: CanvasPoint::new(5.0, 5.0), radius: 12.0 })
        );

        let moved = engine.pointer_move(input(8.0, 8.0, 16), &mut elements);
        assert_eq!(
            moved,
            PointerOutcome::Apply(Effect::EraseDisc { center: CanvasPoint::new(8.0, 8.0), radius: 12.0 })
        );
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_double_click_rebases_anchor_into_viewport_space() {
        let mut engine = InteractionEngine::new();
        engine.set_canvas_origin(CanvasPoint::new(100.0, 50.0));
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = FixedMeasure(8.0);

        let element = committed_text(CanvasPoint::new(5.0, 20.0), "hello", 16.0);
        let id = element.id;
        elements.add(element);

        let first = engine.pointer_down(input(6.0, 18.0, 1_000), Tool::Select, &settings, &mut elements, &measure);
        assert_eq!(first, PointerOutcome::Ignored);

        let second = engine.pointer_down(input(6.0, 18.0, 1_200), Tool::Select, &settings, &mut elements, &measure);
        assert_eq!(second, PointerOutcome::EditEntered { id });

        let element = elements.get(id).expect("element should exist");
        assert!(element.is_editing);
        assert_eq!(element.points[0], CanvasPoint::new(105.0, 54.0));
    }

    #[test]
    fn test_viewport_rebasing_round_trips() {
        let mut engine = InteractionEngine::new();
        engine.set_canvas_origin(CanvasPoint::new(123.0, 45.5));

        for (x, y, font_size) in [(0.0, 0.0, 16.0), (5.0, 20.0, 16.0), (310.25, 77.0, 24.0)] {
            let anchor = CanvasPoint::new(x, y);
            let back = engine.to_canvas(engine.to_viewport(anchor, font_size), font_size);
            assert_eq!(back, anchor);
        }
    }

    #[test]
    fn test_slow_second_click_does_not_enter_edit() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = FixedMeasure(8.0);

        elements.add(committed_text(CanvasPoint::new(5.0, 20.0), "hello", 16.0));

        engine.pointer_down(input(6.0, 18.0, 1_000), Tool::Select, &settings, &mut elements, &measure);
        let second = engine.pointer_down(input(6.0, 18.0, 1_400), Tool::Select, &settings, &mut elements, &measure);
        assert_eq!(second, PointerOutcome::Ignored);
        assert!(!elements.iter().any(|e| e.is_editing));
    }

    #[test]
    fn test_text_tool_creates_draft_anchored_in_viewport() {
        let mut engine = InteractionEngine::new();
        engine.set_canvas_origin(CanvasPoint::new(40.0, 10.0));
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        let outcome = engine.pointer_down(input(20.0, 30.0, 0), Tool::Text, &settings, &mut elements, &measure);
        let PointerOutcome::EditEntered { id } = outcome else {
            panic!("expected edit session, got {outcome:?}");
        };

        let element = elements.get(id).expect("element should exist");
        assert!(element.is_editing);
        assert_eq!(element.points[0], CanvasPoint::new(60.0, 40.0));

        // A second text click is absorbed while the session is open.
        let absorbed = engine.pointer_down(input(90.0, 90.0, 16), Tool::Text, &settings, &mut elements, &measure);
        assert_eq!(absorbed, PointerOutcome::Ignored);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_confirm_rebases_with_confirmed_font_size() {
        let mut engine = InteractionEngine::new();
        engine.set_canvas_origin(CanvasPoint::new(100.0, 50.0));
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        let PointerOutcome::EditEntered { id } =
            engine.pointer_down(input(5.0, 4.0, 0), Tool::Text, &settings, &mut elements, &measure)
        else {
            panic!("expected edit session");
        };
        // Anchor is viewport (105, 54); confirm at a larger size than the
        // session opened with.
        let format = TextFormat { font_size: 24.0, ..TextFormat::default() };
        let needs_checkpoint = engine.confirm_text("note", format, &mut elements);
        assert!(needs_checkpoint);

        let element = elements.get(id).expect("element should exist");
        assert!(!element.is_editing);
        assert_eq!(element.text.as_deref(), Some("note"));
        assert_eq!(element.points[0], CanvasPoint::new(5.0, 28.0));
        assert_eq!(element.font_size, Some(24.0));
    }

    #[test]
    fn test_empty_confirm_acts_as_cancel() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = ApproxTextMeasure;

        engine.pointer_down(input(5.0, 5.0, 0), Tool::Text, &settings, &mut elements, &measure);
        let needs_checkpoint = engine.confirm_text("   ", TextFormat::default(), &mut elements);
        assert!(!needs_checkpoint);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_cancel_of_reedit_is_a_structural_delete() {
        let mut engine = InteractionEngine::new();
        let mut elements = ElementSet::new();
        let settings = ToolSettings::default();
        let measure = FixedMeasure(8.0);

        let element = committed_text(CanvasPoint::new(5.0, 20.0), "hello", 16.0);
        let id = element.id;
        elements.add(element);

        engine.pointer_down(input(6.0, 18.0, 0), Tool::Text, &settings, &mut elements, &measure);
        assert_eq!(engine.editing_element(), Some(id));

        assert!(engine.cancel_text(&mut elements));
        assert!(elements.is_empty());
    }

    #[test]
    fn test_hit_test_matches_line_boxes_and_topmost_wins() {
        let mut elements = ElementSet::new();
        let measure = FixedMeasure(10.0);

        let lower = committed_text(CanvasPoint::new(0.0, 20.0), "ab\ncd", 10.0);
        let lower_id = lower.id;
        elements.add(lower);

        // First line box: x in [-2, 22], y in [8, 24].
        assert_eq!(
            text_element_at(&elements, CanvasPoint::new(10.0, 15.0), &measure),
            Some(lower_id)
        );
        // Second line baseline 32: y in [20, 36].
        assert_eq!(
            text_element_at(&elements, CanvasPoint::new(10.0, 34.0), &measure),
            Some(lower_id)
        );
        // Outside every box.
        assert_eq!(text_element_at(&elements, CanvasPoint::new(10.0, 50.0), &measure), None);
        assert_eq!(text_element_at(&elements, CanvasPoint::new(30.0, 15.0), &measure), None);

        // An overlapping element added later wins the reverse-order scan.
        let upper = committed_text(CanvasPoint::new(0.0, 20.0), "xy", 10.0);
        let upper_id = upper.id;
        elements.add(upper);
        assert_eq!(
            text_element_at(&elements, CanvasPoint::new(10.0, 15.0), &measure),
            Some(upper_id)
        );
    }
}
