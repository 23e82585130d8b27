//! Session facade tying the engines together
//!
//! One [`AnnotationSession`] owns the working element set, the history
//! timeline, the interaction engine, and the document store. Structural
//! mutations (add, update, delete, confirmed text edit, committed gesture)
//! checkpoint synchronously, exactly once each; in-progress drags never do.
//!
//! The session is single-threaded. Load and export are modeled as single
//! in-flight operations behind boolean gates; a failed call is terminal for
//! that call and leaves no partial state behind.

use log::{debug, info};
use pdf_engine::{DocumentHandle, DocumentStore, PageSize, StoreError};

use crate::annotation::{AnnotationElement, CanvasPoint, ElementId, ElementSet, ElementUpdate, TextFormat};
use crate::export::{export, ExportError};
use crate::history::History;
use crate::interaction::{
    ApproxTextMeasure, InteractionEngine, PointerInput, PointerOutcome, Tool, ToolSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no document is loaded")]
    NoDocument,
    #[error("a document load is already in progress")]
    LoadInFlight,
    #[error("an export is already in progress")]
    ExportInFlight,
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
struct LoadedDocument {
    handle: DocumentHandle,
    bytes: Vec<u8>,
    page_count: usize,
}

/// Annotation session over one loaded document
pub struct AnnotationSession<S: DocumentStore> {
    store: S,
    document: Option<LoadedDocument>,
    elements: ElementSet,
    history: History,
    interaction: InteractionEngine,
    measure: ApproxTextMeasure,
    tool: Tool,
    settings: ToolSettings,
    loading: bool,
    exporting: bool,
}

impl<S: DocumentStore> AnnotationSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            document: None,
            elements: ElementSet::new(),
            history: History::new(),
            interaction: InteractionEngine::new(),
            measure: ApproxTextMeasure,
            tool: Tool::Select,
            settings: ToolSettings::default(),
            loading: false,
            exporting: false,
        }
    }

    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    pub fn set_canvas_origin(&mut self, origin: CanvasPoint) {
        self.interaction.set_canvas_origin(origin);
    }

    pub fn page_count(&self) -> Option<usize> {
        self.document.as_ref().map(|document| document.page_count)
    }

    pub fn page_size(&self, page_index: usize) -> Result<PageSize, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        Ok(self.store.page_size(document.handle, page_index)?)
    }

    /// Load a document from bytes, replacing any previously loaded one
    ///
    /// On failure the previous document stays loaded and the session state is
    /// unchanged.
    pub fn load_document(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        if self.loading {
            return Err(SessionError::LoadInFlight);
        }
        self.loading = true;
        let result = self.load_inner(bytes);
        self.loading = false;
        result
    }

    fn load_inner(&mut self, bytes: Vec<u8>) -> Result<(), SessionError> {
        let handle = self.store.open(&bytes)?;
        let page_count = match self.store.page_count(handle) {
            Ok(count) => count,
            Err(err) => {
                let _ = self.store.close(handle);
                return Err(err.into());
            }
        };

        if let Some(previous) = self.document.take() {
            let _ = self.store.close(previous.handle);
        }
        info!("loaded document with {page_count} pages");
        self.document = Some(LoadedDocument { handle, bytes, page_count });
        self.elements = ElementSet::new();
        self.history = History::new();
        self.interaction = InteractionEngine::new();
        Ok(())
    }

    /// Add a committed element (one checkpoint)
    pub fn add_element(&mut self, element: AnnotationElement) -> ElementId {
        let id = element.id;
        self.elements.add(element);
        self.history.checkpoint(self.elements.as_slice());
        id
    }

    /// Apply a partial update to an element (one checkpoint)
    pub fn update_element(&mut self, id: ElementId, update: ElementUpdate) -> Result<(), SessionError> {
        if !self.elements.update(id, update) {
            return Err(SessionError::UnknownElement(id));
        }
        self.history.checkpoint(self.elements.as_slice());
        Ok(())
    }

    /// Delete an element by id (one checkpoint)
    pub fn delete_element(&mut self, id: ElementId) -> Result<AnnotationElement, SessionError> {
        let removed = self.elements.remove(id).ok_or(SessionError::UnknownElement(id))?;
        self.history.checkpoint(self.elements.as_slice());
        Ok(removed)
    }

    /// Step the working set back one snapshot; false at the boundary
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.elements.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Step the working set forward one snapshot; false at the boundary
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.elements.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn pointer_down(&mut self, input: PointerInput) -> PointerOutcome {
        self.interaction.pointer_down(
            input,
            self.tool,
            &self.settings,
            &mut self.elements,
            &self.measure,
        )
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> PointerOutcome {
        self.interaction.pointer_move(input, &mut self.elements)
    }

    /// Finish the active gesture; a committed element checkpoints once
    pub fn pointer_up(&mut self) -> PointerOutcome {
        let outcome = self.interaction.pointer_up(&mut self.elements);
        if let PointerOutcome::Committed { id } = outcome {
            debug!("gesture committed element {id}");
            self.history.checkpoint(self.elements.as_slice());
        }
        outcome
    }

    /// Confirm the open text edit session (checkpoints on structural change)
    pub fn confirm_text(&mut self, text: &str, format: TextFormat) -> bool {
        let committed = self.interaction.confirm_text(text, format, &mut self.elements);
        if committed {
            self.history.checkpoint(self.elements.as_slice());
        }
        committed
    }

    /// Cancel the open text edit session
    ///
    /// Checkpoints only when the cancel deletes a previously committed
    /// element; an abandoned draft leaves history untouched.
    pub fn cancel_text(&mut self) -> bool {
        let structural = self.interaction.cancel_text(&mut self.elements);
        if structural {
            self.history.checkpoint(self.elements.as_slice());
        }
        structural
    }

    /// Flatten the committed elements onto a page and return new bytes
    ///
    /// The loaded document's bytes are never mutated; re-exporting after more
    /// edits starts from the same source.
    pub fn export_annotated(&mut self, page_index: usize, scale: f32) -> Result<Vec<u8>, SessionError> {
        if self.exporting {
            return Err(SessionError::ExportInFlight);
        }
        let Some(document) = self.document.as_ref() else {
            return Err(SessionError::NoDocument);
        };
        let bytes = document.bytes.clone();

        self.exporting = true;
        let result = export(&mut self.store, &bytes, self.elements.as_slice(), page_index, scale);
        self.exporting = false;
        Ok(result?)
    }
}
