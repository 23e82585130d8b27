//! Undo/redo history engine
//!
//! A linear timeline of immutable full-set snapshots plus a cursor. Every
//! committed structural change (add, delete, confirmed text edit) records
//! exactly one checkpoint, synchronously; in-progress drag updates never do.
//! Capacity is unbounded by design.

use crate::annotation::AnnotationElement;

/// Snapshot timeline with linear-history semantics
///
/// Seeded with one empty snapshot so that undoing every recorded action
/// lands back on the initial empty set.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Vec<AnnotationElement>>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self { snapshots: vec![Vec::new()], cursor: 0 }
    }

    /// Record a checkpoint of the current set
    ///
    /// Discards any redo branch beyond the cursor, appends a deep copy, and
    /// advances the cursor to the new last index.
    pub fn checkpoint(&mut self, current: &[AnnotationElement]) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(current.to_vec());
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot; `None` at the start boundary (silent no-op)
    pub fn undo(&mut self) -> Option<Vec<AnnotationElement>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor].clone())
    }

    /// Step forward one snapshot; `None` at the end boundary (silent no-op)
    pub fn redo(&mut self) -> Option<Vec<AnnotationElement>> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.snapshots[self.cursor].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of recorded snapshots, including the initial empty one
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        // The seed snapshot always exists.
        false
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationElement, CanvasPoint, ElementKind};

    fn element(x: f32) -> AnnotationElement {
        AnnotationElement::new(
            ElementKind::Draw,
            vec![CanvasPoint::new(x, x)],
            "#000000".to_string(),
            2.0,
        )
    }

    #[test]
    fn test_boundaries_are_silent_no_ops() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_walks_back_to_initial_empty_set() {
        let mut history = History::new();
        let mut working = Vec::new();

        for i in 0..3 {
            working.push(element(i as f32));
            history.checkpoint(&working);
        }

        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo().map(|s| s.len()), Some(2));
        assert_eq!(history.undo().map(|s| s.len()), Some(1));
        assert_eq!(history.undo().map(|s| s.len()), Some(0));
        assert!(history.undo().is_none());
        assert!(history.can_redo());
    }

    #[test]
    fn test_checkpoint_after_undo_discards_redo_branch() {
        let mut history = History::new();
        let a = vec![element(1.0)];
        let b = vec![element(1.0), element(2.0)];
        let c = vec![element(3.0)];

        history.checkpoint(&a);
        history.checkpoint(&b);

        let restored = history.undo().expect("undo should return snapshot A");
        assert_eq!(restored, a);

        history.checkpoint(&c);

        // B is unreachable now.
        assert!(history.redo().is_none());
        assert!(!history.can_redo());

        let back = history.undo().expect("undo should return snapshot A");
        assert_eq!(back, a);
        let forward = history.redo().expect("redo should return snapshot C");
        assert_eq!(forward, c);
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut history = History::new();
        let mut working = vec![element(1.0)];
        history.checkpoint(&working);

        // Mutating the working set must not alter the recorded snapshot.
        working[0].color = "#ffffff".to_string();
        let restored = history.undo().and_then(|_| history.redo()).expect("snapshot expected");
        assert_eq!(restored[0].color, "#000000");
    }
}
