//! Linear undo/redo history of scene snapshots.

use crate::shapes::Element;
use std::collections::VecDeque;

/// Default number of undo steps kept.
pub const MAX_UNDO_HISTORY: usize = 50;

/// A bounded, non-branching timeline of full scene snapshots.
///
/// Snapshots are taken *before* a mutation. `cursor` indexes the snapshot the
/// next undo restores, or is -1 when there is nothing to undo. When undo is
/// called while the live scene has not been recorded yet, the live scene is
/// appended first so a later redo can return to it.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Vec<Element>>,
    cursor: isize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(MAX_UNDO_HISTORY)
    }
}

impl History {
    /// Create a history keeping at most `capacity` undo steps (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: -1,
            capacity: capacity.max(1),
        }
    }

    /// Index of the snapshot the next undo restores, -1 if none.
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the pre-mutation scene, dropping any redo tail.
    pub fn snapshot(&mut self, current: &[Element]) {
        self.entries.truncate((self.cursor + 1) as usize);
        self.entries.push_back(current.to_vec());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() as isize - 1;
    }

    /// Step back one snapshot. Returns the scene to restore, or None at the start.
    pub fn undo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        if self.cursor < 0 {
            return None;
        }
        if self.cursor as usize == self.entries.len() - 1 {
            self.entries.push_back(current.to_vec());
        }
        let restored = self.entries[self.cursor as usize].clone();
        self.cursor -= 1;
        Some(restored)
    }

    /// Step forward one snapshot. Returns the scene to restore, or None at the tail.
    pub fn redo(&mut self) -> Option<Vec<Element>> {
        let next = (self.cursor + 2) as usize;
        if next >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[next].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        ((self.cursor + 2) as usize) < self.entries.len()
    }

    /// Forget all snapshots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ElementKind;
    use crate::tools::DrawingContext;
    use kurbo::Point;

    fn element(x: f64) -> Element {
        Element::new(ElementKind::Rectangle, Point::new(x, 0.0), &DrawingContext::default(), "u1")
    }

    #[test]
    fn test_undo_empty_history() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(history.undo(&[]).is_none());
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), -1);
    }

    #[test]
    fn test_undo_then_redo_single_mutation() {
        let mut history = History::default();
        history.snapshot(&[]);
        let live = vec![element(1.0)];

        assert_eq!(history.undo(&live), Some(Vec::new()));
        assert!(!history.can_undo());
        assert_eq!(history.redo(), Some(live.clone()));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_snapshot_truncates_redo_tail() {
        let mut history = History::default();
        history.snapshot(&[]);
        let first = vec![element(1.0)];
        history.undo(&first);
        assert!(history.can_redo());

        history.snapshot(&[]);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_multiple_steps() {
        let mut history = History::default();
        let a = vec![element(1.0)];
        let b = vec![element(1.0), element(2.0)];
        history.snapshot(&[]);
        history.snapshot(&a);

        assert_eq!(history.undo(&b), Some(a.clone()));
        assert_eq!(history.undo(&a), Some(Vec::new()));
        assert!(history.undo(&[]).is_none());
        assert_eq!(history.redo(), Some(a.clone()));
        assert_eq!(history.redo(), Some(b.clone()));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(2);
        history.snapshot(&[]);
        history.snapshot(&[element(1.0)]);
        history.snapshot(&[element(2.0)]);
        assert_eq!(history.len(), 2);

        let live = vec![element(3.0)];
        assert!(history.undo(&live).is_some());
        assert!(history.undo(&live).is_some());
        assert!(history.undo(&live).is_none());
    }
}
