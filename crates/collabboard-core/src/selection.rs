//! Selection state.

use crate::shapes::ElementId;

/// Ordered set of selected element ids.
///
/// Order is the order ids were selected in, which is also the order bulk
/// commands (duplicate, copy) process them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single id.
    pub fn replace(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Add `id` if not already selected.
    pub fn add(&mut self, id: ElementId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with `ids`, dropping duplicates.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&ElementId) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_replace_and_toggle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection::new();

        selection.replace(a);
        selection.toggle(b);
        assert_eq!(selection.ids(), &[a, b]);

        selection.toggle(a);
        assert_eq!(selection.ids(), &[b]);

        selection.replace(a);
        assert_eq!(selection.ids(), &[a]);
    }

    #[test]
    fn test_set_drops_duplicates() {
        let a = Uuid::new_v4();
        let mut selection = Selection::new();
        selection.set([a, a]);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_retain() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection::new();
        selection.set([a, b]);
        selection.retain(|id| *id != a);
        assert!(!selection.contains(a));
        assert!(selection.contains(b));
    }
}
