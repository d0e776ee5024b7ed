//! Scene store and whiteboard state.

use crate::collaboration::{CollaboratorCursor, PresenceFeed};
use crate::config::WhiteboardConfig;
use crate::error::WhiteboardResult;
use crate::history::History;
use crate::presentation::{Deck, SlideSource};
use crate::selection::Selection;
use crate::shapes::{Element, ElementId, ElementPatch};
use crate::tools::{DrawingContext, ToolKind};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};

/// Elements in paint order: ascending layer, ties kept in list order.
pub fn paint_order(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|e| e.layer);
    ordered
}

/// The ordered list of elements being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element. Geometry is not validated.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id();
        self.elements.push(element);
        id
    }

    /// Patch the element with `id`. Returns false if it does not exist.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.update_with(id, |e| patch.apply(e))
    }

    /// Run `f` on the element with `id`. Returns false if it does not exist.
    pub fn update_with(&mut self, id: ElementId, f: impl FnOnce(&mut Element)) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    /// Remove every element whose id is in `ids`. Returns how many were removed.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !ids.contains(&e.id));
        before - self.elements.len()
    }

    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements whose bounding box contains `point`, topmost first.
    pub fn elements_at_point(&self, point: Point, default_size: Size) -> Vec<ElementId> {
        self.painted_order()
            .into_iter()
            .rev()
            .filter(|e| e.contains_point(point, default_size))
            .map(|e| e.id)
            .collect()
    }

    /// Elements in the order they are painted.
    pub fn painted_order(&self) -> Vec<&Element> {
        paint_order(&self.elements)
    }
}

/// Everything one mounted whiteboard owns: scene, history, view and tools.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    config: WhiteboardConfig,
    scene: Scene,
    history: History,
    selection: Selection,
    deck: Deck,
    collaborators: Vec<CollaboratorCursor>,
    clipboard: Vec<Element>,
    /// Pastes since the last copy; scales the paste offset.
    paste_count: u32,
    needs_redraw: bool,
    pub viewport: Viewport,
    /// Tool and style applied to new elements.
    pub drawing: DrawingContext,
    pub show_grid: bool,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Whiteboard {
    /// Create an empty whiteboard. Callers outside the crate go through `try_new`.
    pub(crate) fn new(config: WhiteboardConfig) -> Self {
        Self {
            history: History::with_capacity(config.history_capacity),
            viewport: Viewport::from_config(&config),
            config,
            scene: Scene::new(),
            selection: Selection::new(),
            deck: Deck::default(),
            collaborators: Vec::new(),
            clipboard: Vec::new(),
            paste_count: 0,
            needs_redraw: true,
            drawing: DrawingContext::default(),
            show_grid: true,
        }
    }

    /// Validate `config`, then create a whiteboard from it.
    pub fn try_new(config: WhiteboardConfig) -> WhiteboardResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn collaborators(&self) -> &[CollaboratorCursor] {
        &self.collaborators
    }

    /// Size assumed for elements without an explicit width/height.
    pub fn default_size(&self) -> Size {
        Size::new(self.config.default_width, self.config.default_height)
    }

    pub fn is_presenting(&self) -> bool {
        self.deck.is_active()
    }

    /// The element list currently shown: the scene, or the current slide.
    pub fn active_elements(&self) -> &[Element] {
        if self.deck.is_active() {
            if let Some(slide) = self.deck.current_slide() {
                return &slide.elements;
            }
        }
        self.scene.elements()
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Snapshot the scene before a mutation.
    pub(crate) fn record_history(&mut self) {
        self.history.snapshot(self.scene.elements());
    }

    /// Add an element as its own undo step and select it.
    pub fn insert_element(&mut self, element: Element) -> ElementId {
        self.record_history();
        let id = self.scene.add_element(element);
        self.selection.replace(id);
        self.needs_redraw = true;
        id
    }

    /// Add an element without recording history. Used while a gesture is in flight.
    pub(crate) fn push_element(&mut self, element: Element) -> ElementId {
        let id = self.scene.add_element(element);
        self.selection.replace(id);
        self.needs_redraw = true;
        id
    }

    /// Mutate an element in place without recording history.
    pub(crate) fn modify_element(&mut self, id: ElementId, f: impl FnOnce(&mut Element)) {
        if self.scene.update_with(id, f) {
            self.needs_redraw = true;
        }
    }

    /// Apply a style/geometry patch as one undo step.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.record_history();
        self.scene.update_element(id, patch);
        self.needs_redraw = true;
        true
    }

    /// Hit-test at a scene point. Plain clicks replace the selection, `toggle` flips membership.
    pub fn select_at(&mut self, point: Point, toggle: bool) -> Option<ElementId> {
        let hit = self
            .scene
            .elements_at_point(point, self.default_size())
            .first()
            .copied();
        match (hit, toggle) {
            (Some(id), true) => self.selection.toggle(id),
            (Some(id), false) => self.selection.replace(id),
            (None, true) => {}
            (None, false) => self.selection.clear(),
        }
        self.needs_redraw = true;
        hit
    }

    /// Remove unlocked elements under an eraser at `point` (scene units).
    ///
    /// When `record` is set and something is hit, history is snapshotted first.
    pub fn erase_at(&mut self, point: Point, radius: f64, record: bool) -> usize {
        let default_size = self.default_size();
        let hits: Vec<ElementId> = self
            .scene
            .elements()
            .iter()
            .filter(|e| !e.locked && e.is_under_eraser(point, radius, default_size))
            .map(|e| e.id)
            .collect();
        if hits.is_empty() {
            return 0;
        }
        if record {
            self.record_history();
        }
        let removed = self.scene.remove_elements(&hits);
        self.selection.retain(|id| !hits.contains(id));
        self.needs_redraw = true;
        removed
    }

    /// Restore the previous snapshot. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.scene.elements()) {
            Some(elements) => {
                self.restore(elements);
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone snapshot. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(elements) => {
                self.restore(elements);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, elements: Vec<Element>) {
        self.scene.replace_all(elements);
        let scene = &self.scene;
        self.selection.retain(|id| scene.contains(*id));
        self.needs_redraw = true;
    }

    /// Select a single element (clears previous selection). Unknown ids are ignored.
    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.selection.replace(id);
        self.needs_redraw = true;
        true
    }

    pub fn select_all(&mut self) {
        self.selection.set(self.scene.ids());
        self.needs_redraw = true;
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.needs_redraw = true;
        }
    }

    /// Delete selected elements, skipping locked ones. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let targets: Vec<ElementId> = self
            .selection
            .ids()
            .iter()
            .copied()
            .filter(|&id| self.scene.get(id).is_some_and(|e| !e.locked))
            .collect();
        if targets.is_empty() {
            return 0;
        }
        self.record_history();
        let removed = self.scene.remove_elements(&targets);
        self.selection.retain(|id| !targets.contains(id));
        self.needs_redraw = true;
        log::debug!("Deleted {removed} element(s)");
        removed
    }

    /// Clone the selection with fresh ids, offset by the configured delta.
    /// The clones become the new selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let sources = self.selected_elements();
        let offset = self.config.duplicate_offset;
        self.insert_clones(sources, Vec2::new(offset, offset))
    }

    /// Stage deep copies of the selection. Returns how many were copied.
    pub fn copy_selected(&mut self) -> usize {
        self.clipboard = self.selected_elements();
        self.paste_count = 0;
        log::debug!("Copied {} element(s)", self.clipboard.len());
        self.clipboard.len()
    }

    /// Insert the staged copies, each paste offset one step further.
    pub fn paste(&mut self) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.paste_count += 1;
        let step = self.config.duplicate_offset * self.paste_count as f64;
        self.insert_clones(self.clipboard.clone(), Vec2::new(step, step))
    }

    /// The staged copies as JSON, for pasting into another board.
    pub fn clipboard_json(&self) -> WhiteboardResult<String> {
        Ok(serde_json::to_string(&self.clipboard)?)
    }

    /// Paste elements from a JSON payload produced by [`Whiteboard::clipboard_json`].
    pub fn paste_json(&mut self, json: &str) -> WhiteboardResult<Vec<ElementId>> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        let offset = self.config.duplicate_offset;
        Ok(self.insert_clones(elements, Vec2::new(offset, offset)))
    }

    fn selected_elements(&self) -> Vec<Element> {
        self.selection
            .ids()
            .iter()
            .filter_map(|&id| self.scene.get(id).cloned())
            .collect()
    }

    fn insert_clones(&mut self, sources: Vec<Element>, delta: Vec2) -> Vec<ElementId> {
        if sources.is_empty() {
            return Vec::new();
        }
        self.record_history();
        let ids: Vec<ElementId> = sources
            .iter()
            .map(|source| {
                let mut clone = source.with_fresh_identity();
                clone.translate(delta);
                self.scene.add_element(clone)
            })
            .collect();
        self.selection.set(ids.iter().copied());
        self.needs_redraw = true;
        ids
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.needs_redraw = true;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.needs_redraw = true;
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.needs_redraw = true;
    }

    /// Pan the view by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
        self.needs_redraw = true;
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
        self.needs_redraw = true;
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.drawing.tool = tool;
    }

    pub fn tool(&self) -> ToolKind {
        self.drawing.tool
    }

    /// Replace the slides from a slide source.
    pub fn load_slides(&mut self, source: &dyn SlideSource) {
        self.deck.load(source.slides());
        self.needs_redraw = true;
    }

    /// Enter presentation mode. Returns false when there are no slides.
    pub fn enter_presentation(&mut self) -> bool {
        let entered = self.deck.enter();
        if entered {
            self.needs_redraw = true;
        }
        entered
    }

    pub fn exit_presentation(&mut self) {
        self.deck.exit();
        self.needs_redraw = true;
    }

    pub fn next_slide(&mut self) -> bool {
        let moved = self.deck.next();
        self.needs_redraw |= moved;
        moved
    }

    pub fn previous_slide(&mut self) -> bool {
        let moved = self.deck.previous();
        self.needs_redraw |= moved;
        moved
    }

    /// Pull the latest collaborator cursors from a presence feed.
    pub fn refresh_presence(&mut self, feed: &dyn PresenceFeed) {
        self.collaborators = feed.cursors();
        self.needs_redraw = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{Slide, StaticSlides};
    use crate::shapes::ElementKind;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut e = Element::new(
            ElementKind::Rectangle,
            Point::new(x, y),
            &DrawingContext::default(),
            "local",
        );
        e.width = Some(w);
        e.height = Some(h);
        e
    }

    #[test]
    fn test_scene_add_and_remove() {
        let mut scene = Scene::new();
        let id = scene.add_element(rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(id).is_some());

        assert_eq!(scene.remove_elements(&[id, ElementId::new_v4()]), 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_scene_update_unknown_id_is_noop() {
        let mut scene = Scene::new();
        scene.add_element(rect(0.0, 0.0, 10.0, 10.0));
        let before = scene.clone();
        let patch = ElementPatch {
            x: Some(5.0),
            ..Default::default()
        };
        assert!(!scene.update_element(ElementId::new_v4(), &patch));
        assert_eq!(scene, before);
    }

    #[test]
    fn test_painted_order_is_stable_by_layer() {
        let mut scene = Scene::new();
        let mut a = rect(0.0, 0.0, 10.0, 10.0);
        a.layer = 2;
        let b = rect(0.0, 0.0, 10.0, 10.0);
        let c = rect(0.0, 0.0, 10.0, 10.0);
        let (ida, idb, idc) = (a.id(), b.id(), c.id());
        scene.add_element(a);
        scene.add_element(b);
        scene.add_element(c);

        let order: Vec<_> = scene.painted_order().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![idb, idc, ida]);
    }

    #[test]
    fn test_elements_at_point_topmost_first() {
        let mut scene = Scene::new();
        let below = scene.add_element(rect(0.0, 0.0, 100.0, 100.0));
        let above = scene.add_element(rect(50.0, 50.0, 100.0, 100.0));

        let hits = scene.elements_at_point(Point::new(75.0, 75.0), Size::new(100.0, 60.0));
        assert_eq!(hits, vec![above, below]);
    }

    #[test]
    fn test_delete_skips_locked() {
        let mut board = Whiteboard::default();
        let mut locked = rect(0.0, 0.0, 10.0, 10.0);
        locked.locked = true;
        let locked_id = board.insert_element(locked);
        let free_id = board.insert_element(rect(20.0, 0.0, 10.0, 10.0));
        board.select_all();

        assert_eq!(board.delete_selected(), 1);
        assert!(board.scene().contains(locked_id));
        assert!(!board.scene().contains(free_id));
        assert!(!board.selection().contains(free_id));
    }

    #[test]
    fn test_paste_offsets_accumulate() {
        let mut board = Whiteboard::default();
        let id = board.insert_element(rect(0.0, 0.0, 10.0, 10.0));
        board.selection.replace(id);
        assert_eq!(board.copy_selected(), 1);

        let first = board.paste();
        let second = board.paste();
        let x = |id: ElementId| board.scene().get(id).map(|e| e.x);
        assert_eq!(x(first[0]), Some(20.0));
        assert_eq!(x(second[0]), Some(40.0));
        assert_eq!(board.selection().ids(), second.as_slice());
    }

    #[test]
    fn test_paste_with_empty_clipboard() {
        let mut board = Whiteboard::default();
        assert!(board.paste().is_empty());
        assert!(!board.history().can_undo());
    }

    #[test]
    fn test_clipboard_json_across_boards() {
        let mut source = Whiteboard::default();
        source.insert_element(rect(0.0, 0.0, 10.0, 10.0));
        source.select_all();
        source.copy_selected();
        let json = source.clipboard_json().unwrap();

        let mut target = Whiteboard::default();
        let ids = target.paste_json(&json).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(target.scene().len(), 1);
        assert!(target.paste_json("not json").is_err());
    }

    #[test]
    fn test_eraser_skips_locked_and_clears_selection() {
        let mut board = Whiteboard::default();
        let id = board.insert_element(rect(0.0, 0.0, 10.0, 10.0));
        let mut locked = rect(0.0, 0.0, 10.0, 10.0);
        locked.locked = true;
        let locked_id = board.insert_element(locked);
        board.select_all();

        assert_eq!(board.erase_at(Point::new(5.0, 5.0), 10.0, true), 1);
        assert!(!board.selection().contains(id));
        assert!(board.selection().contains(locked_id));
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut board = Whiteboard::default();
        let id = board.insert_element(rect(0.0, 0.0, 10.0, 10.0));
        assert!(board.selection().contains(id));
        assert!(board.undo());
        assert!(board.selection().is_empty());
        assert!(board.redo());
        assert!(board.scene().contains(id));
    }

    #[test]
    fn test_presentation_swaps_active_elements() {
        let mut board = Whiteboard::default();
        board.insert_element(rect(0.0, 0.0, 10.0, 10.0));
        assert!(!board.enter_presentation());

        let slide = Slide::new("1", "Intro").with_elements(vec![
            rect(0.0, 0.0, 5.0, 5.0),
            rect(5.0, 5.0, 5.0, 5.0),
        ]);
        board.load_slides(&StaticSlides::new(vec![slide]));
        assert!(board.enter_presentation());
        assert_eq!(board.active_elements().len(), 2);
        board.exit_presentation();
        assert_eq!(board.active_elements().len(), 1);
    }

    #[test]
    fn test_try_new_rejects_inverted_zoom_bounds() {
        let config = WhiteboardConfig {
            min_zoom: 600.0,
            ..Default::default()
        };
        assert!(Whiteboard::try_new(config).is_err());
        assert!(Whiteboard::try_new(WhiteboardConfig::default()).is_ok());
    }

    #[test]
    fn test_take_needs_redraw() {
        let mut board = Whiteboard::default();
        assert!(board.take_needs_redraw());
        assert!(!board.take_needs_redraw());
        board.zoom_in();
        assert!(board.take_needs_redraw());
    }
}
