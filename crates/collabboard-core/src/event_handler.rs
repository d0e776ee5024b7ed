//! Input router: turns pointer and key events into whiteboard operations.

use crate::canvas::Whiteboard;
use crate::import::{DEFAULT_IMAGE_SIZE, ImageUpload};
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::shapes::{Element, ElementId, ElementKind};
use crate::tools::ToolKind;
use kurbo::Point;

/// What the host should do after an event was routed.
#[derive(Debug, Clone, PartialEq)]
pub enum InputResponse {
    /// Nothing visible changed.
    None,
    /// Schedule a frame.
    Redraw,
    /// Open the text entry modal; confirm with [`EventHandler::commit_text`].
    RequestText { position: Point },
    /// Open the image picker; confirm with [`EventHandler::commit_image`].
    RequestImage { position: Point },
}

/// Gesture in progress between a press and its release.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Last pointer position in screen pixels.
    Panning { last: Point },
    /// Growing a box-shaped element.
    Drawing { id: ElementId },
    /// Extending a pen stroke.
    Stroking { id: ElementId },
    /// `recorded` is set once this stroke has snapshotted history.
    Erasing { recorded: bool },
}

/// A modal flow waiting for the host to supply content.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Text(Point),
    Image(Point),
}

/// Routes input events to whiteboard mutations for the active tool.
#[derive(Debug, Clone)]
pub struct EventHandler {
    gesture: Gesture,
    pending: Option<Pending>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            pending: None,
        }
    }

    /// Whether a press-drag gesture is in progress.
    pub fn is_busy(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    /// Whether a text or image modal is open.
    pub fn has_pending_input(&self) -> bool {
        self.pending.is_some()
    }

    /// Route one pointer event. Positions are in screen pixels.
    pub fn handle_pointer(
        &mut self,
        board: &mut Whiteboard,
        event: PointerEvent,
        modifiers: Modifiers,
    ) -> InputResponse {
        match event {
            PointerEvent::Down { position, button } => {
                self.handle_press(board, position, button, modifiers)
            }
            PointerEvent::Move { position } => self.handle_drag(board, position),
            PointerEvent::Up { .. } | PointerEvent::Cancel => {
                self.gesture = Gesture::Idle;
                InputResponse::None
            }
            PointerEvent::Scroll { position, delta } => {
                if modifiers.command() {
                    if delta.y < 0.0 {
                        board.zoom_in();
                    } else if delta.y > 0.0 {
                        board.zoom_out();
                    }
                } else {
                    board.pan_by(-delta);
                }
                log::debug!("Scroll at {position:?} by {delta:?}");
                InputResponse::Redraw
            }
        }
    }

    fn handle_press(
        &mut self,
        board: &mut Whiteboard,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> InputResponse {
        // Panning wins over every tool.
        if button == MouseButton::Middle || (button == MouseButton::Left && modifiers.alt) {
            self.gesture = Gesture::Panning { last: position };
            return InputResponse::None;
        }
        if button != MouseButton::Left {
            return InputResponse::None;
        }
        if board.is_presenting() {
            log::debug!("Ignoring press while presenting");
            return InputResponse::None;
        }

        let world = board.viewport.screen_to_world(position);
        let tool = board.tool();
        match tool {
            ToolKind::Select => {
                board.select_at(world, modifiers.shift);
                InputResponse::Redraw
            }
            ToolKind::Eraser => {
                let recorded = self.erase(board, world, false);
                self.gesture = Gesture::Erasing { recorded };
                InputResponse::Redraw
            }
            ToolKind::Text => {
                self.pending = Some(Pending::Text(world));
                InputResponse::RequestText { position: world }
            }
            ToolKind::Image => {
                self.pending = Some(Pending::Image(world));
                InputResponse::RequestImage { position: world }
            }
            ToolKind::Pen => {
                let id = self.start_element(board, ElementKind::Pen, world);
                self.gesture = Gesture::Stroking { id };
                InputResponse::Redraw
            }
            _ => match tool.element_kind() {
                Some(kind) if tool.creates_box() => {
                    let id = self.start_element(board, kind, world);
                    self.gesture = Gesture::Drawing { id };
                    InputResponse::Redraw
                }
                _ => InputResponse::None,
            },
        }
    }

    fn handle_drag(&mut self, board: &mut Whiteboard, position: Point) -> InputResponse {
        if let Gesture::Panning { last } = self.gesture {
            board.pan_by(position - last);
            self.gesture = Gesture::Panning { last: position };
            return InputResponse::Redraw;
        }
        if self.gesture == Gesture::Idle {
            return InputResponse::None;
        }
        if board.is_presenting() {
            self.gesture = Gesture::Idle;
            return InputResponse::None;
        }

        let world = board.viewport.screen_to_world(position);
        match self.gesture {
            Gesture::Drawing { id } => board.modify_element(id, |e| e.drag_to(world)),
            Gesture::Stroking { id } => board.modify_element(id, |e| e.push_point(world)),
            Gesture::Erasing { recorded } => {
                let recorded = self.erase(board, world, recorded);
                self.gesture = Gesture::Erasing { recorded };
            }
            Gesture::Idle | Gesture::Panning { .. } => {}
        }
        InputResponse::Redraw
    }

    fn start_element(&self, board: &mut Whiteboard, kind: ElementKind, world: Point) -> ElementId {
        board.record_history();
        let user_id = board.config().local_user_id.clone();
        let element = Element::new(kind, world, &board.drawing, &user_id);
        board.push_element(element)
    }

    /// Erase at `world`, snapshotting history before the first deletion of a stroke.
    fn erase(&self, board: &mut Whiteboard, world: Point, recorded: bool) -> bool {
        let radius = board.config().eraser_radius / board.viewport.scale();
        let removed = board.erase_at(world, radius, !recorded);
        recorded || removed > 0
    }

    /// Route one key press. Returns true if the key was consumed.
    pub fn handle_key(&mut self, board: &mut Whiteboard, key: &str, modifiers: Modifiers) -> bool {
        if board.is_presenting() {
            return match key {
                "Escape" => {
                    board.exit_presentation();
                    true
                }
                "ArrowRight" | " " | "Space" => {
                    board.next_slide();
                    true
                }
                "ArrowLeft" => {
                    board.previous_slide();
                    true
                }
                _ => false,
            };
        }

        if modifiers.command() {
            return match key.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => {
                    board.redo();
                    true
                }
                "z" => {
                    board.undo();
                    true
                }
                "c" => {
                    board.copy_selected();
                    true
                }
                "v" => {
                    board.paste();
                    true
                }
                "a" => {
                    board.select_all();
                    true
                }
                "d" => {
                    board.duplicate_selected();
                    true
                }
                _ => false,
            };
        }

        match key {
            "Delete" | "Backspace" => {
                board.delete_selected();
                true
            }
            "Escape" => {
                self.pending = None;
                board.clear_selection();
                true
            }
            _ if modifiers.alt => false,
            _ => match ToolKind::from_shortcut(key) {
                Some(tool) => {
                    board.set_tool(tool);
                    true
                }
                None => false,
            },
        }
    }

    /// Confirm the text modal. Empty or whitespace-only text creates nothing.
    pub fn commit_text(&mut self, board: &mut Whiteboard, text: &str) -> Option<ElementId> {
        let Some(Pending::Text(position)) = self.pending else {
            return None;
        };
        self.pending = None;
        if board.is_presenting() {
            log::debug!("Dropping text entry while presenting");
            return None;
        }
        if text.trim().is_empty() {
            log::debug!("Discarding empty text entry");
            return None;
        }
        let user_id = board.config().local_user_id.clone();
        let mut element = Element::new(ElementKind::Text, position, &board.drawing, &user_id);
        element.text = Some(text.to_string());
        Some(board.insert_element(element))
    }

    pub fn cancel_text(&mut self) {
        if matches!(self.pending, Some(Pending::Text(_))) {
            self.pending = None;
        }
    }

    /// Confirm the image picker. Non-image uploads are ignored.
    pub fn commit_image(&mut self, board: &mut Whiteboard, upload: &ImageUpload) -> Option<ElementId> {
        let Some(Pending::Image(position)) = self.pending else {
            return None;
        };
        self.pending = None;
        if board.is_presenting() {
            log::debug!("Dropping upload {} while presenting", upload.file_name);
            return None;
        }
        if !upload.is_image() {
            log::debug!(
                "Ignoring upload {} with MIME type {}",
                upload.file_name,
                upload.mime_type
            );
            return None;
        }
        let user_id = board.config().local_user_id.clone();
        let mut element = Element::new(ElementKind::Image, position, &board.drawing, &user_id);
        element.width = Some(DEFAULT_IMAGE_SIZE.width);
        element.height = Some(DEFAULT_IMAGE_SIZE.height);
        element.src = Some(upload.data_url());
        log::info!("Placed image {}", upload.file_name);
        Some(board.insert_element(element))
    }

    pub fn cancel_image(&mut self) {
        if matches!(self.pending, Some(Pending::Image(_))) {
            self.pending = None;
        }
    }
}
