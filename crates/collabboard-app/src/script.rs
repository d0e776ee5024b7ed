//! Scripted input: a replayable list of gestures and key presses.

use collabboard_core::{
    EventHandler, ImageUpload, InputResponse, Modifiers, MouseButton, PointerEvent, ToolKind,
    Whiteboard,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// One scripted input step. Positions are screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Switch the active tool.
    Tool(ToolKind),
    /// Press at `from`, move to `to`, release.
    Drag { from: [f64; 2], to: [f64; 2] },
    /// Press and release at one point.
    Click {
        at: [f64; 2],
        #[serde(default)]
        shift: bool,
    },
    /// Place a text element at `at` with the text tool.
    Text { at: [f64; 2], content: String },
    /// Scroll at `at`; with `ctrl` the wheel zooms instead of panning.
    Scroll {
        at: [f64; 2],
        delta: [f64; 2],
        #[serde(default)]
        ctrl: bool,
    },
    /// A key press, named like DOM `KeyboardEvent.key`.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    /// Upload an image file at `at` with the image tool.
    Image {
        at: [f64; 2],
        file_name: String,
        mime_type: String,
        /// Base64-encoded file contents.
        data: String,
    },
}

fn point(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

fn press(at: Point) -> PointerEvent {
    PointerEvent::Down {
        position: at,
        button: MouseButton::Left,
    }
}

fn release(at: Point) -> PointerEvent {
    PointerEvent::Up {
        position: at,
        button: MouseButton::Left,
    }
}

/// Feed one step through the input router.
pub fn replay(handler: &mut EventHandler, board: &mut Whiteboard, step: &Step) {
    match step {
        Step::Tool(tool) => board.set_tool(*tool),
        Step::Drag { from, to } => {
            let (from, to) = (point(*from), point(*to));
            handler.handle_pointer(board, press(from), Modifiers::NONE);
            handler.handle_pointer(board, PointerEvent::Move { position: to }, Modifiers::NONE);
            handler.handle_pointer(board, release(to), Modifiers::NONE);
        }
        Step::Click { at, shift } => {
            let at = point(*at);
            let modifiers = Modifiers {
                shift: *shift,
                ..Modifiers::NONE
            };
            handler.handle_pointer(board, press(at), modifiers);
            handler.handle_pointer(board, release(at), modifiers);
        }
        Step::Text { at, content } => {
            board.set_tool(ToolKind::Text);
            let at = point(*at);
            let response = handler.handle_pointer(board, press(at), Modifiers::NONE);
            handler.handle_pointer(board, release(at), Modifiers::NONE);
            if matches!(response, InputResponse::RequestText { .. }) {
                handler.commit_text(board, content);
            }
        }
        Step::Scroll { at, delta, ctrl } => {
            let event = PointerEvent::Scroll {
                position: point(*at),
                delta: Vec2::new(delta[0], delta[1]),
            };
            let modifiers = Modifiers {
                ctrl: *ctrl,
                ..Modifiers::NONE
            };
            handler.handle_pointer(board, event, modifiers);
        }
        Step::Key { key, ctrl, shift } => {
            let modifiers = Modifiers {
                ctrl: *ctrl,
                shift: *shift,
                ..Modifiers::NONE
            };
            if !handler.handle_key(board, key, modifiers) {
                log::debug!("Key {key:?} was not handled");
            }
        }
        Step::Image {
            at,
            file_name,
            mime_type,
            data,
        } => {
            use base64::Engine as _;
            let bytes = match base64::engine::general_purpose::STANDARD.decode(data) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Skipping image {file_name}: {e}");
                    return;
                }
            };
            board.set_tool(ToolKind::Image);
            let at = point(*at);
            let response = handler.handle_pointer(board, press(at), Modifiers::NONE);
            handler.handle_pointer(board, release(at), Modifiers::NONE);
            if matches!(response, InputResponse::RequestImage { .. }) {
                let upload = ImageUpload::new(file_name.clone(), mime_type.clone(), bytes);
                handler.commit_image(board, &upload);
            }
        }
    }
}

/// The script replayed when the config does not provide one.
pub fn demo_script() -> Vec<Step> {
    vec![
        Step::Tool(ToolKind::Rectangle),
        Step::Drag {
            from: [120.0, 120.0],
            to: [360.0, 260.0],
        },
        Step::Tool(ToolKind::Circle),
        Step::Drag {
            from: [460.0, 140.0],
            to: [580.0, 260.0],
        },
        Step::Tool(ToolKind::Arrow),
        Step::Drag {
            from: [360.0, 190.0],
            to: [460.0, 200.0],
        },
        Step::Tool(ToolKind::Sticky),
        Step::Drag {
            from: [700.0, 120.0],
            to: [880.0, 280.0],
        },
        Step::Text {
            at: [140.0, 300.0],
            content: "CollabCode whiteboard".to_string(),
        },
        Step::Tool(ToolKind::Pen),
        Step::Drag {
            from: [140.0, 400.0],
            to: [420.0, 460.0],
        },
        Step::Tool(ToolKind::Select),
        Step::Click {
            at: [200.0, 180.0],
            shift: false,
        },
    ]
}
