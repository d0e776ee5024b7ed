//! CollabBoard Core Library
//!
//! Platform-agnostic scene model, undo history, viewport and input routing
//! for the CollabCode whiteboard.

pub mod canvas;
pub mod collaboration;
pub mod config;
pub mod error;
pub mod event_handler;
pub mod history;
pub mod import;
pub mod input;
pub mod presentation;
pub mod selection;
pub mod shapes;
pub mod tools;
pub mod viewport;

pub use canvas::{Scene, Whiteboard, paint_order};
pub use collaboration::{CollaboratorCursor, PresenceFeed, StaticPresence};
pub use config::WhiteboardConfig;
pub use error::{WhiteboardError, WhiteboardResult};
pub use event_handler::{EventHandler, InputResponse};
pub use history::History;
pub use import::{ImageUpload, accepts_presentation};
pub use input::{Modifiers, MouseButton, PointerEvent};
pub use presentation::{Deck, Slide, SlideSource, StaticSlides};
pub use selection::Selection;
pub use shapes::{Element, ElementId, ElementKind, ElementPatch, ElementStyle, SerializableColor};
pub use tools::{DrawingContext, ToolKind};
pub use viewport::Viewport;
