//! CollabBoard Render Library
//!
//! Turns whiteboard state into a backend-neutral display list, with a
//! tiny-skia raster backend and PNG export on top.

pub mod export;
pub mod raster;
mod renderer;

pub use export::{encode_png, export_file_name, export_png, render_png};
pub use raster::RasterBackend;
pub use renderer::{
    DisplayList, DrawCommand, FontSpec, LINE_HEIGHT, RenderBackend, RenderContext, RenderError,
    RenderResult, STICKY_PADDING, StrokeStyle, render,
};
