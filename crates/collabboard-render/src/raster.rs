//! Software raster backend built on tiny-skia.

use crate::renderer::{DisplayList, DrawCommand, RenderBackend, RenderError, RenderResult, StrokeStyle};
use collabboard_core::import::decode_data_url;
use collabboard_core::shapes::SerializableColor;
use kurbo::{Affine, BezPath, PathEl, Rect};
use std::collections::HashMap;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, StrokeDash, Transform,
};

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    alpha: f64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// Rasterizes display lists into an RGBA pixmap.
///
/// Text runs are skipped: there is no font stack behind this backend.
pub struct RasterBackend {
    pixmap: Pixmap,
    state: State,
    stack: Vec<State>,
    /// Decoded images keyed by source URL.
    images: HashMap<String, Option<Pixmap>>,
}

impl RasterBackend {
    /// Allocate a transparent surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            state: State::default(),
            stack: Vec::new(),
            images: HashMap::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Un-premultiplied RGBA8 pixels, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Un-premultiplied RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    fn transform(&self) -> Transform {
        to_skia_transform(self.state.transform)
    }

    fn paint(&self, color: SerializableColor) -> Paint<'static> {
        let color = color.with_opacity(self.state.alpha);
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let mut stroke = Stroke {
            width: style.width as f32,
            ..Default::default()
        };
        if style.round {
            stroke.line_cap = LineCap::Round;
            stroke.line_join = LineJoin::Round;
        }
        if !style.dash.is_empty() {
            stroke.dash = StrokeDash::new(style.dash.iter().map(|d| *d as f32).collect(), 0.0);
        }
        let paint = self.paint(style.color);
        let transform = self.transform();
        self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }

    fn fill_path(&mut self, path: &BezPath, color: SerializableColor) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.transform();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    fn draw_image(&mut self, src: &str, rect: Rect) {
        let image = self
            .images
            .entry(src.to_string())
            .or_insert_with(|| decode_image(src));
        let Some(image) = image else {
            return;
        };
        let transform = self.state.transform
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(
                rect.width() / image.width() as f64,
                rect.height() / image.height() as f64,
            );
        let paint = PixmapPaint {
            opacity: self.state.alpha as f32,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            to_skia_transform(transform),
            None,
        );
    }
}

impl RenderBackend for RasterBackend {
    fn execute(&mut self, list: &DisplayList) -> RenderResult<()> {
        for command in &list.commands {
            match command {
                DrawCommand::Clear(color) => {
                    self.pixmap.fill(tiny_skia::Color::from_rgba8(
                        color.r, color.g, color.b, color.a,
                    ));
                }
                DrawCommand::Save => self.stack.push(self.state),
                DrawCommand::Restore => {
                    self.state = self.stack.pop().ok_or_else(|| {
                        RenderError::RenderFailed("restore without matching save".to_string())
                    })?;
                }
                DrawCommand::Transform(affine) => {
                    self.state.transform = self.state.transform * *affine;
                }
                DrawCommand::SetAlpha(alpha) => {
                    self.state.alpha *= alpha.clamp(0.0, 1.0);
                }
                DrawCommand::StrokePath { path, stroke } => self.stroke_path(path, stroke),
                DrawCommand::FillPath { path, color } => self.fill_path(path, *color),
                DrawCommand::FillText { text, .. } => {
                    log::trace!("Skipping text run {text:?}");
                }
                DrawCommand::DrawImage { src, rect } => self.draw_image(src, *rect),
            }
        }
        Ok(())
    }
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path. Returns None for empty or degenerate paths.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Decode a `data:` URL into a premultiplied pixmap.
fn decode_image(src: &str) -> Option<Pixmap> {
    let Some((_, bytes)) = decode_data_url(src) else {
        log::warn!("Unsupported image source");
        return None;
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            log::warn!("Failed to decode image: {e}");
            return None;
        }
    };
    let (width, height) = decoded.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(decoded.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RenderContext, render};
    use collabboard_core::shapes::{Element, ElementKind};
    use collabboard_core::tools::DrawingContext;
    use collabboard_core::viewport::Viewport;
    use kurbo::{Point, Shape as _, Size};

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            RasterBackend::new(0, 10),
            Err(RenderError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_clear_fills_surface() {
        let mut backend = RasterBackend::new(4, 4).unwrap();
        let list = DisplayList {
            commands: vec![DrawCommand::Clear(SerializableColor::new(10, 20, 30, 255))],
            painted: Vec::new(),
        };
        backend.execute(&list).unwrap();
        assert_eq!(backend.pixel(3, 3), Some([10, 20, 30, 255]));
        assert_eq!(backend.to_rgba().len(), 4 * 4 * 4);
    }

    #[test]
    fn test_unbalanced_restore_fails() {
        let mut backend = RasterBackend::new(4, 4).unwrap();
        let list = DisplayList {
            commands: vec![DrawCommand::Restore],
            painted: Vec::new(),
        };
        assert!(backend.execute(&list).is_err());
    }

    #[test]
    fn test_filled_rectangle_under_transform() {
        let mut backend = RasterBackend::new(40, 40).unwrap();
        let list = DisplayList {
            commands: vec![
                DrawCommand::Clear(SerializableColor::white()),
                DrawCommand::Save,
                DrawCommand::Transform(Affine::scale(2.0)),
                DrawCommand::FillPath {
                    path: Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
                    color: SerializableColor::new(255, 0, 0, 255),
                },
                DrawCommand::Restore,
            ],
            painted: Vec::new(),
        };
        backend.execute(&list).unwrap();
        assert_eq!(backend.pixel(15, 15), Some([255, 0, 0, 255]));
        assert_eq!(backend.pixel(30, 30), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_render_sticky_note() {
        let mut sticky = Element::new(
            ElementKind::Sticky,
            Point::new(5.0, 5.0),
            &DrawingContext::default(),
            "local",
        );
        sticky.width = Some(30.0);
        sticky.height = Some(30.0);
        sticky.text = Some("hi".to_string());
        let elements = vec![sticky];
        let viewport = Viewport::default();
        let list = render(&RenderContext::new(&elements, &viewport, Size::new(40.0, 40.0)).with_grid(false));

        let mut backend = RasterBackend::new(40, 40).unwrap();
        backend.execute(&list).unwrap();
        assert_eq!(backend.pixel(20, 20), Some([254, 240, 138, 255]));
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let mut backend = RasterBackend::new(8, 8).unwrap();
        let list = DisplayList {
            commands: vec![DrawCommand::DrawImage {
                src: "data:image/png;base64,AQID".to_string(),
                rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            }],
            painted: Vec::new(),
        };
        backend.execute(&list).unwrap();
        assert_eq!(backend.pixel(4, 4), Some([0, 0, 0, 0]));
    }
}
