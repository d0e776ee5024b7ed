//! Drawable element definitions for the whiteboard.

mod geometry;
mod text;

pub use geometry::{ARROW_HEAD_LENGTH, arrow_head, circle_radius, normalized_box};
pub use text::{FontStyle, FontWeight, TextAlign, approx_text_width, wrap_text};

use crate::tools::DrawingContext;
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Milliseconds since the Unix epoch, used for element timestamps and export names.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Default sticky note paper.
    pub const fn sticky_yellow() -> Self {
        Self::new(254, 240, 138, 255)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scale the alpha channel by `opacity` (clamped to 0..=1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The kind of a drawable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Pen,
    Rectangle,
    Circle,
    Text,
    Arrow,
    Line,
    Sticky,
    Image,
}

impl ElementKind {
    /// Whether this kind carries text content.
    pub fn has_text(self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::Sticky)
    }
}

/// Style properties for elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke / primary color.
    pub color: SerializableColor,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Stroke width, at least 1.
    pub stroke_width: f64,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl ElementStyle {
    /// Default font size for text and sticky notes.
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    /// Default font family.
    pub const DEFAULT_FONT_FAMILY: &'static str = "sans-serif";

    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(Self::DEFAULT_FONT_SIZE)
    }

    pub fn font_family(&self) -> &str {
        self.font_family
            .as_deref()
            .unwrap_or(Self::DEFAULT_FONT_FAMILY)
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            fill_color: None,
            stroke_width: 2.0,
            font_size: None,
            font_family: None,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            text_align: TextAlign::default(),
        }
    }
}

fn default_layer() -> i32 {
    1
}

fn default_opacity() -> f64 {
    1.0
}

/// One drawable primitive on the whiteboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    pub kind: ElementKind,
    /// Creator of the element.
    pub user_id: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub x: f64,
    pub y: f64,
    /// Box width; negative when dragged backward.
    #[serde(default)]
    pub width: Option<f64>,
    /// Box height; negative when dragged backward.
    #[serde(default)]
    pub height: Option<f64>,
    /// Sampled stroke points (pen only), append-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    pub style: ElementStyle,
    /// Paint order, ascending.
    #[serde(default = "default_layer")]
    pub layer: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Rotation in degrees about the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub text: Option<String>,
    /// Image source (data URL) for image elements.
    #[serde(default)]
    pub src: Option<String>,
}

impl Element {
    /// Create an element at `origin` styled from the drawing context.
    ///
    /// Pen elements start with `origin` as their only point; box-shaped kinds
    /// start with a zero-size box that the drag gesture grows.
    pub fn new(kind: ElementKind, origin: Point, ctx: &DrawingContext, user_id: &str) -> Self {
        let (width, height, points) = match kind {
            ElementKind::Pen => (None, None, vec![origin]),
            ElementKind::Text => (None, None, Vec::new()),
            _ => (Some(0.0), Some(0.0), Vec::new()),
        };
        let mut style = ctx.style.clone();
        if kind == ElementKind::Sticky && style.fill_color.is_none() {
            style.fill_color = Some(SerializableColor::sticky_yellow());
        }
        Self {
            id: Uuid::new_v4(),
            kind,
            user_id: user_id.to_string(),
            timestamp: now_millis(),
            x: origin.x,
            y: origin.y,
            width,
            height,
            points,
            style,
            layer: ctx.layer,
            opacity: ctx.opacity,
            rotation: 0.0,
            locked: false,
            text: None,
            src: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Clone with a new id and creation timestamp.
    pub fn with_fresh_identity(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: now_millis(),
            ..self.clone()
        }
    }

    /// Width and height, falling back to `default` where absent. Signs are kept.
    pub fn size_or(&self, default: Size) -> Size {
        Size::new(
            self.width.unwrap_or(default.width),
            self.height.unwrap_or(default.height),
        )
    }

    /// Normalized axis-aligned bounding box.
    ///
    /// Pen strokes use the box around their points; other kinds use the
    /// origin plus width/height, defaulted to `default` when absent.
    pub fn bounds(&self, default: Size) -> Rect {
        if self.kind == ElementKind::Pen && !self.points.is_empty() {
            return self
                .points
                .iter()
                .skip(1)
                .fold(Rect::from_points(self.points[0], self.points[0]), |r, p| {
                    r.union_pt(*p)
                });
        }
        normalized_box(self.origin(), self.size_or(default))
    }

    /// Whether the bounding box contains `point`, edges included.
    pub fn contains_point(&self, point: Point, default: Size) -> bool {
        let b = self.bounds(default);
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// Whether an eraser at `point` with `radius` touches this element.
    ///
    /// Pen strokes match when any sampled point lies within `radius`;
    /// everything else matches on bounding-box containment.
    pub fn is_under_eraser(&self, point: Point, radius: f64, default: Size) -> bool {
        match self.kind {
            ElementKind::Pen => self
                .points
                .iter()
                .any(|p| p.distance(point) <= radius),
            _ => self.contains_point(point, default),
        }
    }

    /// Grow the element's box so its far corner sits at `point`.
    pub fn drag_to(&mut self, point: Point) {
        self.width = Some(point.x - self.x);
        self.height = Some(point.y - self.y);
    }

    /// Append a sampled point to a pen stroke.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Move the element and all its points by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        for p in &mut self.points {
            *p += delta;
        }
    }
}

/// A partial update for [`Element`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<SerializableColor>,
    /// `Some(None)` clears the fill.
    pub fill_color: Option<Option<SerializableColor>>,
    pub stroke_width: Option<f64>,
    pub layer: Option<i32>,
    pub opacity: Option<f64>,
    pub rotation: Option<f64>,
    pub locked: Option<bool>,
    pub text: Option<String>,
}

impl ElementPatch {
    /// Apply the patch to an element.
    pub fn apply(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(w) = self.width {
            element.width = Some(w);
        }
        if let Some(h) = self.height {
            element.height = Some(h);
        }
        if let Some(color) = self.color {
            element.style.color = color;
        }
        if let Some(fill) = self.fill_color {
            element.style.fill_color = fill;
        }
        if let Some(width) = self.stroke_width {
            element.style.stroke_width = width.max(1.0);
        }
        if let Some(layer) = self.layer {
            element.layer = layer;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        if let Some(text) = &self.text {
            element.text = Some(text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Size = Size::new(100.0, 60.0);

    fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut e = Element::new(
            ElementKind::Rectangle,
            Point::new(x, y),
            &DrawingContext::default(),
            "u1",
        );
        e.width = Some(w);
        e.height = Some(h);
        e
    }

    #[test]
    fn test_new_pen_starts_with_origin() {
        let e = Element::new(ElementKind::Pen, Point::new(3.0, 4.0), &DrawingContext::default(), "u1");
        assert_eq!(e.points, vec![Point::new(3.0, 4.0)]);
        assert!(e.width.is_none());
        assert_eq!(e.layer, 1);
        assert!((e.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_box_is_zero_sized() {
        let e = Element::new(ElementKind::Circle, Point::new(3.0, 4.0), &DrawingContext::default(), "u1");
        assert_eq!(e.width, Some(0.0));
        assert_eq!(e.height, Some(0.0));
    }

    #[test]
    fn test_sticky_gets_default_fill() {
        let e = Element::new(ElementKind::Sticky, Point::ZERO, &DrawingContext::default(), "u1");
        assert_eq!(e.style.fill_color, Some(SerializableColor::sticky_yellow()));
    }

    #[test]
    fn test_negative_size_bounds_are_normalized() {
        let e = rect_at(100.0, 100.0, -40.0, -20.0);
        let b = e.bounds(DEFAULT);
        assert_eq!(b, Rect::new(60.0, 80.0, 100.0, 100.0));
        assert!(e.contains_point(Point::new(70.0, 90.0), DEFAULT));
    }

    #[test]
    fn test_missing_size_uses_default() {
        let e = Element::new(ElementKind::Text, Point::new(10.0, 10.0), &DrawingContext::default(), "u1");
        assert!(e.contains_point(Point::new(109.0, 69.0), DEFAULT));
        assert!(!e.contains_point(Point::new(111.0, 20.0), DEFAULT));
    }

    #[test]
    fn test_pen_bounds_follow_points() {
        let mut e = Element::new(ElementKind::Pen, Point::new(10.0, 10.0), &DrawingContext::default(), "u1");
        e.push_point(Point::new(30.0, -5.0));
        assert_eq!(e.bounds(DEFAULT), Rect::new(10.0, -5.0, 30.0, 10.0));
    }

    #[test]
    fn test_eraser_hits_pen_points_only_within_radius() {
        let mut e = Element::new(ElementKind::Pen, Point::new(0.0, 0.0), &DrawingContext::default(), "u1");
        e.push_point(Point::new(50.0, 0.0));
        assert!(e.is_under_eraser(Point::new(48.0, 3.0), 5.0, DEFAULT));
        assert!(!e.is_under_eraser(Point::new(25.0, 0.0), 5.0, DEFAULT));
    }

    #[test]
    fn test_translate_moves_points() {
        let mut e = Element::new(ElementKind::Pen, Point::new(1.0, 1.0), &DrawingContext::default(), "u1");
        e.translate(Vec2::new(20.0, 20.0));
        assert_eq!(e.origin(), Point::new(21.0, 21.0));
        assert_eq!(e.points[0], Point::new(21.0, 21.0));
    }

    #[test]
    fn test_fresh_identity() {
        let e = rect_at(0.0, 0.0, 10.0, 10.0);
        let copy = e.with_fresh_identity();
        assert_ne!(e.id(), copy.id());
        assert_eq!(e.width, copy.width);
    }

    #[test]
    fn test_patch_clamps_values() {
        let mut e = rect_at(0.0, 0.0, 10.0, 10.0);
        ElementPatch {
            opacity: Some(3.0),
            stroke_width: Some(0.2),
            layer: Some(4),
            ..Default::default()
        }
        .apply(&mut e);
        assert!((e.opacity - 1.0).abs() < f64::EPSILON);
        assert!((e.style.stroke_width - 1.0).abs() < f64::EPSILON);
        assert_eq!(e.layer, 4);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(SerializableColor::from_hex("#f00"), Some(SerializableColor::new(255, 0, 0, 255)));
        assert_eq!(
            SerializableColor::from_hex("#3b82f680"),
            Some(SerializableColor::new(59, 130, 246, 128))
        );
        assert_eq!(SerializableColor::from_hex("blue"), None);
        assert_eq!(SerializableColor::new(16, 32, 48, 255).to_hex(), "#102030");
    }

    #[test]
    fn test_hex_rejects_non_hex_digits() {
        assert_eq!(SerializableColor::from_hex("#é1"), None);
        assert_eq!(SerializableColor::from_hex("#ééé"), None);
        assert_eq!(SerializableColor::from_hex("#+f+f+f"), None);
        assert_eq!(SerializableColor::from_hex("#-12"), None);
    }

    #[test]
    fn test_element_json_defaults() {
        let json = r##"{
            "id": "6f1c2a8e-6a4e-4f43-9a43-0e8f3c1f1a11",
            "kind": "rectangle",
            "user_id": "u1",
            "timestamp": 1,
            "x": 0.0, "y": 0.0,
            "style": { "color": { "r": 0, "g": 0, "b": 0, "a": 255 }, "stroke_width": 2.0 }
        }"##;
        let e: Element = serde_json::from_str(json).unwrap();
        assert_eq!(e.layer, 1);
        assert!((e.opacity - 1.0).abs() < f64::EPSILON);
        assert!(!e.locked);
    }
}
