//! Viewport module for pan/zoom transforms.

use crate::config::WhiteboardConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%", i.e. one scene unit per pixel.
pub const BASE_ZOOM: f64 = 100.0;

/// Viewport manages the view transform for the whiteboard.
///
/// Zoom is kept in percent and clamped to `[min_zoom, max_zoom]`; panning is
/// unclamped. Screen = world * zoom/100 + pan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom in percent.
    zoom: f64,
    /// Current translation offset in screen pixels.
    pub pan: Vec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Increment used by zoom in/out.
    pub zoom_step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&WhiteboardConfig::default())
    }
}

impl Viewport {
    /// Create a viewport at 100% using the config's zoom bounds.
    ///
    /// Unusable bounds (non-finite, non-positive or inverted) fall back to the defaults.
    pub fn from_config(config: &WhiteboardConfig) -> Self {
        let (mut min_zoom, mut max_zoom) = (config.min_zoom, config.max_zoom);
        if !(min_zoom.is_finite() && max_zoom.is_finite() && min_zoom > 0.0 && min_zoom <= max_zoom) {
            log::warn!("Ignoring zoom bounds {min_zoom}..{max_zoom}");
            let defaults = WhiteboardConfig::default();
            min_zoom = defaults.min_zoom;
            max_zoom = defaults.max_zoom;
        }
        Self {
            zoom: BASE_ZOOM.clamp(min_zoom, max_zoom),
            pan: Vec2::ZERO,
            min_zoom,
            max_zoom,
            zoom_step: config.zoom_step,
        }
    }

    /// Current zoom in percent.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Scale factor (zoom / 100).
    pub fn scale(&self) -> f64 {
        self.zoom / BASE_ZOOM
    }

    /// Set the zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_step);
    }

    /// Reset to 100% zoom at the origin.
    pub fn reset(&mut self) {
        self.set_zoom(BASE_ZOOM);
        self.pan = Vec2::ZERO;
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale())
    }

    /// Get the inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale()) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// The world-space rectangle visible in a viewport of `size` pixels.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        let inv = self.inverse_transform();
        Rect::from_points(inv * Point::ZERO, inv * Point::new(size.width, size.height))
    }
}
