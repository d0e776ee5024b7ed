//! Geometry helpers shared by hit-testing and rendering.

use kurbo::{Point, Rect, Size, Vec2};

/// Arrowhead barb length in scene units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Half-angle between the shaft and each barb.
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Box spanned by `origin` and a possibly negative `size`, normalized.
pub fn normalized_box(origin: Point, size: Size) -> Rect {
    Rect::new(
        origin.x,
        origin.y,
        origin.x + size.width,
        origin.y + size.height,
    )
    .abs()
}

/// Radius of the circle inscribed in a `width` x `height` box.
pub fn circle_radius(size: Size) -> f64 {
    size.width.abs().min(size.height.abs()) / 2.0
}

/// The two barb end points of an arrow pointing from `start` to `end`.
pub fn arrow_head(start: Point, end: Point) -> [Point; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let barb = |theta: f64| {
        end - Vec2::new(
            ARROW_HEAD_LENGTH * theta.cos(),
            ARROW_HEAD_LENGTH * theta.sin(),
        )
    };
    [barb(angle - ARROW_HEAD_ANGLE), barb(angle + ARROW_HEAD_ANGLE)]
}
