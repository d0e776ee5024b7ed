//! Pure display-list renderer.
//!
//! [`render`] turns the visible whiteboard state into a [`DisplayList`]
//! without touching any graphics API. Backends replay the list.

use collabboard_core::canvas::{Whiteboard, paint_order};
use collabboard_core::collaboration::{CollaboratorCursor, remote_cursors};
use collabboard_core::shapes::{
    Element, ElementId, ElementKind, ElementStyle, FontStyle, FontWeight, SerializableColor,
    TextAlign, arrow_head, circle_radius, wrap_text,
};
use collabboard_core::viewport::Viewport;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as _, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Grid cell color.
const GRID_COLOR: SerializableColor = SerializableColor::new(200, 200, 200, 100);
/// Grid line width in scene units.
const GRID_LINE_WIDTH: f64 = 0.5;
/// Upper bound on grid lines per axis.
const MAX_GRID_LINES: usize = 4096;
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;
/// Inner padding of sticky notes.
pub const STICKY_PADDING: f64 = 10.0;
/// Selection box distance from the element bounds, in screen pixels.
const SELECTION_PADDING: f64 = 4.0;
/// Corner handle edge length, in screen pixels.
const HANDLE_SIZE: f64 = 8.0;
/// Dash pattern of the selection box, in screen pixels.
const SELECTION_DASH: [f64; 2] = [5.0, 5.0];
/// Padlock glyph edge length, in screen pixels.
const LOCK_SIZE: f64 = 12.0;
/// Collaborator label font size, in screen pixels.
const CURSOR_LABEL_SIZE: f64 = 12.0;

/// How a path is stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: SerializableColor,
    /// Dash lengths; empty for a solid line.
    pub dash: Vec<f64>,
    /// Round caps and joins (pen strokes) instead of butt/miter.
    pub round: bool,
}

impl StrokeStyle {
    pub fn new(width: f64, color: SerializableColor) -> Self {
        Self {
            width,
            color,
            dash: Vec::new(),
            round: false,
        }
    }

    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.dash = dash;
        self
    }

    pub fn with_round_caps(mut self) -> Self {
        self.round = true;
        self
    }
}

/// Font settings for a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontSpec {
    pub fn from_style(style: &ElementStyle) -> Self {
        Self {
            size: style.font_size(),
            family: style.font_family().to_string(),
            weight: style.font_weight,
            style: style.font_style,
        }
    }

    /// CSS font shorthand, e.g. `italic bold 16px sans-serif`.
    pub fn css(&self) -> String {
        format!(
            "{} {} {}px {}",
            self.style.css(),
            self.weight.css(),
            self.size,
            self.family
        )
    }
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface, ignoring transform and alpha.
    Clear(SerializableColor),
    /// Push transform and alpha.
    Save,
    /// Pop transform and alpha.
    Restore,
    /// Concatenate onto the current transform.
    Transform(Affine),
    /// Multiply the current alpha.
    SetAlpha(f64),
    StrokePath {
        path: BezPath,
        stroke: StrokeStyle,
    },
    FillPath {
        path: BezPath,
        color: SerializableColor,
    },
    /// A single line of text; `position` is the top of the line box at the alignment anchor.
    FillText {
        text: String,
        position: Point,
        font: FontSpec,
        align: TextAlign,
        color: SerializableColor,
    },
    /// An image (by URL) stretched into `rect`.
    DrawImage { src: String, rect: Rect },
}

/// The output of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
    /// Ids of elements in the order they were painted.
    pub painted: Vec<ElementId>,
}

impl DisplayList {
    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn stroke(&mut self, path: BezPath, stroke: StrokeStyle) {
        self.push(DrawCommand::StrokePath { path, stroke });
    }

    fn fill(&mut self, path: BezPath, color: SerializableColor) {
        self.push(DrawCommand::FillPath { path, color });
    }
}

/// Everything one frame depends on.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Elements to draw, in list order.
    pub elements: &'a [Element],
    pub selection: &'a [ElementId],
    pub viewport: &'a Viewport,
    /// Surface size in pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub selection_color: Color,
    pub show_grid: bool,
    pub grid_size: f64,
    /// Presentation mode hides the grid and all overlays.
    pub presentation: bool,
    pub cursors: &'a [CollaboratorCursor],
    /// Cursor of this user is not drawn.
    pub local_user_id: &'a str,
    /// Size assumed for elements without width/height.
    pub default_size: Size,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(elements: &'a [Element], viewport: &'a Viewport, viewport_size: Size) -> Self {
        Self {
            elements,
            selection: &[],
            viewport,
            viewport_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            show_grid: true,
            grid_size: 20.0,
            presentation: false,
            cursors: &[],
            local_user_id: "",
            default_size: Size::new(100.0, 60.0),
        }
    }

    /// Context for the current state of a whiteboard.
    pub fn from_whiteboard(board: &'a Whiteboard, viewport_size: Size) -> Self {
        let config = board.config();
        Self {
            selection: board.selection().ids(),
            show_grid: board.show_grid,
            grid_size: config.grid_size,
            presentation: board.is_presenting(),
            cursors: board.collaborators(),
            local_user_id: &config.local_user_id,
            default_size: board.default_size(),
            ..Self::new(board.active_elements(), &board.viewport, viewport_size)
        }
    }

    pub fn with_selection(mut self, selection: &'a [ElementId]) -> Self {
        self.selection = selection;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }

    pub fn with_presentation(mut self, presentation: bool) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_cursors(mut self, cursors: &'a [CollaboratorCursor], local_user_id: &'a str) -> Self {
        self.cursors = cursors;
        self.local_user_id = local_user_id;
        self
    }
}

/// Trait for backends that replay display lists.
pub trait RenderBackend {
    /// Execute every command of `list` in order.
    fn execute(&mut self, list: &DisplayList) -> RenderResult<()>;
}

/// Build the display list for one frame.
pub fn render(ctx: &RenderContext) -> DisplayList {
    let mut list = DisplayList::default();
    list.push(DrawCommand::Clear(ctx.background_color.into()));
    list.push(DrawCommand::Save);
    list.push(DrawCommand::Transform(ctx.viewport.transform()));

    if ctx.show_grid && !ctx.presentation {
        render_grid(&mut list, ctx);
    }

    for element in paint_order(ctx.elements) {
        list.painted.push(element.id());
        render_element(&mut list, element, ctx.default_size);
    }

    if !ctx.presentation {
        let scale = ctx.viewport.scale();
        let selection_color = ctx.selection_color.into();
        for element in ctx.elements {
            if ctx.selection.contains(&element.id()) {
                render_selection(&mut list, element, ctx.default_size, scale, selection_color);
            }
        }
        for element in ctx.elements.iter().filter(|e| e.locked) {
            render_lock_glyph(&mut list, element, ctx.default_size, scale);
        }
        for cursor in remote_cursors(ctx.cursors, ctx.local_user_id) {
            render_cursor(&mut list, cursor, scale);
        }
    }

    list.push(DrawCommand::Restore);
    list
}

/// Grid-aligned world bounds covering the visible area.
fn grid_bounds(viewport: Rect, grid_size: f64) -> Rect {
    Rect::new(
        (viewport.x0 / grid_size).floor() * grid_size,
        (viewport.y0 / grid_size).floor() * grid_size,
        (viewport.x1 / grid_size).ceil() * grid_size,
        (viewport.y1 / grid_size).ceil() * grid_size,
    )
}

/// Number of grid lines across `span`, or None when there would be too many to draw.
fn grid_line_count(span: f64, grid_size: f64) -> Option<usize> {
    let cells = (span / grid_size).round();
    if !cells.is_finite() || cells < 0.0 || cells >= MAX_GRID_LINES as f64 {
        return None;
    }
    Some(cells as usize + 1)
}

fn render_grid(list: &mut DisplayList, ctx: &RenderContext) {
    if ctx.grid_size.is_nan() || ctx.grid_size <= 0.0 {
        return;
    }
    let bounds = grid_bounds(
        ctx.viewport.visible_world_rect(ctx.viewport_size),
        ctx.grid_size,
    );
    let (Some(columns), Some(rows)) = (
        grid_line_count(bounds.width(), ctx.grid_size),
        grid_line_count(bounds.height(), ctx.grid_size),
    ) else {
        log::debug!("Skipping grid for {bounds:?}");
        return;
    };

    let mut path = BezPath::new();
    for i in 0..columns {
        let x = bounds.x0 + i as f64 * ctx.grid_size;
        path.move_to(Point::new(x, bounds.y0));
        path.line_to(Point::new(x, bounds.y1));
    }
    for i in 0..rows {
        let y = bounds.y0 + i as f64 * ctx.grid_size;
        path.move_to(Point::new(bounds.x0, y));
        path.line_to(Point::new(bounds.x1, y));
    }
    list.stroke(path, StrokeStyle::new(GRID_LINE_WIDTH, GRID_COLOR));
}

fn render_element(list: &mut DisplayList, element: &Element, default_size: Size) {
    let bounds = element.bounds(default_size);
    let style = &element.style;
    let stroke = StrokeStyle::new(style.stroke_width.max(1.0), style.color);

    list.push(DrawCommand::Save);
    if element.opacity < 1.0 {
        list.push(DrawCommand::SetAlpha(element.opacity.clamp(0.0, 1.0)));
    }
    if element.rotation != 0.0 {
        list.push(DrawCommand::Transform(Affine::rotate_about(
            element.rotation.to_radians(),
            bounds.center(),
        )));
    }

    match element.kind {
        ElementKind::Pen => {
            let mut path = BezPath::new();
            if let Some((first, rest)) = element.points.split_first() {
                path.move_to(*first);
                if rest.is_empty() {
                    path.line_to(*first);
                }
                for p in rest {
                    path.line_to(*p);
                }
            }
            list.stroke(path, stroke.with_round_caps());
        }
        ElementKind::Line | ElementKind::Arrow => {
            let size = element.size_or(default_size);
            let start = element.origin();
            let end = Point::new(start.x + size.width, start.y + size.height);
            let mut shaft = BezPath::new();
            shaft.move_to(start);
            shaft.line_to(end);
            list.stroke(shaft, stroke.clone());
            if element.kind == ElementKind::Arrow {
                let [left, right] = arrow_head(start, end);
                let mut head = BezPath::new();
                head.move_to(left);
                head.line_to(end);
                head.line_to(right);
                list.stroke(head, stroke);
            }
        }
        ElementKind::Rectangle => {
            let path = bounds.to_path(0.1);
            if let Some(fill) = style.fill_color {
                list.fill(path.clone(), fill);
            }
            list.stroke(path, stroke);
        }
        ElementKind::Circle => {
            let radius = circle_radius(element.size_or(default_size));
            let path = Circle::new(bounds.center(), radius).to_path(0.1);
            if let Some(fill) = style.fill_color {
                list.fill(path.clone(), fill);
            }
            list.stroke(path, stroke);
        }
        ElementKind::Text => {
            let font = FontSpec::from_style(style);
            let line_height = font.size * LINE_HEIGHT;
            let text = element.text.as_deref().unwrap_or_default();
            for (i, line) in text.split('\n').enumerate() {
                list.push(DrawCommand::FillText {
                    text: line.to_string(),
                    position: Point::new(element.x, element.y + i as f64 * line_height),
                    font: font.clone(),
                    align: style.text_align,
                    color: style.color,
                });
            }
        }
        ElementKind::Sticky => {
            let path = bounds.to_path(0.1);
            list.fill(
                path.clone(),
                style.fill_color.unwrap_or(SerializableColor::sticky_yellow()),
            );
            list.stroke(path, stroke);

            let font = FontSpec::from_style(style);
            let line_height = font.size * LINE_HEIGHT;
            let text = element.text.as_deref().unwrap_or_default();
            let max_width = (bounds.width() - 2.0 * STICKY_PADDING).max(0.0);
            for (i, line) in wrap_text(text, max_width, font.size).into_iter().enumerate() {
                list.push(DrawCommand::FillText {
                    text: line,
                    position: Point::new(
                        bounds.x0 + STICKY_PADDING,
                        bounds.y0 + STICKY_PADDING + i as f64 * line_height,
                    ),
                    font: font.clone(),
                    align: TextAlign::Left,
                    color: style.color,
                });
            }
        }
        ElementKind::Image => match &element.src {
            Some(src) => list.push(DrawCommand::DrawImage {
                src: src.clone(),
                rect: bounds,
            }),
            None => render_image_placeholder(list, bounds),
        },
    }

    list.push(DrawCommand::Restore);
}

/// Gray box with an X for images without a source.
fn render_image_placeholder(list: &mut DisplayList, bounds: Rect) {
    let rect_path = bounds.to_path(0.1);
    list.fill(rect_path.clone(), SerializableColor::new(200, 200, 200, 255));

    let mut x_path = BezPath::new();
    x_path.move_to(Point::new(bounds.x0, bounds.y0));
    x_path.line_to(Point::new(bounds.x1, bounds.y1));
    x_path.move_to(Point::new(bounds.x1, bounds.y0));
    x_path.line_to(Point::new(bounds.x0, bounds.y1));
    list.stroke(
        x_path,
        StrokeStyle::new(2.0, SerializableColor::new(150, 150, 150, 255)),
    );
    list.stroke(
        rect_path,
        StrokeStyle::new(2.0, SerializableColor::new(100, 100, 100, 255)),
    );
}

/// Dashed box plus four corner handles, screen-constant in size.
fn render_selection(
    list: &mut DisplayList,
    element: &Element,
    default_size: Size,
    scale: f64,
    color: SerializableColor,
) {
    let bounds = element.bounds(default_size);
    let outline = bounds.inflate(SELECTION_PADDING / scale, SELECTION_PADDING / scale);

    list.push(DrawCommand::Save);
    if element.rotation != 0.0 {
        list.push(DrawCommand::Transform(Affine::rotate_about(
            element.rotation.to_radians(),
            bounds.center(),
        )));
    }
    list.stroke(
        outline.to_path(0.1),
        StrokeStyle::new(1.0 / scale, color)
            .with_dash(SELECTION_DASH.iter().map(|d| d / scale).collect()),
    );

    let half = HANDLE_SIZE / scale / 2.0;
    let corners = [
        Point::new(outline.x0, outline.y0),
        Point::new(outline.x1, outline.y0),
        Point::new(outline.x1, outline.y1),
        Point::new(outline.x0, outline.y1),
    ];
    for corner in corners {
        let handle = Rect::new(corner.x - half, corner.y - half, corner.x + half, corner.y + half)
            .to_path(0.1);
        list.fill(handle.clone(), SerializableColor::white());
        list.stroke(handle, StrokeStyle::new(1.0 / scale, color));
    }
    list.push(DrawCommand::Restore);
}

/// Padlock drawn over the top-right corner of a locked element.
fn render_lock_glyph(list: &mut DisplayList, element: &Element, default_size: Size, scale: f64) {
    let bounds = element.bounds(default_size);
    let unit = LOCK_SIZE / scale;
    let color = SerializableColor::new(100, 100, 100, 255);

    let body = Rect::new(
        bounds.x1 - unit,
        bounds.y0 + unit * 0.5,
        bounds.x1,
        bounds.y0 + unit * 1.25,
    );
    let mut shackle = BezPath::new();
    shackle.move_to(Point::new(body.x0 + unit * 0.2, body.y0));
    shackle.line_to(Point::new(body.x0 + unit * 0.2, bounds.y0 + unit * 0.25));
    shackle.quad_to(
        Point::new(body.center().x, bounds.y0 - unit * 0.15),
        Point::new(body.x1 - unit * 0.2, bounds.y0 + unit * 0.25),
    );
    shackle.line_to(Point::new(body.x1 - unit * 0.2, body.y0));

    list.stroke(shackle, StrokeStyle::new(1.5 / scale, color));
    list.fill(body.to_path(0.1), color);
}

/// Pointer triangle and name label for a remote collaborator.
fn render_cursor(list: &mut DisplayList, cursor: &CollaboratorCursor, scale: f64) {
    let tip = cursor.position;
    let unit = 1.0 / scale;
    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(Point::new(tip.x, tip.y + 18.0 * unit));
    path.line_to(Point::new(tip.x + 14.0 * unit, tip.y + 14.0 * unit));
    path.close_path();

    list.fill(path.clone(), cursor.color);
    list.stroke(path, StrokeStyle::new(1.5 * unit, SerializableColor::white()));
    list.push(DrawCommand::FillText {
        text: cursor.name.clone(),
        position: Point::new(tip.x + 16.0 * unit, tip.y + 16.0 * unit),
        font: FontSpec {
            size: CURSOR_LABEL_SIZE * unit,
            family: ElementStyle::DEFAULT_FONT_FAMILY.to_string(),
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
        },
        align: TextAlign::Left,
        color: cursor.color,
    });
}
