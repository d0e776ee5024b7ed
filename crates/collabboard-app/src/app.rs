//! Headless application shell.

use crate::script::{Step, demo_script, replay};
use collabboard_core::{
    Element, ElementKind, EventHandler, SerializableColor, Slide, StaticPresence, StaticSlides,
    Whiteboard, WhiteboardConfig, WhiteboardError,
};
use collabboard_render::{DisplayList, RenderContext, RenderError, export_png, render};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while running the shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Whiteboard(#[from] WhiteboardError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// CSS hex background color.
    pub background_color: String,
    pub show_grid: bool,
    /// Directory receiving exported PNGs.
    pub output_dir: PathBuf,
    pub whiteboard: WhiteboardConfig,
    /// Input replayed before export. `None` replays the demo script.
    pub script: Option<Vec<Step>>,
    /// Start in presentation mode on the first demo slide.
    pub present: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "CollabBoard".to_string(),
            width: 1280,
            height: 800,
            background_color: "#fafafa".to_string(),
            show_grid: true,
            output_dir: PathBuf::from("."),
            whiteboard: WhiteboardConfig::default(),
            script: None,
            present: false,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn background(&self) -> AppResult<SerializableColor> {
        SerializableColor::from_hex(&self.background_color).ok_or_else(|| {
            AppError::Config(format!("bad background color {:?}", self.background_color))
        })
    }
}

/// Slides served to presentation mode.
pub fn demo_slides() -> Vec<Slide> {
    let user = "presenter";
    let ctx = collabboard_core::DrawingContext::default();

    let mut title = Element::new(ElementKind::Text, Point::new(80.0, 80.0), &ctx, user);
    title.text = Some("Sprint review".to_string());
    title.style.font_size = Some(32.0);

    let mut note = Element::new(ElementKind::Sticky, Point::new(80.0, 180.0), &ctx, user);
    note.width = Some(220.0);
    note.height = Some(160.0);
    note.text = Some("Ship the whiteboard export".to_string());

    vec![
        Slide::new("slide-1", "Sprint review")
            .with_content("Highlights from the last two weeks")
            .with_elements(vec![title, note]),
        Slide::new("slide-2", "Next steps").with_content("Open questions and owners"),
    ]
}

/// The headless whiteboard: a board, its input router and the shell config.
pub struct App {
    config: AppConfig,
    board: Whiteboard,
    handler: EventHandler,
    /// Last rendered frame, rebuilt only when the board asks for a redraw.
    last_frame: Option<DisplayList>,
}

impl App {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let mut board = Whiteboard::try_new(config.whiteboard.clone())?;
        board.show_grid = config.show_grid;
        board.refresh_presence(&StaticPresence::demo());
        board.load_slides(&StaticSlides::new(demo_slides()));
        log::info!(
            "Created {} ({}x{}) with {} collaborators",
            config.title,
            config.width,
            config.height,
            board.collaborators().len()
        );
        Ok(Self {
            config,
            board,
            handler: EventHandler::new(),
            last_frame: None,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn board(&self) -> &Whiteboard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Whiteboard {
        &mut self.board
    }

    /// Replay `steps` through the input router, then render at most one frame.
    pub fn replay(&mut self, steps: &[Step]) -> AppResult<()> {
        for step in steps {
            replay(&mut self.handler, &mut self.board, step);
        }
        log::debug!("Replayed {} steps", steps.len());
        self.refresh_frame().map(|_| ())
    }

    /// The current frame, re-rendered only if the board changed since the last one.
    pub fn refresh_frame(&mut self) -> AppResult<&DisplayList> {
        let dirty = self.board.take_needs_redraw();
        let frame = match self.last_frame.take() {
            Some(frame) if !dirty => frame,
            _ => self.frame()?,
        };
        Ok(self.last_frame.insert(frame))
    }

    /// Build the display list for the current frame.
    pub fn frame(&self) -> AppResult<DisplayList> {
        let size = Size::new(self.config.width as f64, self.config.height as f64);
        let ctx = RenderContext::from_whiteboard(&self.board, size)
            .with_background(self.config.background()?.into());
        Ok(render(&ctx))
    }

    /// Render the current frame to `output_dir`.
    pub fn export(&mut self) -> AppResult<PathBuf> {
        let (width, height) = (self.config.width, self.config.height);
        let output_dir = self.config.output_dir.clone();
        let list = self.refresh_frame()?;
        std::fs::create_dir_all(&output_dir)?;
        let path = export_png(list, width, height, &output_dir)?;
        Ok(path)
    }

    /// Replay the configured script, optionally enter presentation mode, and export.
    pub fn run(config: AppConfig) -> AppResult<PathBuf> {
        let mut app = Self::new(config)?;
        let script = app.config.script.clone().unwrap_or_else(demo_script);
        app.replay(&script)?;
        if app.config.present && !app.board.enter_presentation() {
            log::warn!("No slides to present");
        }
        app.export()
    }
}
