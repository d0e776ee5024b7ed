//! CollabBoard Application
//!
//! Headless shell around the whiteboard core: configuration, logging,
//! scripted input replay and PNG export.

mod app;
pub mod script;

pub use app::{App, AppConfig, AppError, AppResult, demo_slides};
pub use script::{Step, demo_script};
