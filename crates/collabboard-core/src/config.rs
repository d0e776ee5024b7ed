//! Tunable whiteboard settings.

use crate::error::{WhiteboardError, WhiteboardResult};
use serde::{Deserialize, Serialize};

/// Settings shared by the viewport, history and input router.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// Lowest zoom, in percent.
    pub min_zoom: f64,
    /// Highest zoom, in percent.
    pub max_zoom: f64,
    /// Zoom increment for zoom in/out, in percent.
    pub zoom_step: f64,
    /// Maximum number of undo steps kept.
    pub history_capacity: usize,
    /// Grid cell size in scene units.
    pub grid_size: f64,
    /// Eraser hit radius in screen pixels.
    pub eraser_radius: f64,
    /// Offset applied to duplicated and pasted elements.
    pub duplicate_offset: f64,
    /// Width assumed for elements without an explicit width.
    pub default_width: f64,
    /// Height assumed for elements without an explicit height.
    pub default_height: f64,
    /// Id of the local user, stamped on new elements.
    pub local_user_id: String,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            min_zoom: 10.0,
            max_zoom: 500.0,
            zoom_step: 25.0,
            history_capacity: 50,
            grid_size: 20.0,
            eraser_radius: 10.0,
            duplicate_offset: 20.0,
            default_width: 100.0,
            default_height: 60.0,
            local_user_id: "local".to_string(),
        }
    }
}

impl WhiteboardConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> WhiteboardResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are internally consistent.
    pub fn validate(&self) -> WhiteboardResult<()> {
        if self.min_zoom <= 0.0 {
            return Err(WhiteboardError::InvalidConfig(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if self.min_zoom >= self.max_zoom {
            return Err(WhiteboardError::InvalidConfig(format!(
                "min_zoom ({}) must be below max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 0.0 {
            return Err(WhiteboardError::InvalidConfig(
                "zoom_step must be positive".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(WhiteboardError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.grid_size <= 0.0 || self.eraser_radius <= 0.0 {
            return Err(WhiteboardError::InvalidConfig(
                "grid_size and eraser_radius must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
