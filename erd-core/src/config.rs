//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Tunable constants for the editor.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid unit in document space. Interactive placement snaps to it.
    pub grid_size: f32,
    /// Maximum number of undo snapshots kept.
    pub history_capacity: usize,
    /// Lower zoom bound.
    pub min_zoom: f32,
    /// Upper zoom bound.
    pub max_zoom: f32,
    /// Zoom factor applied per wheel notch.
    pub zoom_step: f32,
    /// Smallest width a resize can produce.
    pub min_shape_width: f32,
    /// Smallest height a resize can produce.
    pub min_shape_height: f32,
    /// Side of a resize handle, in screen pixels.
    pub handle_size: f32,
    /// Maximum pointer distance from an edge line that still hits it, in screen pixels.
    pub edge_hit_tolerance: f32,
    /// Where toolbar-created shapes are placed.
    pub default_position: Point,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            history_capacity: 50,
            min_zoom: 0.2,
            max_zoom: 5.0,
            zoom_step: 1.1,
            min_shape_width: 40.0,
            min_shape_height: 30.0,
            handle_size: 8.0,
            edge_hit_tolerance: 6.0,
            default_position: Point::new(100.0, 100.0),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp a zoom value into the configured bounds.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
