//! # ERD Canvas Renderer
//!
//! Draws the editor state: grid, edges with arrowheads and cardinality labels,
//! shape glyphs, selection handles and the marquee.
//!
//! ## Rendering Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            RenderBackend Trait              │
//! ├──────────────────────┬──────────────────────┤
//! │ SVG                  │ Log                  │
//! │ (vector document)    │ (headless, tracing)  │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;

pub use backend::{LogBackend, RenderBackend, SvgBackend};
pub use error::{RenderError, RenderResult};

use erd_core::{Camera, EditorState, Rect, Scene, Selection};
use serde::{Deserialize, Serialize};

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Backend to draw with.
    pub preferred_backend: BackendType,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Grid spacing in document units.
    pub grid_size: f32,
    /// Grid lines cover `-grid_extent..=grid_extent` on both axes.
    pub grid_extent: f32,
    /// Resize handle edge length in screen pixels.
    pub handle_size: f32,
    /// Background color.
    pub background: String,
    /// Outline color of unselected shapes and edges.
    pub stroke_color: String,
    /// Outline color of highlighted shapes, handles and the marquee.
    pub accent_color: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendType::Svg,
            width: 1200,
            height: 800,
            grid_size: 20.0,
            grid_extent: 2000.0,
            handle_size: 8.0,
            background: "#ffffff".to_string(),
            stroke_color: "#000000".to_string(),
            accent_color: "#1e6fff".to_string(),
        }
    }
}

/// Available rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Standalone SVG document.
    Svg,
    /// Trace every drawn item instead of producing output.
    Log,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    /// Shapes and edges.
    pub scene: &'a Scene,
    /// Viewport transform.
    pub camera: &'a Camera,
    /// Selection (handles are drawn for a single selected shape).
    pub selection: &'a Selection,
    /// Marquee rectangle in document space, while one is being drawn.
    pub marquee: Option<Rect>,
}

impl<'a> RenderView<'a> {
    /// View of the live editor state.
    #[must_use]
    pub fn of(state: &'a EditorState) -> Self {
        Self {
            scene: state.scene(),
            camera: state.camera(),
            selection: state.selection(),
            marquee: state.marquee(),
        }
    }

    /// View of a bare scene with an explicit camera and selection.
    #[must_use]
    pub fn new(scene: &'a Scene, camera: &'a Camera, selection: &'a Selection) -> Self {
        Self {
            scene,
            camera,
            selection,
            marquee: None,
        }
    }
}

/// The main renderer interface.
pub struct Renderer {
    config: RendererConfig,
    backend: Box<dyn RenderBackend>,
    frame_count: u64,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be created.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let backend = Self::create_backend(&config)?;

        Ok(Self {
            config,
            backend,
            frame_count: 0,
        })
    }

    fn create_backend(config: &RendererConfig) -> RenderResult<Box<dyn RenderBackend>> {
        if config.width == 0 || config.height == 0 {
            return Err(RenderError::Backend(format!(
                "surface must be non-empty, got {}x{}",
                config.width, config.height
            )));
        }
        match config.preferred_backend {
            BackendType::Svg => Ok(Box::new(SvgBackend::new(config.clone()))),
            BackendType::Log => Ok(Box::new(LogBackend::new(config.width, config.height))),
        }
    }

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&mut self, view: &RenderView<'_>) -> RenderResult<()> {
        self.backend.render(view)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Output of the most recent frame, for backends that produce one.
    #[must_use]
    pub fn last_output(&self) -> Option<&str> {
        self.backend.last_output()
    }

    /// Write the output of the most recent frame.
    ///
    /// # Errors
    ///
    /// Returns an error if no frame with output has been rendered, or if writing fails.
    pub fn write_last_output<W: std::io::Write>(&self, out: &mut W) -> RenderResult<()> {
        let output = self.last_output().ok_or_else(|| {
            RenderError::Backend(format!("{:?} backend produced no output", self.active_backend()))
        })?;
        out.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resize fails.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.config.width = width;
        self.config.height = height;
        self.backend.resize(width, height)
    }
}
