//! Rendering backend implementations.

pub mod log;
pub mod svg;

pub use self::log::LogBackend;
pub use self::svg::SvgBackend;

use crate::{BackendType, RenderResult, RenderView};

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, view: &RenderView<'_>) -> RenderResult<()>;

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Output of the most recent frame, if the backend produces any.
    fn last_output(&self) -> Option<&str> {
        None
    }
}

/// Warn about edges whose endpoints no longer exist. They are never drawn.
pub(crate) fn warn_dangling(view: &RenderView<'_>) -> usize {
    let dangling = view.scene.edge_count() - view.scene.resolved_edges().count();
    if dangling > 0 {
        tracing::warn!("Skipping {dangling} dangling edges");
    }
    dangling
}
