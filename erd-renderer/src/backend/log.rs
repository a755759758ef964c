//! Headless backend that traces every drawn item.
//!
//! Used by hosts without a drawing surface, and handy when debugging the
//! editor through `RUST_LOG=erd_renderer=trace`.

use erd_core::{Glyph, Shape};

use crate::{BackendType, RenderResult, RenderView};

use super::{warn_dangling, RenderBackend};

/// Tracing-only renderer.
pub struct LogBackend {
    width: u32,
    height: u32,
    last_item_count: usize,
}

impl LogBackend {
    /// Create a new log backend.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            last_item_count: 0,
        }
    }

    /// Number of shapes and edges traced in the last frame.
    #[must_use]
    pub fn last_item_count(&self) -> usize {
        self.last_item_count
    }

    fn render_shape(shape: &Shape) {
        let b = shape.bounds();
        tracing::trace!(
            "Render {} '{}' at ({}, {}) size {}x{}{}{}",
            shape.kind.short_name(),
            shape.label,
            b.x,
            b.y,
            b.width,
            b.height,
            Self::glyph_description(shape.kind.glyph()),
            if shape.highlighted { " highlighted" } else { "" }
        );
    }

    fn glyph_description(glyph: Glyph) -> &'static str {
        match glyph {
            Glyph::Rectangle { double: false } => " as rectangle",
            Glyph::Rectangle { double: true } => " as double rectangle",
            Glyph::Diamond { double: false } => " as diamond",
            Glyph::Diamond { double: true } => " as double diamond",
            Glyph::Ellipse => " as ellipse",
        }
    }
}

impl Default for LogBackend {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RenderBackend for LogBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Log
    }

    fn render(&mut self, view: &RenderView<'_>) -> RenderResult<()> {
        tracing::trace!(
            "Log render: {} shapes, {} edges, viewport {}x{}, camera ({}, {}) x{}",
            view.scene.shape_count(),
            view.scene.edge_count(),
            self.width,
            self.height,
            view.camera.x,
            view.camera.y,
            view.camera.zoom
        );

        warn_dangling(view);
        let mut items = 0;
        for (edge, from, to) in view.scene.resolved_edges() {
            tracing::trace!(
                "Render edge '{}' -> '{}' [{}|{}] {:?}",
                from.label,
                to.label,
                edge.from_label.as_str(),
                edge.to_label.as_str(),
                edge.participation
            );
            items += 1;
        }
        for shape in view.scene.shapes() {
            Self::render_shape(shape);
            items += 1;
        }
        if let Some(rect) = view.marquee {
            tracing::trace!(
                "Render marquee at ({}, {}) size {}x{}",
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
        }

        self.last_item_count = items;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        tracing::debug!("Log backend resized to {}x{}", width, height);
        Ok(())
    }
}
