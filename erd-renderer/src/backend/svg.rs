//! SVG backend.
//!
//! Produces one standalone SVG document per frame. Diagram content is written
//! in document coordinates inside a group carrying the camera transform, so
//! strokes and text scale with the zoom the same way they do on screen.

use std::fmt::Write;

use erd_core::selection::{cardinality_anchors, shows_cardinality};
use erd_core::shape::DOUBLE_INSET;
use erd_core::{Edge, Glyph, Handle, Point, Rect, Shape};

use crate::{BackendType, RenderResult, RenderView, RendererConfig};

use super::{warn_dangling, RenderBackend};

/// Distance between the two lines of a total-participation edge.
pub const TOTAL_PARTICIPATION_GAP: f32 = 4.0;

/// SVG document renderer.
pub struct SvgBackend {
    config: RendererConfig,
    last_frame: Option<String>,
}

impl SvgBackend {
    /// Create a new SVG backend.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            last_frame: None,
        }
    }

    /// Render a view to an SVG document string.
    #[must_use]
    pub fn document(&self, view: &RenderView<'_>) -> String {
        let c = &self.config;
        let (w, h) = (c.width, c.height);
        let camera = view.camera;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        );
        let _ = write!(
            svg,
            "<defs><marker id=\"arrow\" markerWidth=\"10\" markerHeight=\"7\" refX=\"10\" refY=\"3.5\" orient=\"auto\"><path d=\"M0,0 L10,3.5 L0,7 Z\" fill=\"{}\"/></marker></defs>",
            escape_xml(&c.stroke_color),
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&c.background),
        );
        let _ = write!(
            svg,
            "<g transform=\"translate({},{}) scale({})\">",
            camera.x, camera.y, camera.zoom
        );

        self.render_grid(&mut svg);

        warn_dangling(view);
        for (edge, from, to) in view.scene.resolved_edges() {
            self.render_edge(&mut svg, edge, from, to);
        }

        for shape in view.scene.shapes() {
            self.render_shape(&mut svg, shape);
        }

        if let Some(shape) = view
            .selection
            .single_shape()
            .and_then(|id| view.scene.shape(id))
        {
            self.render_handles(&mut svg, &shape.bounds(), camera.zoom);
        }

        if let Some(rect) = view.marquee {
            self.render_marquee(&mut svg, &rect, camera.zoom);
        }

        svg.push_str("</g></svg>");
        svg
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_grid(&self, svg: &mut String) {
        let grid = self.config.grid_size;
        let extent = self.config.grid_extent;
        if grid <= 0.0 || extent <= 0.0 {
            return;
        }
        let steps = (extent / grid).floor() as i32;

        svg.push_str("<g stroke=\"#eeeeee\" stroke-width=\"1\">");
        for i in -steps..=steps {
            #[allow(clippy::cast_precision_loss)]
            let at = i as f32 * grid;
            let _ = write!(
                svg,
                "<line x1=\"{at}\" y1=\"{}\" x2=\"{at}\" y2=\"{extent}\"/><line x1=\"{}\" y1=\"{at}\" x2=\"{extent}\" y2=\"{at}\"/>",
                -extent, -extent,
            );
        }
        svg.push_str("</g>");
    }

    fn render_edge(&self, svg: &mut String, edge: &Edge, from: &Shape, to: &Shape) {
        let stroke = escape_xml(&self.config.stroke_color);
        let a = from.center();
        let b = to.center();

        let _ = write!(
            svg,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{stroke}\" stroke-width=\"1\" marker-end=\"url(#arrow)\"/>",
            a.x, a.y, b.x, b.y,
        );

        if edge.participation == erd_core::Participation::Total {
            let offset = perpendicular(a, b).scale(TOTAL_PARTICIPATION_GAP);
            let (a2, b2) = (a + offset, b + offset);
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{stroke}\" stroke-width=\"1\"/>",
                a2.x, a2.y, b2.x, b2.y,
            );
        }

        if shows_cardinality(from, to) {
            let (from_anchor, to_anchor) = cardinality_anchors(from, to);
            for (anchor, label) in [(from_anchor, edge.from_label), (to_anchor, edge.to_label)] {
                if label.as_str().is_empty() {
                    continue;
                }
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"{stroke}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"sans-serif\">{}</text>",
                    anchor.x,
                    anchor.y,
                    label.as_str(),
                );
            }
        }
    }

    fn render_shape(&self, svg: &mut String, shape: &Shape) {
        let (stroke, width) = if shape.highlighted {
            (escape_xml(&self.config.accent_color), 2)
        } else {
            (escape_xml(&self.config.stroke_color), 1)
        };
        let style = format!("fill=\"#ffffff\" stroke=\"{stroke}\" stroke-width=\"{width}\"");
        let b = shape.bounds();

        svg.push_str("<g>");
        match shape.kind.glyph() {
            Glyph::Rectangle { double } => {
                write_rect(svg, &b, &style);
                if double {
                    write_rect(svg, &inset(&b, DOUBLE_INSET), &style);
                }
            }
            Glyph::Diamond { double } => {
                write_diamond(svg, &b, &style);
                if double {
                    write_diamond(svg, &inset(&b, DOUBLE_INSET), &style);
                }
            }
            Glyph::Ellipse => {
                let c = b.center();
                let _ = write!(
                    svg,
                    "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {style}/>",
                    c.x,
                    c.y,
                    b.width / 2.0,
                    b.height / 2.0,
                );
            }
        }

        let c = b.center();
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"#000000\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"sans-serif\">{}</text>",
            c.x,
            c.y,
            escape_xml(&shape.label),
        );
        svg.push_str("</g>");
    }

    fn render_handles(&self, svg: &mut String, bounds: &Rect, zoom: f32) {
        let size = self.config.handle_size / zoom;
        let accent = escape_xml(&self.config.accent_color);
        for handle in Handle::ALL {
            let r = Rect::centered(handle.corner(bounds), size, size);
            let _ = write!(
                svg,
                "<rect class=\"handle\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#ffffff\" stroke=\"{accent}\" stroke-width=\"{}\"/>",
                r.x,
                r.y,
                r.width,
                r.height,
                1.0 / zoom,
            );
        }
    }

    fn render_marquee(&self, svg: &mut String, rect: &Rect, zoom: f32) {
        let accent = escape_xml(&self.config.accent_color);
        let _ = write!(
            svg,
            "<rect class=\"marquee\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{accent}\" fill-opacity=\"0.1\" stroke=\"{accent}\" stroke-dasharray=\"4 2\" stroke-width=\"{}\"/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            1.0 / zoom,
        );
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn render(&mut self, view: &RenderView<'_>) -> RenderResult<()> {
        let document = self.document(view);
        tracing::trace!("SVG frame: {} bytes", document.len());
        self.last_frame = Some(document);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.config.width = width;
        self.config.height = height;
        tracing::debug!("SVG surface resized to {}x{}", width, height);
        Ok(())
    }

    fn last_output(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }
}

/// Unit normal of the segment `a`–`b` (zero for a degenerate segment).
fn perpendicular(a: Point, b: Point) -> Point {
    let d = b - a;
    let len = d.x.hypot(d.y);
    if len <= f32::EPSILON {
        return Point::default();
    }
    Point::new(-d.y / len, d.x / len)
}

fn inset(r: &Rect, by: f32) -> Rect {
    Rect::new(
        r.x + by,
        r.y + by,
        (r.width - 2.0 * by).max(0.0),
        (r.height - 2.0 * by).max(0.0),
    )
}

fn write_rect(svg: &mut String, r: &Rect, style: &str) {
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {style}/>",
        r.x, r.y, r.width, r.height,
    );
}

fn write_diamond(svg: &mut String, r: &Rect, style: &str) {
    let c = r.center();
    let right = r.x + r.width;
    let bottom = r.y + r.height;
    let _ = write!(
        svg,
        "<polygon points=\"{},{} {},{} {},{} {},{}\" {style}/>",
        c.x, r.y, right, c.y, c.x, bottom, r.x, c.y,
    );
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
