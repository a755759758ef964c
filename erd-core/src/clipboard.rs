//! Copy/paste of a selection subgraph.
//!
//! A copy captures the selected shapes plus every edge with both ends inside
//! the copied set. Each paste re-instantiates that subgraph with fresh ids,
//! centered on the target point; the clipboard itself is never consumed.

use std::collections::HashMap;

use crate::geometry::{snap, Point, Rect};
use crate::scene::Scene;
use crate::shape::{Edge, EdgeId, Shape, ShapeId};

/// A captured subgraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipboardContent {
    /// Copied shapes in z-order.
    pub shapes: Vec<Shape>,
    /// Edges whose endpoints are both among `shapes`.
    pub edges: Vec<Edge>,
}

impl ClipboardContent {
    /// Bounding box of every copied shape.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, r| acc.union(&r))
    }
}

/// Holds at most one copied subgraph.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a paste would do nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// The captured subgraph, if any.
    #[must_use]
    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    /// Capture the given shapes and their induced edges, replacing any previous copy.
    ///
    /// Ids that do not resolve are ignored. If nothing resolves the clipboard is
    /// left untouched and `false` is returned.
    pub fn copy(&mut self, scene: &Scene, ids: &[ShapeId]) -> bool {
        let shapes: Vec<Shape> = scene
            .shapes()
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .map(|mut s| {
                s.highlighted = false;
                s
            })
            .collect();
        if shapes.is_empty() {
            return false;
        }

        let edges: Vec<Edge> = scene
            .edges()
            .iter()
            .filter(|e| {
                shapes.iter().any(|s| s.id == e.from_id) && shapes.iter().any(|s| s.id == e.to_id)
            })
            .cloned()
            .collect();

        tracing::debug!(
            "Copied {} shapes and {} edges",
            shapes.len(),
            edges.len()
        );
        self.content = Some(ClipboardContent { shapes, edges });
        true
    }

    /// Append a fresh copy of the clipboard to the scene, centered on `target`.
    ///
    /// The translation is snapped to `grid` so relative offsets are preserved and
    /// grid-aligned shapes stay aligned. Returns the new shape ids in z-order, or
    /// an empty list when the clipboard is empty.
    pub fn paste(&self, scene: &mut Scene, target: Point, grid: f32) -> Vec<ShapeId> {
        let Some(content) = &self.content else {
            return Vec::new();
        };
        let Some(bounds) = content.bounds() else {
            return Vec::new();
        };

        let center = bounds.center();
        let delta = Point::new(snap(target.x - center.x, grid), snap(target.y - center.y, grid));

        let mut id_map: HashMap<ShapeId, ShapeId> = HashMap::with_capacity(content.shapes.len());
        let mut pasted = Vec::with_capacity(content.shapes.len());
        for source in &content.shapes {
            let mut shape = source.clone();
            shape.id = ShapeId::new();
            shape.position = source.position + delta;
            id_map.insert(source.id, shape.id);
            pasted.push(scene.insert_shape(shape));
        }

        for source in &content.edges {
            let (Some(from_id), Some(to_id)) =
                (id_map.get(&source.from_id), id_map.get(&source.to_id))
            else {
                continue;
            };
            let mut edge = source.clone();
            edge.id = EdgeId::new();
            edge.from_id = *from_id;
            edge.to_id = *to_id;
            scene.insert_edge(edge);
        }

        tracing::debug!(
            "Pasted {} shapes at ({}, {})",
            pasted.len(),
            target.x,
            target.y
        );
        pasted
    }

    /// Drop the captured subgraph.
    pub fn clear(&mut self) {
        self.content = None;
    }
}
