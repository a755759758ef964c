//! Selection sets and hit-testing.
//!
//! Hit-tests work in document space; the caller converts the pointer through
//! the camera first. Screen-pixel tolerances (handle size, edge distance) are
//! divided by the zoom so they stay constant on screen.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::geometry::{distance_to_segment, Camera, Point, Rect};
use crate::scene::Scene;
use crate::shape::{Cardinality, EdgeId, EdgeSide, Shape, ShapeId};

/// Distance from the anchor along the edge direction to a cardinality label.
pub const LABEL_OFFSET: f32 = 18.0;

/// Clickable box around a cardinality label, in document units.
pub const LABEL_HIT_WIDTH: f32 = 24.0;
/// Clickable box height around a cardinality label, in document units.
pub const LABEL_HIT_HEIGHT: f32 = 20.0;

/// Currently selected shapes and edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    shapes: Vec<ShapeId>,
    edges: Vec<EdgeId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected shapes in selection order.
    #[must_use]
    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    /// Selected edges in selection order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Nothing selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.edges.is_empty()
    }

    /// Whether the shape is selected.
    #[must_use]
    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.shapes.contains(&id)
    }

    /// Whether the edge is selected.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    /// The selected shape when exactly one shape is selected.
    #[must_use]
    pub fn single_shape(&self) -> Option<ShapeId> {
        match self.shapes.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Add a shape if not already selected.
    pub fn add_shape(&mut self, id: ShapeId) {
        if !self.shapes.contains(&id) {
            self.shapes.push(id);
        }
    }

    /// Add an edge if not already selected.
    pub fn add_edge(&mut self, id: EdgeId) {
        if !self.edges.contains(&id) {
            self.edges.push(id);
        }
    }

    /// Replace the selection with a single shape.
    pub fn select_only(&mut self, id: ShapeId) {
        self.clear();
        self.shapes.push(id);
    }

    /// Replace the selected shapes, dropping selected edges.
    pub fn set_shapes(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.clear();
        for id in ids {
            self.add_shape(id);
        }
    }

    /// Union another selection into this one.
    pub fn extend(&mut self, other: &Self) {
        for id in &other.shapes {
            self.add_shape(*id);
        }
        for id in &other.edges {
            self.add_edge(*id);
        }
    }

    /// Forget a shape.
    pub fn remove_shape(&mut self, id: ShapeId) {
        self.shapes.retain(|s| *s != id);
    }

    /// Drop ids that no longer exist in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.shapes.retain(|id| scene.shape(*id).is_some());
        self.edges.retain(|id| scene.edge(*id).is_some());
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.edges.clear();
    }
}

/// A resize handle on one corner of the selected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left.
    Nw,
    /// Top-right.
    Ne,
    /// Bottom-left.
    Sw,
    /// Bottom-right.
    Se,
}

impl Handle {
    /// All handles.
    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Dragging moves the top edge.
    #[must_use]
    pub const fn north(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }

    /// Dragging moves the left edge.
    #[must_use]
    pub const fn west(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Corner position of this handle on a box.
    #[must_use]
    pub fn corner(self, bounds: &Rect) -> Point {
        let x = if self.west() {
            bounds.x
        } else {
            bounds.x + bounds.width
        };
        let y = if self.north() {
            bounds.y
        } else {
            bounds.y + bounds.height
        };
        Point::new(x, y)
    }
}

/// What a pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A resize handle of the single selected shape.
    Handle {
        /// Shape being resized.
        shape: ShapeId,
        /// Which corner.
        handle: Handle,
    },
    /// A cardinality label of an edge.
    Cardinality {
        /// Edge owning the label.
        edge: EdgeId,
        /// Which end.
        side: EdgeSide,
    },
    /// A shape body.
    Shape(ShapeId),
    /// An edge line.
    Edge(EdgeId),
}

/// Resolve a screen point to the most specific target under it.
///
/// Priority: resize handle, topmost shape, cardinality label, topmost edge.
/// Shapes are drawn over labels, so a label under a shape cannot be hit.
#[must_use]
pub fn hit_test(
    scene: &Scene,
    selection: &Selection,
    camera: &Camera,
    screen: Point,
    config: &EditorConfig,
) -> Option<HitTarget> {
    let doc = camera.to_document(screen);
    if let Some((shape, handle)) =
        handle_at(scene, selection, doc, config.handle_size / camera.zoom)
    {
        return Some(HitTarget::Handle { shape, handle });
    }
    if let Some(id) = shape_at(scene, doc) {
        return Some(HitTarget::Shape(id));
    }
    if let Some((edge, side)) = cardinality_label_at(scene, doc) {
        return Some(HitTarget::Cardinality { edge, side });
    }
    edge_at(scene, doc, config.edge_hit_tolerance / camera.zoom).map(HitTarget::Edge)
}

/// Topmost shape whose bounding box contains the point.
#[must_use]
pub fn shape_at(scene: &Scene, doc: Point) -> Option<ShapeId> {
    scene
        .shapes()
        .iter()
        .rev()
        .find(|s| s.contains_point(doc))
        .map(|s| s.id)
}

/// Topmost resolved edge whose center line passes within `tolerance` of the point.
#[must_use]
pub fn edge_at(scene: &Scene, doc: Point, tolerance: f32) -> Option<EdgeId> {
    scene
        .resolved_edges()
        .filter(|(_, from, to)| distance_to_segment(doc, from.center(), to.center()) <= tolerance)
        .last()
        .map(|(edge, _, _)| edge.id)
}

/// Resize handle under the point, if exactly one shape is selected.
#[must_use]
pub fn handle_at(
    scene: &Scene,
    selection: &Selection,
    doc: Point,
    handle_size: f32,
) -> Option<(ShapeId, Handle)> {
    let shape = scene.shape(selection.single_shape()?)?;
    let bounds = shape.bounds();
    Handle::ALL
        .into_iter()
        .find(|h| Rect::centered(h.corner(&bounds), handle_size, handle_size).contains(doc))
        .map(|h| (shape.id, h))
}

/// Cardinality label under the point. Empty labels are not drawn and never hit.
#[must_use]
pub fn cardinality_label_at(scene: &Scene, doc: Point) -> Option<(EdgeId, EdgeSide)> {
    scene
        .resolved_edges()
        .filter(|(_, from, to)| shows_cardinality(from, to))
        .find_map(|(edge, from, to)| {
            let (from_anchor, to_anchor) = cardinality_anchors(from, to);
            [(EdgeSide::From, from_anchor), (EdgeSide::To, to_anchor)]
                .into_iter()
                .filter(|(side, _)| edge.label(*side) != Cardinality::Empty)
                .find(|(_, anchor)| {
                    Rect::centered(*anchor, LABEL_HIT_WIDTH, LABEL_HIT_HEIGHT).contains(doc)
                })
                .map(|(side, _)| (edge.id, side))
        })
}

/// Cardinality is shown only between a relationship-family and an entity-family shape.
#[must_use]
pub fn shows_cardinality(from: &Shape, to: &Shape) -> bool {
    (from.kind.is_relationship_family() && to.kind.is_entity_family())
        || (from.kind.is_entity_family() && to.kind.is_relationship_family())
}

/// Positions of the from and to cardinality labels of an edge.
///
/// Non-entity ends anchor at their own center; entity ends anchor at the
/// midpoint of the edge. Each label is pushed [`LABEL_OFFSET`] toward the other end.
#[must_use]
pub fn cardinality_anchors(from: &Shape, to: &Shape) -> (Point, Point) {
    let c1 = from.center();
    let c2 = to.center();
    let mid = Point::new((c1.x + c2.x) / 2.0, (c1.y + c2.y) / 2.0);
    let angle = (c2.y - c1.y).atan2(c2.x - c1.x);
    let step = Point::new(angle.cos(), angle.sin()).scale(LABEL_OFFSET);

    let from_base = if from.kind.is_entity_family() { mid } else { c1 };
    let to_base = if to.kind.is_entity_family() { mid } else { c2 };
    (from_base + step, to_base - step)
}

/// Shapes and edges caught by a marquee rectangle (document space).
///
/// A shape is caught when its bounding box strictly overlaps the rectangle; an
/// edge when the box spanned by its endpoint centers does.
#[must_use]
pub fn marquee(scene: &Scene, rect: &Rect) -> Selection {
    let mut selection = Selection::new();
    for shape in scene.shapes() {
        if shape.bounds().overlaps(rect) {
            selection.add_shape(shape.id);
        }
    }
    for (edge, from, to) in scene.resolved_edges() {
        if Rect::from_corners(from.center(), to.center()).overlaps(rect) {
            selection.add_edge(edge.id);
        }
    }
    selection
}
