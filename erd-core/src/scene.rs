//! Scene model: the authoritative shape and edge lists.
//!
//! Shapes are kept in creation order, which is also the z-order (later shapes
//! are drawn on top). Edges may dangle after a document load; they are skipped
//! by [`Scene::resolved_edges`] and never break an operation.

use serde::{Deserialize, Serialize};

use crate::error::{DiagramError, DiagramResult};
use crate::geometry::{Point, Size};
use crate::shape::{Cardinality, Edge, EdgeId, Participation, Shape, ShapeId, ShapeKind};

/// All shapes and edges of a diagram.
///
/// This is also the persisted document: `{ "shapes": [...], "edges": [...] }`.
/// Either key may be missing on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    shapes: Vec<Shape>,
    edges: Vec<Edge>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new shape and return its fresh id.
    pub fn add_shape(
        &mut self,
        kind: ShapeKind,
        position: Point,
        size: Size,
        label: impl Into<String>,
    ) -> ShapeId {
        self.insert_shape(
            Shape::new(kind)
                .with_position(position)
                .with_size(size)
                .with_label(label),
        )
    }

    /// Append an already built shape.
    pub fn insert_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        tracing::debug!("Shape added: {id} ({:?} '{}')", shape.kind, shape.label);
        self.shapes.push(shape);
        id
    }

    /// Append an edge. No uniqueness check; see [`Scene::connect_unique`].
    pub fn add_edge(
        &mut self,
        from_id: ShapeId,
        to_id: ShapeId,
        from_label: Cardinality,
        to_label: Cardinality,
        participation: Participation,
    ) -> EdgeId {
        self.insert_edge(
            Edge::new(from_id, to_id)
                .with_labels(from_label, to_label)
                .with_participation(participation),
        )
    }

    /// Append an already built edge.
    pub fn insert_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        tracing::debug!("Edge added: {} -> {}", edge.from_id, edge.to_id);
        self.edges.push(edge);
        id
    }

    /// Append an edge unless one already joins the same unordered pair.
    ///
    /// Returns `None` when an edge was already present.
    pub fn connect_unique(
        &mut self,
        from_id: ShapeId,
        to_id: ShapeId,
        from_label: Cardinality,
        to_label: Cardinality,
        participation: Participation,
    ) -> Option<EdgeId> {
        if self.has_edge_between(from_id, to_id) {
            tracing::trace!("Duplicate connection {from_id} <-> {to_id} suppressed");
            return None;
        }
        Some(self.add_edge(from_id, to_id, from_label, to_label, participation))
    }

    /// Whether any edge joins `a` and `b`, in either direction.
    #[must_use]
    pub fn has_edge_between(&self, a: ShapeId, b: ShapeId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    /// Replace a shape's label. Returns `false` if the shape does not exist.
    pub fn update_shape_label(&mut self, id: ShapeId, text: impl Into<String>) -> bool {
        self.shape_mut(id).map(|s| s.label = text.into()).is_some()
    }

    /// Move a shape. Returns `false` if the shape does not exist.
    pub fn update_shape_position(&mut self, id: ShapeId, position: Point) -> bool {
        self.shape_mut(id).map(|s| s.position = position).is_some()
    }

    /// Resize a shape. Returns `false` if the shape does not exist.
    pub fn update_shape_size(&mut self, id: ShapeId, size: Size) -> bool {
        self.shape_mut(id).map(|s| s.size = size).is_some()
    }

    /// Remove a shape together with every edge that references it.
    ///
    /// Deleting an unknown id is a no-op returning `None`.
    pub fn delete_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        let shape = self.shapes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|e| !e.references(id));
        tracing::debug!(
            "Shape removed: {id} (and {} edges)",
            before - self.edges.len()
        );
        Some(shape)
    }

    /// Remove several shapes and their edges. Returns how many shapes were removed.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> usize {
        ids.iter()
            .filter(|id| self.delete_shape(**id).is_some())
            .count()
    }

    /// Remove an edge by id.
    pub fn delete_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(index))
    }

    /// Get a shape by ID.
    #[must_use]
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Get an edge by ID.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an edge by ID.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// First shape whose label equals `label`.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.label == label)
    }

    /// All shapes in z-order (bottom first).
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Mutable access to every shape. Ids must not be changed.
    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.shapes.iter_mut()
    }

    /// All edges, dangling ones included.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges whose endpoints both exist, paired with those endpoints.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (&Edge, &Shape, &Shape)> {
        self.edges.iter().filter_map(|edge| {
            let from = self.shape(edge.from_id)?;
            let to = self.shape(edge.to_id)?;
            Some((edge, from, to))
        })
    }

    /// Drop every edge whose endpoints are not both present.
    /// Returns the number of edges removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let before = self.edges.len();
        let shapes = &self.shapes;
        self.edges.retain(|e| {
            shapes.iter().any(|s| s.id == e.from_id) && shapes.iter().any(|s| s.id == e.to_id)
        });
        let removed = before - self.edges.len();
        if removed > 0 {
            tracing::debug!("Pruned {removed} dangling edges");
        }
        removed
    }

    /// Get the number of shapes in the scene.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Get the number of edges in the scene.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the scene has no shapes and no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.edges.is_empty()
    }

    /// Serialize the scene to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DiagramResult<String> {
        serde_json::to_string_pretty(self).map_err(DiagramError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// Transient fields are reset and missing lists default to empty. Edges are
    /// not checked against the shape list.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or is not an object.
    pub fn from_json(json: &str) -> DiagramResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(DiagramError::InvalidDocument(
                "expected an object with `shapes` and `edges`".to_string(),
            ));
        }
        let scene: Self = serde_json::from_value(value)?;
        tracing::debug!(
            "Scene loaded: {} shapes, {} edges",
            scene.shape_count(),
            scene.edge_count()
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(scene: &mut Scene, label: &str, x: f32) -> ShapeId {
        scene.add_shape(
            ShapeKind::Entity,
            Point::new(x, 100.0),
            Size::new(120.0, 60.0),
            label,
        )
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());

        let id = entity(&mut scene, "STUDENT", 100.0);
        assert_eq!(scene.shape_count(), 1);
        assert!(scene.shape(id).is_some());

        scene.delete_shape(id).expect("should remove");
        assert!(scene.is_empty());
    }

    #[test]
    fn test_delete_removes_edges_both_directions() {
        let mut scene = Scene::new();
        let a = entity(&mut scene, "A", 0.0);
        let b = entity(&mut scene, "B", 200.0);
        let c = entity(&mut scene, "C", 400.0);
        scene.add_edge(a, b, Cardinality::One, Cardinality::N, Participation::Partial);
        scene.add_edge(c, a, Cardinality::Empty, Cardinality::Empty, Participation::Total);
        scene.add_edge(b, c, Cardinality::Empty, Cardinality::Empty, Participation::Partial);

        scene.delete_shape(a);
        assert_eq!(scene.edge_count(), 1);
        assert!(scene.edges().iter().all(|e| !e.references(a)));
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut scene = Scene::new();
        entity(&mut scene, "A", 0.0);
        assert!(scene.delete_shape(ShapeId::new()).is_none());
        assert_eq!(scene.shape_count(), 1);
    }

    #[test]
    fn test_delete_shapes_batch() {
        let mut scene = Scene::new();
        let a = entity(&mut scene, "A", 0.0);
        let b = entity(&mut scene, "B", 200.0);
        let c = entity(&mut scene, "C", 400.0);
        scene.add_edge(a, c, Cardinality::Empty, Cardinality::Empty, Participation::Partial);
        assert_eq!(scene.delete_shapes(&[a, b, ShapeId::new()]), 2);
        assert_eq!(scene.shape_count(), 1);
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn test_connect_unique_ignores_direction() {
        let mut scene = Scene::new();
        let a = entity(&mut scene, "A", 0.0);
        let b = entity(&mut scene, "B", 200.0);
        assert!(scene
            .connect_unique(a, b, Cardinality::One, Cardinality::One, Participation::Partial)
            .is_some());
        assert!(scene
            .connect_unique(b, a, Cardinality::One, Cardinality::One, Participation::Partial)
            .is_none());
        assert_eq!(scene.edge_count(), 1);
    }

    #[test]
    fn test_updates_report_misses() {
        let mut scene = Scene::new();
        let a = entity(&mut scene, "A", 0.0);
        assert!(scene.update_shape_label(a, "PERSON"));
        assert!(scene.update_shape_position(a, Point::new(40.0, 60.0)));
        assert!(scene.update_shape_size(a, Size::new(80.0, 40.0)));
        assert!(!scene.update_shape_label(ShapeId::new(), "X"));

        let shape = scene.shape(a).expect("shape exists");
        assert_eq!(shape.label, "PERSON");
        assert_eq!(shape.position, Point::new(40.0, 60.0));
        assert_eq!(shape.size, Size::new(80.0, 40.0));
    }

    #[test]
    fn test_find_by_label_first_match_wins() {
        let mut scene = Scene::new();
        let first = entity(&mut scene, "DUP", 0.0);
        entity(&mut scene, "DUP", 200.0);
        assert_eq!(scene.find_by_label("DUP").map(|s| s.id), Some(first));
        assert!(scene.find_by_label("MISSING").is_none());
    }

    #[test]
    fn test_dangling_edges_are_skipped_and_pruned() {
        let mut scene = Scene::new();
        let a = entity(&mut scene, "A", 0.0);
        let b = entity(&mut scene, "B", 200.0);
        scene.add_edge(a, b, Cardinality::Empty, Cardinality::Empty, Participation::Partial);
        scene.add_edge(a, ShapeId::new(), Cardinality::Empty, Cardinality::Empty, Participation::Partial);

        assert_eq!(scene.resolved_edges().count(), 1);
        assert_eq!(scene.prune_dangling_edges(), 1);
        assert_eq!(scene.edge_count(), 1);
    }

    #[test]
    fn test_from_json_defaults_missing_lists() {
        let scene = Scene::from_json("{}").expect("empty object is a valid document");
        assert!(scene.is_empty());
        assert!(Scene::from_json("[]").is_err());
        assert!(Scene::from_json("not json").is_err());
    }

    #[test]
    fn test_json_shape_format() {
        let mut scene = Scene::new();
        entity(&mut scene, "STUDENT", 100.0);
        let json = scene.to_json().expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let shape = &value["shapes"][0];
        assert_eq!(shape["kind"], "entity");
        assert_eq!(shape["label"], "STUDENT");
        assert_eq!(shape["position"]["x"], 100.0);
        assert_eq!(shape["size"]["width"], 120.0);
        assert!(value["edges"].as_array().is_some_and(Vec::is_empty));
    }
}
