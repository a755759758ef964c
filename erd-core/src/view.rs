//! Overlay state for hosts that draw the scene themselves.
//!
//! The persisted document carries shapes and edges but none of the
//! interaction state. [`EditorView`] adds what a renderer needs on top of it:
//! highlight flags, the selection, resize handles, the marquee and where the
//! floating input box belongs. Edges are referred to by their index in the
//! document's `edges` list, since edge ids are runtime only.

use serde::Serialize;

use crate::geometry::{Camera, Point, Rect};
use crate::scene::Scene;
use crate::selection::cardinality_anchors;
use crate::shape::{EdgeId, EdgeSide, ShapeId};
use crate::state::{EditorState, LabelTarget, Mode};

/// Interaction overlay of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    /// Current pointer mode.
    pub mode: Mode,
    /// Viewport transform.
    pub camera: Camera,
    /// Shapes drawn with the accent outline.
    pub highlighted: Vec<ShapeId>,
    /// Selected shapes in selection order.
    pub selected_shapes: Vec<ShapeId>,
    /// Selected edges, as indices into the document's edge list.
    pub selected_edges: Vec<usize>,
    /// Bounds of the single selected shape, whose corners carry resize handles.
    pub handles: Option<Rect>,
    /// Marquee rectangle in document space.
    pub marquee: Option<Rect>,
    /// Source of a connection waiting for its second click.
    pub pending_connection: Option<ShapeId>,
    /// The open inline text edit.
    pub label_edit: Option<LabelEditView>,
}

/// Where and what the floating input box shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEditView {
    /// Shape whose label is edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeId>,
    /// Index of the edge whose cardinality is edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<usize>,
    /// Which cardinality of that edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<EdgeSide>,
    /// Current contents of the input box.
    pub text: String,
    /// Center of the input box in document space.
    pub anchor: Point,
}

impl EditorView {
    /// Capture the overlay of the live editor state.
    #[must_use]
    pub fn of(state: &EditorState) -> Self {
        let scene = state.scene();
        let selection = state.selection();

        Self {
            mode: state.mode(),
            camera: *state.camera(),
            highlighted: scene
                .shapes()
                .iter()
                .filter(|s| s.highlighted)
                .map(|s| s.id)
                .collect(),
            selected_shapes: selection.shapes().to_vec(),
            selected_edges: selection
                .edges()
                .iter()
                .filter_map(|id| edge_index(scene, *id))
                .collect(),
            handles: selection
                .single_shape()
                .and_then(|id| scene.shape(id))
                .map(crate::shape::Shape::bounds),
            marquee: state.marquee(),
            pending_connection: state.pending_connection(),
            label_edit: state.label_edit().and_then(|edit| {
                let (shape, edge, side, anchor) = match edit.target {
                    LabelTarget::Shape(id) => (Some(id), None, None, scene.shape(id)?.center()),
                    LabelTarget::Cardinality { edge, side } => {
                        let (_, from, to) =
                            scene.resolved_edges().find(|(e, _, _)| e.id == edge)?;
                        let (from_anchor, to_anchor) = cardinality_anchors(from, to);
                        let anchor = match side {
                            EdgeSide::From => from_anchor,
                            EdgeSide::To => to_anchor,
                        };
                        (None, edge_index(scene, edge), Some(side), anchor)
                    }
                };
                Some(LabelEditView {
                    shape,
                    edge,
                    side,
                    text: edit.text.clone(),
                    anchor,
                })
            }),
        }
    }
}

fn edge_index(scene: &Scene, id: EdgeId) -> Option<usize> {
    scene.edges().iter().position(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyModifiers, PointerButton};
    use crate::shape::ShapeKind;

    #[test]
    fn test_view_of_idle_editor() {
        let state = EditorState::default();
        let view = EditorView::of(&state);
        assert_eq!(view.mode, Mode::Idle);
        assert!(view.highlighted.is_empty());
        assert!(view.handles.is_none());
        assert!(view.label_edit.is_none());
    }

    #[test]
    fn test_view_reports_selection_and_handles() {
        let mut state = EditorState::default();
        let id = state.add_shape(ShapeKind::Entity);
        let view = EditorView::of(&state);
        assert_eq!(view.highlighted, vec![id]);
        assert_eq!(view.selected_shapes, vec![id]);
        assert_eq!(view.handles, Some(Rect::new(100.0, 100.0, 120.0, 60.0)));
    }

    #[test]
    fn test_view_reports_marquee() {
        let mut state = EditorState::default();
        state.pointer_down(
            Point::new(500.0, 500.0),
            PointerButton::Primary,
            KeyModifiers::default(),
        );
        state.pointer_move(Point::new(540.0, 520.0));
        let view = EditorView::of(&state);
        assert_eq!(view.mode, Mode::Selecting);
        assert_eq!(view.marquee, Some(Rect::new(500.0, 500.0, 40.0, 20.0)));
    }

    #[test]
    fn test_view_places_cardinality_input() {
        let mut state = EditorState::default();
        state.apply_script("entity E (0, 0)\nrelationship R (300, 0)\nconnect E R 1 N");
        state.pointer_down(
            Point::new(228.0, 30.0),
            PointerButton::Primary,
            KeyModifiers::default(),
        );

        let edit = EditorView::of(&state).label_edit.expect("edit open");
        assert_eq!(edit.edge, Some(0));
        assert_eq!(edit.side, Some(EdgeSide::From));
        assert_eq!(edit.text, "1");
        assert!((edit.anchor.x - 228.0).abs() < 1e-3 && (edit.anchor.y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_view_json_shape() {
        let mut state = EditorState::default();
        let id = state.add_shape(ShapeKind::Entity);
        assert!(state.begin_label_edit(LabelTarget::Shape(id)));

        let json = serde_json::to_value(EditorView::of(&state)).expect("serializes");
        assert_eq!(json["mode"], "idle");
        assert_eq!(json["selectedShapes"][0], id.to_string());
        assert_eq!(json["labelEdit"]["text"], "ENTITY");
        assert_eq!(json["labelEdit"]["anchor"]["x"], 160.0);
        assert!(json["labelEdit"].get("edge").is_none());
        assert!(json["marquee"].is_null());
    }
}
