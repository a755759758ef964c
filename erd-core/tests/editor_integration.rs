//! # Editor Integration Tests
//!
//! End-to-end checks of the editing engine through its public API: snapping,
//! deletion, undo, clipboard, marquee selection, connections and persistence.

use erd_core::{
    marquee, snap, Cardinality, EditorConfig, EditorEvent, EditorState, History, Key,
    KeyModifiers, Participation, PointerButton, Point, Rect, Scene, ShapeId, ShapeKind, Size,
};
use proptest::prelude::*;

const GRID: f32 = 20.0;

/// Scene with STUDENT and ENROLLS side by side.
fn student_enrolls() -> (EditorState, ShapeId, ShapeId) {
    let mut scene = Scene::new();
    let student = scene.add_shape(
        ShapeKind::Entity,
        Point::new(100.0, 100.0),
        Size::new(120.0, 60.0),
        "STUDENT",
    );
    let enrolls = scene.add_shape(
        ShapeKind::Relationship,
        Point::new(300.0, 100.0),
        Size::new(120.0, 60.0),
        "ENROLLS",
    );
    (
        EditorState::with_scene(EditorConfig::default(), scene),
        student,
        enrolls,
    )
}

fn secondary_click(state: &mut EditorState, x: f32, y: f32) {
    state.handle_event(&EditorEvent::pointer_down(x, y, PointerButton::Secondary));
    state.handle_event(&EditorEvent::PointerUp { x, y });
}

/// Fields that survive persistence, for comparing saved and loaded scenes.
fn persisted_fields(scene: &Scene) -> (Vec<String>, Vec<String>) {
    let shapes = scene
        .shapes()
        .iter()
        .map(|s| {
            format!(
                "{}|{:?}|{:?}|{:?}|{}",
                s.id, s.kind, s.position, s.size, s.label
            )
        })
        .collect();
    let edges = scene
        .edges()
        .iter()
        .map(|e| {
            format!(
                "{}|{}|{:?}|{:?}|{:?}",
                e.from_id, e.to_id, e.from_label, e.to_label, e.participation
            )
        })
        .collect();
    (shapes, edges)
}

fn arb_kind() -> impl Strategy<Value = ShapeKind> {
    prop::sample::select(ShapeKind::ALL.to_vec())
}

fn arb_scene() -> impl Strategy<Value = Scene> {
    (
        prop::collection::vec((arb_kind(), -500i32..500, -500i32..500), 1..8),
        prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..12),
    )
        .prop_map(|(shapes, edges)| {
            let mut scene = Scene::new();
            let ids: Vec<ShapeId> = shapes
                .into_iter()
                .map(|(kind, x, y)| {
                    #[allow(clippy::cast_precision_loss)]
                    let position = Point::new(x as f32, y as f32);
                    scene.add_shape(kind, position, kind.default_size(), kind.default_label())
                })
                .collect();
            for (a, b) in edges {
                scene.add_edge(
                    *a.get(&ids),
                    *b.get(&ids),
                    Cardinality::One,
                    Cardinality::N,
                    Participation::Partial,
                );
            }
            scene
        })
}

proptest! {
    #[test]
    fn prop_snap_is_idempotent_and_on_grid(v in -100_000.0f32..100_000.0f32) {
        let once = snap(v, GRID);
        prop_assert_eq!(snap(once, GRID), once);
        prop_assert_eq!(once % GRID, 0.0);
    }

    #[test]
    fn prop_delete_cleans_edges(scene in arb_scene(), pick in any::<prop::sample::Index>()) {
        let mut scene = scene;
        let id = pick.get(scene.shapes()).id;
        prop_assert!(scene.delete_shape(id).is_some());
        prop_assert!(scene.edges().iter().all(|e| e.from_id != id && e.to_id != id));
        prop_assert!(scene.shape(id).is_none());
    }

    #[test]
    fn prop_undo_restores_previous_scene(
        scene in arb_scene(),
        pick in any::<prop::sample::Index>(),
        dx in -200i32..200,
    ) {
        let original = scene.clone();
        let mut history = History::new();
        let mut scene = scene;
        let id = pick.get(scene.shapes()).id;

        history.snapshot(&scene);
        #[allow(clippy::cast_precision_loss)]
        let moved = Point::new(dx as f32, 0.0);
        scene.update_shape_position(id, moved);
        scene.update_shape_label(id, "CHANGED");
        scene.delete_shape(id);

        prop_assert!(history.undo(&mut scene));
        prop_assert_eq!(scene, original);
    }

    #[test]
    fn prop_marquee_selects_exactly_overlapping_shapes(
        scene in arb_scene(),
        x in -600.0f32..600.0,
        y in -600.0f32..600.0,
        w in 0.0f32..400.0,
        h in 0.0f32..400.0,
    ) {
        let rect = Rect::new(x, y, w, h);
        let selection = marquee(&scene, &rect);
        for shape in scene.shapes() {
            let b = shape.bounds();
            let expected = b.x < rect.x + rect.width
                && b.x + b.width > rect.x
                && b.y < rect.y + rect.height
                && b.y + b.height > rect.y;
            prop_assert_eq!(selection.contains_shape(shape.id), expected);
        }
    }
}

#[test]
fn test_history_keeps_fifty_snapshots() {
    let mut history = History::new();
    let mut scene = Scene::new();
    for i in 0..60 {
        scene.add_shape(
            ShapeKind::Entity,
            Point::default(),
            Size::new(120.0, 60.0),
            format!("E{i}"),
        );
        history.snapshot(&scene);
    }
    assert_eq!(history.len(), 50);

    for _ in 0..50 {
        assert!(history.undo(&mut scene));
    }
    // Oldest surviving snapshot holds 11 shapes (snapshots 1..=10 were dropped).
    assert_eq!(scene.shape_count(), 11);
    assert!(!history.undo(&mut scene));
    assert_eq!(scene.shape_count(), 11);
}

#[test]
fn test_copy_paste_preserves_topology_not_identity() {
    let (mut state, student, enrolls) = student_enrolls();
    state.connect(student, enrolls);
    state.apply_script("entity COURSE (500, 100)\nconnect ENROLLS COURSE N 1 total");

    let before_ids: Vec<ShapeId> = state.scene().shapes().iter().map(|s| s.id).collect();
    let before_edges = state.scene().edge_count();

    // Marquee everything: three shapes, two induced edges.
    state.handle_event(&EditorEvent::pointer_down(
        80.0,
        80.0,
        PointerButton::Primary,
    ));
    state.handle_event(&EditorEvent::PointerMove { x: 700.0, y: 200.0 });
    state.handle_event(&EditorEvent::PointerUp { x: 700.0, y: 200.0 });
    assert_eq!(state.selection().shapes().len(), 3);
    assert!(state.copy());

    let pasted = state.paste_at(Point::new(400.0, 600.0));
    assert_eq!(pasted.len(), 3);
    assert!(pasted.iter().all(|id| !before_ids.contains(id)));
    assert_eq!(state.scene().edge_count(), before_edges * 2);

    let source = &state.scene().shapes()[..3];
    let copies: Vec<_> = pasted
        .iter()
        .filter_map(|id| state.scene().shape(*id))
        .collect();
    let offset = copies[0].position - source[0].position;
    for (copy, original) in copies.iter().zip(source) {
        assert_eq!(copy.size, original.size);
        assert_eq!(copy.label, original.label);
        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.position - original.position, offset);
    }

    let new_edges = &state.scene().edges()[before_edges..];
    assert!(new_edges
        .iter()
        .all(|e| pasted.contains(&e.from_id) && pasted.contains(&e.to_id)));
    assert_eq!(state.selection().shapes(), pasted.as_slice());
}

#[test]
fn test_paste_twice_from_same_clipboard() {
    let (mut state, student, _) = student_enrolls();
    state.handle_event(&EditorEvent::pointer_down(
        150.0,
        120.0,
        PointerButton::Primary,
    ));
    state.handle_event(&EditorEvent::PointerUp { x: 150.0, y: 120.0 });
    assert_eq!(state.selection().single_shape(), Some(student));
    assert!(state.copy());

    let first = state.paste_at(Point::new(100.0, 400.0));
    let second = state.paste_at(Point::new(500.0, 400.0));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first[0], second[0]);
    assert_eq!(state.scene().shape_count(), 4);
    assert_eq!(
        state.scene().shape(second[0]).map(|s| s.label.as_str()),
        Some("STUDENT")
    );
}

#[test]
fn test_interactive_connect_twice_yields_one_edge() {
    let (mut state, student, enrolls) = student_enrolls();

    for _ in 0..2 {
        secondary_click(&mut state, 150.0, 120.0);
        secondary_click(&mut state, 350.0, 120.0);
    }
    assert_eq!(state.scene().edge_count(), 1);

    // Reverse direction counts as the same pair.
    secondary_click(&mut state, 350.0, 120.0);
    secondary_click(&mut state, 150.0, 120.0);
    assert_eq!(state.scene().edge_count(), 1);

    let edge = &state.scene().edges()[0];
    assert_eq!(edge.from_id, student);
    assert_eq!(edge.to_id, enrolls);
    assert_eq!(edge.from_label, Cardinality::One);
    assert_eq!(edge.to_label, Cardinality::One);
    assert_eq!(edge.participation, Participation::Partial);

    let json: serde_json::Value =
        serde_json::from_str(&state.to_json().expect("serializes")).expect("valid json");
    assert_eq!(json["edges"][0]["fromLabel"], "1");
    assert_eq!(json["edges"][0]["toLabel"], "1");
    assert_eq!(json["edges"][0]["participation"], "partial");
}

#[test]
fn test_script_connect_allows_parallel_edges() {
    let (mut state, ..) = student_enrolls();
    let report = state.apply_script("connect STUDENT ENROLLS\nconnect STUDENT ENROLLS");
    assert!(report.is_clean());
    assert_eq!(state.scene().edge_count(), 2);
}

#[test]
fn test_save_load_round_trip() {
    let (mut state, student, _) = student_enrolls();
    state.apply_script(
        "weak_entity DEPENDENT (100, 300)\n\
         idr HAS (300, 300)\n\
         circle NOTE (500, 500)\n\
         attribute NAME of STUDENT\n\
         connect DEPENDENT HAS 1 N total",
    );
    state.handle_event(&EditorEvent::pointer_down(
        150.0,
        120.0,
        PointerButton::Primary,
    ));
    assert!(state.scene().shape(student).is_some_and(|s| s.highlighted));

    let json = state.to_json().expect("serializes");
    assert!(!json.contains("highlighted"));

    let loaded = Scene::from_json(&json).expect("loads");
    assert!(loaded.shapes().iter().all(|s| !s.highlighted));
    assert_eq!(persisted_fields(&loaded), persisted_fields(state.scene()));
}

#[test]
fn test_keyboard_session() {
    let mut state = EditorState::default();
    let ctrl = KeyModifiers {
        ctrl: true,
        ..KeyModifiers::default()
    };

    let id = state.add_shape(ShapeKind::WeakEntity);
    assert_eq!(
        state.scene().shape(id).map(|s| s.label.as_str()),
        Some("WEAK_ENTITY")
    );

    state.handle_event(&EditorEvent::key_press(Key::Char('c'), ctrl));
    state.handle_event(&EditorEvent::PointerMove { x: 600.0, y: 400.0 });
    state.handle_event(&EditorEvent::key_press(Key::Char('v'), ctrl));
    assert_eq!(state.scene().shape_count(), 2);

    state.handle_event(&EditorEvent::key_press(Key::Delete, KeyModifiers::default()));
    assert_eq!(state.scene().shape_count(), 1);

    // Undo delete, paste, add.
    for expected in [2, 1, 0] {
        state.handle_event(&EditorEvent::key_press(Key::Char('z'), ctrl));
        assert_eq!(state.scene().shape_count(), expected);
    }
    assert!(state.history().is_empty());
}
