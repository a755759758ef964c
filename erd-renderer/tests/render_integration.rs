//! Integration tests for rendering live editor state (erd-renderer).

use erd_core::{EditorEvent, EditorState, PointerButton};
use erd_renderer::{BackendType, RenderView, Renderer, RendererConfig};

fn svg_renderer() -> Renderer {
    Renderer::new(RendererConfig {
        grid_extent: 0.0,
        ..RendererConfig::default()
    })
    .expect("svg renderer")
}

#[test]
fn test_render_student_enrolls() {
    let mut state = EditorState::default();
    let report = state.apply_script(
        "entity STUDENT (100, 100)\n\
         relationship ENROLLS (300, 100)\n\
         attribute NAME of STUDENT\n\
         connect STUDENT ENROLLS 1 N total",
    );
    assert!(report.is_clean());

    let mut renderer = svg_renderer();
    renderer.render(&RenderView::of(&state)).expect("frame");
    let svg = renderer.last_output().expect("svg output");

    assert!(svg.contains(">STUDENT</text>"));
    assert!(svg.contains(">ENROLLS</text>"));
    assert!(svg.contains(">NAME</text>"));
    // Attribute edge has no cardinality; the relationship edge shows both.
    assert!(svg.contains(">1</text>"));
    assert!(svg.contains(">N</text>"));
    // Attribute edge (1 line) + total edge (2 lines).
    assert_eq!(svg.matches("<line").count(), 3);
}

#[test]
fn test_marquee_and_camera_follow_editor() {
    let mut state = EditorState::default();
    state.handle_event(&EditorEvent::Wheel {
        x: 0.0,
        y: 0.0,
        delta: -1.0,
    });
    state.handle_event(&EditorEvent::pointer_down(10.0, 10.0, PointerButton::Primary));
    state.handle_event(&EditorEvent::PointerMove { x: 120.0, y: 60.0 });

    let mut renderer = svg_renderer();
    renderer.render(&RenderView::of(&state)).expect("frame");
    let svg = renderer.last_output().expect("svg output");
    assert!(svg.contains("class=\"marquee\""));
    assert!(svg.contains("scale(1.1)"));

    state.handle_event(&EditorEvent::PointerUp { x: 120.0, y: 60.0 });
    renderer.render(&RenderView::of(&state)).expect("frame");
    assert!(!renderer
        .last_output()
        .is_some_and(|svg| svg.contains("class=\"marquee\"")));
    assert_eq!(renderer.frame_count(), 2);
}

#[test]
fn test_dangling_edges_are_skipped() {
    let mut state = EditorState::default();
    state
        .load_json(
            r#"{
                "shapes": [{"id": "6f1c2f3e-2d4b-4a59-9a3e-3a1b2c3d4e5f", "kind": "entity",
                            "position": {"x": 0, "y": 0}, "size": {"width": 120, "height": 60},
                            "label": "ONLY"}],
                "edges": [{"fromId": "6f1c2f3e-2d4b-4a59-9a3e-3a1b2c3d4e5f",
                           "toId": "00000000-0000-4000-8000-000000000000"}]
            }"#,
        )
        .expect("document loads");

    for backend in [BackendType::Svg, BackendType::Log] {
        let mut renderer = Renderer::new(RendererConfig {
            preferred_backend: backend,
            grid_extent: 0.0,
            ..RendererConfig::default()
        })
        .expect("renderer");
        renderer.render(&RenderView::of(&state)).expect("frame");
        if let Some(svg) = renderer.last_output() {
            assert_eq!(svg.matches("<line").count(), 0);
            assert!(svg.contains(">ONLY</text>"));
        }
    }
}
