//! Editor state and the interaction state machine.
//!
//! [`EditorState`] owns everything the editor mutates: scene, camera,
//! selection, history and clipboard. The host feeds it [`EditorEvent`]s in
//! delivery order and re-renders whenever [`EditorState::handle_event`]
//! returns `true`.
//!
//! ```text
//!            ┌──────── pointer up ────────┐
//!            ▼                            │
//!   Idle ──pointer down──▶ Dragging | Selecting | Panning | Resizing
//!     │
//!     ├─ secondary click ─▶ pending connection source (one-shot)
//!     └─ label click / double click ─▶ Editing (until Enter, Escape or blur)
//! ```

use serde::{Deserialize, Serialize};

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::error::DiagramResult;
use crate::event::{EditorEvent, Key, KeyModifiers, PointerButton};
use crate::geometry::{snap, Camera, Point, Rect, Size};
use crate::history::History;
use crate::scene::Scene;
use crate::selection::{edge_at, hit_test, marquee, shape_at, Handle, HitTarget, Selection};
use crate::shape::{Cardinality, EdgeId, EdgeSide, Participation, ShapeId, ShapeKind};
use crate::syntax::{load_script, ScriptReport};

/// Exclusive pointer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No gesture in progress.
    Idle,
    /// Moving one or more shapes.
    Dragging,
    /// Drawing a marquee rectangle.
    Selecting,
    /// Moving the camera.
    Panning,
    /// Dragging a resize handle.
    Resizing,
}

/// Text being edited in the floating input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    /// A shape's label.
    Shape(ShapeId),
    /// One cardinality of an edge.
    Cardinality {
        /// Edge being edited.
        edge: EdgeId,
        /// Which end.
        side: EdgeSide,
    },
}

/// An open inline text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEdit {
    /// What the text will be written into.
    pub target: LabelTarget,
    /// Current contents of the input box.
    pub text: String,
}

#[derive(Debug, Clone)]
enum Gesture {
    Idle,
    Dragging {
        targets: Vec<(ShapeId, Point)>,
        start: Point,
        before: Scene,
    },
    Selecting {
        origin: Point,
        rect: Rect,
    },
    Panning {
        last: Point,
    },
    Resizing {
        shape: ShapeId,
        handle: Handle,
        start_bounds: Rect,
        start: Point,
        before: Scene,
    },
}

/// The complete editor state.
#[derive(Debug, Clone)]
pub struct EditorState {
    config: EditorConfig,
    scene: Scene,
    camera: Camera,
    selection: Selection,
    history: History,
    clipboard: Clipboard,
    gesture: Gesture,
    pending_connection: Option<ShapeId>,
    label_edit: Option<LabelEdit>,
    space_held: bool,
    last_pointer: Point,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    /// Create an editor with an empty scene.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::with_capacity(config.history_capacity),
            config,
            scene: Scene::new(),
            camera: Camera::default(),
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            gesture: Gesture::Idle,
            pending_connection: None,
            label_edit: None,
            space_held: false,
            last_pointer: Point::default(),
        }
    }

    /// Create an editor around an existing scene.
    #[must_use]
    pub fn with_scene(config: EditorConfig, scene: Scene) -> Self {
        Self {
            scene,
            ..Self::new(config)
        }
    }

    /// Editor configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene being edited.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current viewport.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Clipboard.
    #[must_use]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Current pointer mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.gesture {
            Gesture::Idle => Mode::Idle,
            Gesture::Dragging { .. } => Mode::Dragging,
            Gesture::Selecting { .. } => Mode::Selecting,
            Gesture::Panning { .. } => Mode::Panning,
            Gesture::Resizing { .. } => Mode::Resizing,
        }
    }

    /// Marquee rectangle in document space while selecting.
    #[must_use]
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Selecting { rect, .. } => Some(*rect),
            _ => None,
        }
    }

    /// Source shape of a connection waiting for its second click.
    #[must_use]
    pub fn pending_connection(&self) -> Option<ShapeId> {
        self.pending_connection
    }

    /// The open inline text edit, if any.
    #[must_use]
    pub fn label_edit(&self) -> Option<&LabelEdit> {
        self.label_edit.as_ref()
    }

    /// Whether an inline text edit is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.label_edit.is_some()
    }

    /// Last pointer position in document space.
    #[must_use]
    pub fn last_pointer(&self) -> Point {
        self.last_pointer
    }

    /// Process an input event. Returns `true` if anything visible changed.
    pub fn handle_event(&mut self, event: &EditorEvent) -> bool {
        tracing::trace!("Event: {event:?}");
        match *event {
            EditorEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(x, y), button, modifiers),
            EditorEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            EditorEvent::PointerUp { x, y } => self.pointer_up(Point::new(x, y)),
            EditorEvent::DoubleClick { x, y } => self.double_click(Point::new(x, y)),
            EditorEvent::Wheel { x, y, delta } => self.wheel(Point::new(x, y), delta),
            EditorEvent::Key {
                key,
                pressed,
                modifiers,
            } => self.key(key, pressed, modifiers),
        }
    }

    /// Pointer pressed at a screen point.
    pub fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: KeyModifiers,
    ) -> bool {
        let doc = self.camera.to_document(screen);
        self.last_pointer = doc;

        // A press that arrives before the release ends the running gesture.
        let finished = self.finish_gesture();

        // The input box loses focus: commit it and swallow the click.
        if self.label_edit.is_some() {
            self.commit_label_edit();
            return true;
        }

        if button == PointerButton::Middle || (button == PointerButton::Primary && self.space_held)
        {
            self.gesture = Gesture::Panning { last: screen };
            return finished;
        }

        if button == PointerButton::Secondary {
            return match shape_at(&self.scene, doc) {
                Some(id) => {
                    self.handle_connection(id);
                    true
                }
                None => finished,
            };
        }

        match hit_test(
            &self.scene,
            &self.selection,
            &self.camera,
            screen,
            &self.config,
        ) {
            Some(HitTarget::Handle { shape, handle }) => self.start_resize(shape, handle, doc),
            Some(HitTarget::Cardinality { edge, side }) => {
                self.begin_label_edit(LabelTarget::Cardinality { edge, side })
            }
            Some(HitTarget::Shape(id)) => self.start_drag(id, doc, modifiers.additive()),
            Some(HitTarget::Edge(_)) | None => {
                if !modifiers.additive() {
                    self.selection.clear();
                }
                self.gesture = Gesture::Selecting {
                    origin: doc,
                    rect: Rect::new(doc.x, doc.y, 0.0, 0.0),
                };
                self.sync_highlights();
                true
            }
        }
    }

    /// Pointer moved to a screen point.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let doc = self.camera.to_document(screen);
        self.last_pointer = doc;
        let grid = self.config.grid_size;

        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { targets, start, .. } => {
                let delta = doc - *start;
                let mut changed = false;
                for (id, origin) in targets.iter() {
                    let position = (*origin + delta).snapped(grid);
                    if let Some(shape) = self.scene.shape_mut(*id) {
                        if shape.position != position {
                            shape.position = position;
                            changed = true;
                        }
                    }
                }
                changed
            }
            Gesture::Selecting { origin, rect } => {
                *rect = Rect::from_corners(*origin, doc);
                true
            }
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.camera.pan_by(delta);
                true
            }
            Gesture::Resizing {
                shape,
                handle,
                start_bounds,
                start,
                ..
            } => {
                let dx = snap(doc.x - start.x, grid);
                let dy = snap(doc.y - start.y, grid);
                let bounds = resized(
                    start_bounds,
                    *handle,
                    dx,
                    dy,
                    self.config.min_shape_width,
                    self.config.min_shape_height,
                );
                match self.scene.shape_mut(*shape) {
                    Some(s) if s.bounds() != bounds => {
                        s.position = Point::new(bounds.x, bounds.y);
                        s.size = Size::new(bounds.width, bounds.height);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Pointer released. Always returns to [`Mode::Idle`].
    pub fn pointer_up(&mut self, screen: Point) -> bool {
        self.last_pointer = self.camera.to_document(screen);
        self.finish_gesture()
    }

    /// Commit the running gesture and return to [`Mode::Idle`].
    fn finish_gesture(&mut self) -> bool {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => false,
            Gesture::Panning { .. } => false,
            Gesture::Selecting { rect, .. } => {
                let caught = marquee(&self.scene, &rect);
                tracing::debug!(
                    "Marquee selected {} shapes, {} edges",
                    caught.shapes().len(),
                    caught.edges().len()
                );
                self.selection.extend(&caught);
                self.sync_highlights();
                true
            }
            Gesture::Dragging {
                targets, before, ..
            } => {
                let moved = targets.iter().any(|(id, origin)| {
                    self.scene
                        .shape(*id)
                        .is_some_and(|s| s.position != *origin)
                });
                if moved {
                    tracing::debug!("Drag committed for {} shapes", targets.len());
                    self.history.push(before);
                }
                moved
            }
            Gesture::Resizing {
                shape,
                start_bounds,
                before,
                ..
            } => {
                let changed = self
                    .scene
                    .shape(shape)
                    .is_some_and(|s| s.bounds() != start_bounds);
                if changed {
                    tracing::debug!("Resize committed for {shape}");
                    self.history.push(before);
                }
                changed
            }
        }
    }

    /// Double click: edit a shape's label, or toggle an edge's participation.
    pub fn double_click(&mut self, screen: Point) -> bool {
        if self.label_edit.is_some() {
            return false;
        }
        let doc = self.camera.to_document(screen);
        if let Some(id) = shape_at(&self.scene, doc) {
            return self.begin_label_edit(LabelTarget::Shape(id));
        }
        let tolerance = self.config.edge_hit_tolerance / self.camera.zoom;
        match edge_at(&self.scene, doc, tolerance) {
            Some(edge) => self.toggle_participation(edge),
            None => false,
        }
    }

    /// Scroll: zoom around the pointer.
    pub fn wheel(&mut self, screen: Point, delta: f32) -> bool {
        if delta == 0.0 {
            return false;
        }
        let factor = if delta < 0.0 {
            self.config.zoom_step
        } else {
            1.0 / self.config.zoom_step
        };
        let before = self.camera.zoom;
        self.camera.zoom_around(screen, factor, &self.config);
        (self.camera.zoom - before).abs() > f32::EPSILON
    }

    /// Keyboard input.
    pub fn key(&mut self, key: Key, pressed: bool, modifiers: KeyModifiers) -> bool {
        if self.label_edit.is_some() {
            // The input box owns the keyboard.
            return match (key, pressed) {
                (Key::Enter, true) => self.commit_label_edit(),
                (Key::Escape, true) => self.cancel_label_edit(),
                _ => false,
            };
        }

        if key == Key::Space {
            self.space_held = pressed;
            return false;
        }
        if !pressed {
            return false;
        }

        match key {
            Key::Delete => self.delete_selection() > 0,
            Key::Char(c) if modifiers.command() => match c.to_ascii_lowercase() {
                'z' => self.undo(),
                'c' => {
                    self.copy();
                    false
                }
                'v' => !self.paste().is_empty(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Add a shape of `kind` at the default position and select it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ShapeId {
        self.history.snapshot(&self.scene);
        let position = self.config.default_position.snapped(self.config.grid_size);
        let id = self
            .scene
            .add_shape(kind, position, kind.default_size(), kind.default_label());
        self.selection.select_only(id);
        self.sync_highlights();
        id
    }

    /// Rename a shape. Returns `false` if the shape does not exist.
    pub fn set_shape_label(&mut self, id: ShapeId, text: impl Into<String>) -> bool {
        if self.scene.shape(id).is_none() {
            return false;
        }
        self.history.snapshot(&self.scene);
        self.scene.update_shape_label(id, text)
    }

    /// Flip an edge between total and partial participation.
    pub fn toggle_participation(&mut self, edge: EdgeId) -> bool {
        if self.scene.edge(edge).is_none() {
            return false;
        }
        self.history.snapshot(&self.scene);
        match self.scene.edge_mut(edge) {
            Some(e) => {
                e.participation = e.participation.toggled();
                tracing::debug!("Edge {edge} participation -> {:?}", e.participation);
                true
            }
            None => false,
        }
    }

    /// Connect two shapes the way the interactive flow does: `1`/`1`,
    /// partial, and never a second edge between the same pair.
    pub fn connect(&mut self, from: ShapeId, to: ShapeId) -> Option<EdgeId> {
        if from == to
            || self.scene.shape(from).is_none()
            || self.scene.shape(to).is_none()
            || self.scene.has_edge_between(from, to)
        {
            return None;
        }
        self.history.snapshot(&self.scene);
        self.scene.connect_unique(
            from,
            to,
            Cardinality::One,
            Cardinality::One,
            Participation::Partial,
        )
    }

    /// Delete every selected shape (with its edges) and every selected edge
    /// as one undoable step. Returns the number of items removed.
    pub fn delete_selection(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.history.snapshot(&self.scene);

        let shapes = self.selection.shapes().to_vec();
        let mut removed = self.scene.delete_shapes(&shapes);
        for edge in self.selection.edges().to_vec() {
            if self.scene.delete_edge(edge).is_some() {
                removed += 1;
            }
        }
        if self
            .pending_connection
            .is_some_and(|id| self.scene.shape(id).is_none())
        {
            self.pending_connection = None;
        }
        self.selection.clear();
        self.sync_highlights();
        tracing::debug!("Deleted {removed} selected items");
        removed
    }

    /// Restore the scene to the most recent snapshot.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.scene) {
            return false;
        }
        self.gesture = Gesture::Idle;
        self.after_scene_replaced();
        true
    }

    /// Copy the selected shapes and their induced edges.
    pub fn copy(&mut self) -> bool {
        self.clipboard.copy(&self.scene, self.selection.shapes())
    }

    /// Paste the clipboard at the last known pointer position.
    pub fn paste(&mut self) -> Vec<ShapeId> {
        self.paste_at(self.last_pointer)
    }

    /// Paste the clipboard centered on a document point and select the result.
    pub fn paste_at(&mut self, target: Point) -> Vec<ShapeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.history.snapshot(&self.scene);
        let pasted = self
            .clipboard
            .paste(&mut self.scene, target, self.config.grid_size);
        self.selection.set_shapes(pasted.iter().copied());
        self.sync_highlights();
        pasted
    }

    /// Open the inline text box for a label. Fails if one is already open or
    /// the target does not exist.
    pub fn begin_label_edit(&mut self, target: LabelTarget) -> bool {
        if self.label_edit.is_some() {
            return false;
        }
        let Some(text) = self.label_text(target) else {
            return false;
        };
        self.label_edit = Some(LabelEdit { target, text });
        true
    }

    /// Replace the contents of the open text box.
    pub fn set_label_edit_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.label_edit {
            Some(edit) => {
                edit.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Write the text box into its target and close it.
    ///
    /// A snapshot is taken only if the value actually changes.
    pub fn commit_label_edit(&mut self) -> bool {
        let Some(edit) = self.label_edit.take() else {
            return false;
        };
        match edit.target {
            LabelTarget::Shape(id) => {
                let unchanged = self.scene.shape(id).map(|s| s.label == edit.text);
                match unchanged {
                    Some(false) => self.set_shape_label(id, edit.text),
                    _ => false,
                }
            }
            LabelTarget::Cardinality { edge, side } => {
                let value = Cardinality::parse(&edit.text);
                let unchanged = self.scene.edge(edge).map(|e| e.label(side) == value);
                if unchanged != Some(false) {
                    return false;
                }
                self.history.snapshot(&self.scene);
                if let Some(e) = self.scene.edge_mut(edge) {
                    e.set_label(side, value);
                }
                tracing::debug!("Edge {edge} {side:?} cardinality -> {value:?}");
                true
            }
        }
    }

    /// Close the text box without writing anything.
    pub fn cancel_label_edit(&mut self) -> bool {
        self.label_edit.take().is_some()
    }

    /// Run a declarative script against the scene as one undoable step.
    pub fn apply_script(&mut self, source: &str) -> ScriptReport {
        let before = self.scene.clone();
        let report = load_script(&mut self.scene, source);
        if report.shapes_created > 0 || report.edges_created > 0 {
            self.history.push(before);
        }
        report
    }

    /// Replace the scene with a loaded one. Undo returns to the previous scene.
    pub fn load_scene(&mut self, scene: Scene) {
        self.history.snapshot(&self.scene);
        self.scene = scene;
        self.gesture = Gesture::Idle;
        self.after_scene_replaced();
    }

    /// Load a persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed; the scene is untouched.
    pub fn load_json(&mut self, json: &str) -> DiagramResult<()> {
        let scene = Scene::from_json(json)?;
        self.load_scene(scene);
        Ok(())
    }

    /// Serialize the scene as a persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DiagramResult<String> {
        self.scene.to_json()
    }

    /// Start over with an empty diagram, history and clipboard.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        let camera = self.camera;
        *self = Self::new(config);
        self.camera = camera;
    }

    fn start_drag(&mut self, id: ShapeId, doc: Point, additive: bool) -> bool {
        if !self.selection.contains_shape(id) {
            if additive {
                self.selection.add_shape(id);
            } else {
                self.selection.select_only(id);
            }
        }

        let ids: Vec<ShapeId> = if self.selection.shapes().len() > 1 {
            self.selection.shapes().to_vec()
        } else {
            vec![id]
        };
        let targets = ids
            .into_iter()
            .filter_map(|id| self.scene.shape(id).map(|s| (id, s.position)))
            .collect();

        self.gesture = Gesture::Dragging {
            targets,
            start: doc,
            before: self.scene.clone(),
        };
        self.sync_highlights();
        true
    }

    fn start_resize(&mut self, id: ShapeId, handle: Handle, doc: Point) -> bool {
        let Some(shape) = self.scene.shape(id) else {
            return false;
        };
        self.gesture = Gesture::Resizing {
            shape: id,
            handle,
            start_bounds: shape.bounds(),
            start: doc,
            before: self.scene.clone(),
        };
        false
    }

    fn handle_connection(&mut self, target: ShapeId) {
        match self.pending_connection.take() {
            None => {
                tracing::trace!("Connection source: {target}");
                self.pending_connection = Some(target);
            }
            Some(source) => {
                if self.connect(source, target).is_some() {
                    tracing::debug!("Connected {source} -> {target}");
                }
            }
        }
        self.sync_highlights();
    }

    fn label_text(&self, target: LabelTarget) -> Option<String> {
        match target {
            LabelTarget::Shape(id) => self.scene.shape(id).map(|s| s.label.clone()),
            LabelTarget::Cardinality { edge, side } => self
                .scene
                .edge(edge)
                .map(|e| e.label(side).as_str().to_string()),
        }
    }

    fn after_scene_replaced(&mut self) {
        self.selection.retain_existing(&self.scene);
        if self
            .pending_connection
            .is_some_and(|id| self.scene.shape(id).is_none())
        {
            self.pending_connection = None;
        }
        if let Some(edit) = &self.label_edit {
            if self.label_text(edit.target).is_none() {
                self.label_edit = None;
            }
        }
        self.sync_highlights();
    }

    fn sync_highlights(&mut self) {
        let selection = &self.selection;
        let pending = self.pending_connection;
        for shape in self.scene.shapes_mut() {
            shape.highlighted = selection.contains_shape(shape.id) || pending == Some(shape.id);
        }
    }
}

/// Apply a snapped handle delta to a box, keeping the opposite corner fixed
/// when a minimum size kicks in.
fn resized(start: &Rect, handle: Handle, dx: f32, dy: f32, min_w: f32, min_h: f32) -> Rect {
    let right = start.x + start.width;
    let bottom = start.y + start.height;

    let (x, width) = if handle.west() {
        let width = (start.width - dx).max(min_w);
        (right - width, width)
    } else {
        (start.x, (start.width + dx).max(min_w))
    };
    let (y, height) = if handle.north() {
        let height = (start.height - dy).max(min_h);
        (bottom - height, height)
    } else {
        (start.y, (start.height + dy).max(min_h))
    };
    Rect::new(x, y, width, height)
}
