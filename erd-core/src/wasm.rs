//! WebAssembly bindings for erd-core.
//!
//! The host page owns the canvas element and the floating text input; it
//! forwards DOM events here and re-renders whenever a method returns `true`.

use wasm_bindgen::prelude::*;

use crate::{
    EditorConfig, EditorEvent, EditorState, EditorView, Key, KeyModifiers, Point, PointerButton,
    ShapeKind,
};

/// Initialize the ERD WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    state: EditorState,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: EditorState::default(),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration cannot be parsed.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self {
            state: EditorState::new(config),
        })
    }

    /// Pointer pressed. `button` is the DOM `MouseEvent.button` code.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32, button: i16, shift: bool) -> bool {
        let Some(button) = PointerButton::from_code(button) else {
            return false;
        };
        let modifiers = KeyModifiers {
            shift,
            ..KeyModifiers::default()
        };
        self.state
            .pointer_down(Point::new(x, y), button, modifiers)
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.state.pointer_move(Point::new(x, y))
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.state.pointer_up(Point::new(x, y))
    }

    /// Double click.
    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.state.double_click(Point::new(x, y))
    }

    /// Wheel scrolled.
    pub fn wheel(&mut self, x: f32, y: f32, delta: f32) -> bool {
        self.state.wheel(Point::new(x, y), delta)
    }

    /// Key pressed or released. `key` is the DOM `KeyboardEvent.key` value.
    pub fn key(&mut self, key: &str, pressed: bool, ctrl: bool, meta: bool, shift: bool) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        let modifiers = KeyModifiers {
            shift,
            ctrl,
            alt: false,
            meta,
        };
        self.state.key(key, pressed, modifiers)
    }

    /// Apply a serialized [`EditorEvent`].
    ///
    /// # Errors
    ///
    /// Returns an error string if the event JSON is invalid.
    #[wasm_bindgen(js_name = handleEventJson)]
    pub fn handle_event_json(&mut self, json: &str) -> Result<bool, String> {
        let event: EditorEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.state.handle_event(&event))
    }

    /// Add a shape by short name (`entity`, `weak_entity`, `relationship`,
    /// `idr`, `attribute`, `circle`). Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown kind.
    #[wasm_bindgen(js_name = addShape)]
    pub fn add_shape(&mut self, kind: &str) -> Result<String, String> {
        let kind = ShapeKind::from_short_name(kind).ok_or_else(|| format!("Unknown shape: {kind}"))?;
        Ok(self.state.add_shape(kind).to_string())
    }

    /// Current text of the inline label editor, if open.
    #[wasm_bindgen(js_name = labelEditText)]
    #[must_use]
    pub fn label_edit_text(&self) -> Option<String> {
        self.state.label_edit().map(|e| e.text.clone())
    }

    /// Replace the inline label editor text.
    #[wasm_bindgen(js_name = setLabelEditText)]
    pub fn set_label_edit_text(&mut self, text: &str) -> bool {
        self.state.set_label_edit_text(text)
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.state.undo()
    }

    /// Copy the selection.
    pub fn copy(&mut self) -> bool {
        self.state.copy()
    }

    /// Paste at the last pointer position.
    pub fn paste(&mut self) -> bool {
        !self.state.paste().is_empty()
    }

    /// Run a declarative script. Returns the number of skipped lines.
    #[wasm_bindgen(js_name = applyScript)]
    pub fn apply_script(&mut self, source: &str) -> usize {
        self.state.apply_script(source).issues.len()
    }

    /// Replace the diagram with a persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error string if the document cannot be parsed.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: &str) -> Result<(), String> {
        self.state.load_json(json).map_err(|e| e.to_string())
    }

    /// Serialize the diagram as a persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, String> {
        self.state.to_json().map_err(|e| e.to_string())
    }

    /// Interaction overlay (highlights, selection, handles, marquee, pending
    /// connection, open label edit) as JSON. Pair with [`Self::to_json`] to draw a frame.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, String> {
        serde_json::to_string(&EditorView::of(&self.state)).map_err(|e| e.to_string())
    }

        /// Camera as `[x, y, zoom]`.
    #[must_use]
    pub fn camera(&self) -> Vec<f32> {
        let camera = self.state.camera();
        vec![camera.x, camera.y, camera.zoom]
    }

    /// Current pointer mode name.
    #[must_use]
    pub fn mode(&self) -> String {
        format!("{:?}", self.state.mode()).to_lowercase()
    }

    /// Clear the diagram, history and clipboard.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_editor_starts_idle_and_empty() {
        let editor = WasmEditor::new();
        assert_eq!(editor.mode(), "idle");
        assert_eq!(editor.camera(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn add_shape_rejects_unknown_kind() {
        let mut editor = WasmEditor::new();
        assert!(editor.add_shape("table").is_err());
        assert!(editor.add_shape("idr").is_ok());
    }

    #[test]
    fn load_json_rejects_invalid_document() {
        let mut editor = WasmEditor::new();
        assert!(editor.load_json("[]").is_err());
        assert!(editor.load_json(r#"{"shapes":[],"edges":[]}"#).is_ok());
    }

    #[test]
    fn view_json_exposes_selection() {
        let mut editor = WasmEditor::new();
        let id = editor.add_shape("entity").expect("known kind");
        let view: serde_json::Value =
            serde_json::from_str(&editor.view_json().expect("view")).expect("json");
        assert_eq!(view["highlighted"][0], id.as_str());
        assert_eq!(view["handles"]["width"], 120.0);
        assert!(view["labelEdit"].is_null());
    }

    #[test]
    fn unknown_dom_inputs_are_ignored() {
        let mut editor = WasmEditor::new();
        assert!(!editor.pointer_down(0.0, 0.0, 7, false));
        assert!(!editor.key("ArrowLeft", true, false, false, false));
    }
}
