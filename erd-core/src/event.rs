//! Input events for diagram interaction.
//!
//! All coordinates are in screen space, as delivered by the host surface.

use serde::{Deserialize, Serialize};

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    /// Left button.
    Primary,
    /// Wheel button.
    Middle,
    /// Right button (starts/finishes a connection).
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[serde(default)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Shift held: selection gestures add to the existing selection.
    #[must_use]
    pub const fn additive(self) -> bool {
        self.shift
    }

    /// Ctrl or Cmd held: letter keys act as accelerators.
    #[must_use]
    pub const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "char", rename_all = "lowercase")]
pub enum Key {
    /// Delete (or Backspace) key.
    Delete,
    /// Escape key.
    Escape,
    /// Enter key.
    Enter,
    /// Space bar (held to pan with the primary button).
    Space,
    /// Any printable character.
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "Delete" | "Backspace" => Some(Self::Delete),
            "Escape" => Some(Self::Escape),
            "Enter" => Some(Self::Enter),
            " " => Some(Self::Space),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A button went down.
    PointerDown {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Which button.
        button: PointerButton,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },

    /// The pointer moved.
    PointerMove {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// A button was released.
    PointerUp {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Double click with the primary button.
    DoubleClick {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Scroll wheel; negative `delta` zooms in.
    Wheel {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Vertical scroll amount.
        delta: f32,
    },

    /// A key was pressed or released.
    Key {
        /// The key.
        key: Key,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },
}

impl EditorEvent {
    /// Create a pointer down event without modifiers.
    #[must_use]
    pub fn pointer_down(x: f32, y: f32, button: PointerButton) -> Self {
        Self::PointerDown {
            x,
            y,
            button,
            modifiers: KeyModifiers::default(),
        }
    }

    /// Create a key press event.
    #[must_use]
    pub fn key_press(key: Key, modifiers: KeyModifiers) -> Self {
        Self::Key {
            key,
            pressed: true,
            modifiers,
        }
    }
}
