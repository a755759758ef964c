//! # ERD Canvas Core
//!
//! Editing engine for entity-relationship diagrams.
//! Compiles to WASM so the same logic runs in the browser and in native tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               erd-core.wasm                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model     │  Interaction             │
//! │  - Shapes        │  - Pointer / key events  │
//! │  - Edges         │  - Drag, resize, pan     │
//! │  - JSON document │  - Marquee, connect      │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  Editing Services        │
//! │  - Camera        │  - Undo history          │
//! │  - Grid snapping │  - Clipboard             │
//! │  - Hit-testing   │  - Declarative syntax    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clipboard;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod scene;
pub mod selection;
pub mod shape;
pub mod state;
pub mod syntax;
pub mod view;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use clipboard::{Clipboard, ClipboardContent};
pub use config::EditorConfig;
pub use error::{DiagramError, DiagramResult};
pub use event::{EditorEvent, Key, KeyModifiers, PointerButton};
pub use geometry::{snap, Camera, Point, Rect, Size};
pub use history::History;
pub use scene::Scene;
pub use selection::{hit_test, marquee, Handle, HitTarget, Selection};
pub use shape::{
    Cardinality, Edge, EdgeId, EdgeSide, Glyph, Participation, Shape, ShapeId, ShapeKind,
};
pub use state::{EditorState, LabelEdit, LabelTarget, Mode};
pub use syntax::{load_script, ScriptIssue, ScriptReport, SyntaxError};
pub use view::{EditorView, LabelEditView};

/// ERD core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
