//! Diagram nodes and the edges between them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect, Size};

/// Unique identifier for a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(Uuid);

impl ShapeId {
    /// Create a new unique shape ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a shape ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an edge. Runtime only; edges are persisted without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(Uuid);

impl EdgeId {
    /// Create a new unique edge ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a shape represents. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Strong entity (single rectangle).
    Entity,
    /// Weak entity (double rectangle).
    WeakEntity,
    /// Relationship (diamond).
    Relationship,
    /// Identifying relationship (double diamond).
    IdentifyingRelationship,
    /// Attribute (ellipse).
    Attribute,
    /// Free-form ellipse node.
    Circle,
}

/// How a shape kind is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Axis-aligned rectangle, optionally with an inset second outline.
    Rectangle {
        /// Draw the inset outline.
        double: bool,
    },
    /// Diamond touching the midpoints of the bounding box, optionally doubled.
    Diamond {
        /// Draw the inset outline.
        double: bool,
    },
    /// Ellipse inscribed in the bounding box.
    Ellipse,
}

/// Inset of the inner outline for doubled glyphs.
pub const DOUBLE_INSET: f32 = 5.0;

impl ShapeKind {
    /// All kinds, in toolbar order.
    pub const ALL: [Self; 6] = [
        Self::Entity,
        Self::WeakEntity,
        Self::Relationship,
        Self::IdentifyingRelationship,
        Self::Attribute,
        Self::Circle,
    ];

    /// Short name, also the declarative syntax keyword.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::WeakEntity => "weak_entity",
            Self::Relationship => "relationship",
            Self::IdentifyingRelationship => "idr",
            Self::Attribute => "attribute",
            Self::Circle => "circle",
        }
    }

    /// Look a kind up by its short name.
    #[must_use]
    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.short_name() == name)
    }

    /// Label given to a freshly created shape.
    #[must_use]
    pub fn default_label(self) -> String {
        self.short_name().to_uppercase()
    }

    /// Size given to a freshly created shape.
    #[must_use]
    pub const fn default_size(self) -> Size {
        match self {
            Self::Circle => Size::new(40.0, 40.0),
            _ => Size::new(120.0, 60.0),
        }
    }

    /// Drawing strategy for this kind.
    #[must_use]
    pub const fn glyph(self) -> Glyph {
        match self {
            Self::Entity => Glyph::Rectangle { double: false },
            Self::WeakEntity => Glyph::Rectangle { double: true },
            Self::Relationship => Glyph::Diamond { double: false },
            Self::IdentifyingRelationship => Glyph::Diamond { double: true },
            Self::Attribute | Self::Circle => Glyph::Ellipse,
        }
    }

    /// Entity or weak entity.
    #[must_use]
    pub const fn is_entity_family(self) -> bool {
        matches!(self, Self::Entity | Self::WeakEntity)
    }

    /// Relationship or identifying relationship.
    #[must_use]
    pub const fn is_relationship_family(self) -> bool {
        matches!(self, Self::Relationship | Self::IdentifyingRelationship)
    }
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier.
    pub id: ShapeId,
    /// Node kind.
    pub kind: ShapeKind,
    /// Top-left corner in document space.
    pub position: Point,
    /// Width and height.
    pub size: Size,
    /// User-editable text.
    pub label: String,
    /// Part of the active selection or the pending end of a connection.
    #[serde(skip)]
    pub highlighted: bool,
}

impl Shape {
    /// Create a new shape with the kind's default size and label at the origin.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            position: Point::default(),
            size: kind.default_size(),
            label: kind.default_label(),
            highlighted: false,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Axis-aligned bounding box in document space.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Check if a document-space point is within this shape's bounding box.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }
}

/// Cardinality written next to an edge end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one.
    #[serde(rename = "1")]
    One,
    /// Many (N side).
    #[serde(rename = "N")]
    N,
    /// Many (M side).
    #[serde(rename = "M")]
    M,
    /// No cardinality.
    #[default]
    #[serde(rename = "")]
    Empty,
}

impl Cardinality {
    /// Normalize inline-edited text: trimmed and upper-cased, anything outside
    /// `1`, `N`, `M` is empty.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.trim().to_uppercase().as_str() {
            "1" => Self::One,
            "N" => Self::N,
            "M" => Self::M,
            _ => Self::Empty,
        }
    }

    /// Match a script token exactly against `1`, `N`, `M`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" => Some(Self::One),
            "N" => Some(Self::N),
            "M" => Some(Self::M),
            _ => None,
        }
    }

    /// Display text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::N => "N",
            Self::M => "M",
            Self::Empty => "",
        }
    }
}

/// Whether every instance takes part in the relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participation {
    /// Every instance participates; the line is drawn doubled.
    Total,
    /// Some instances participate.
    #[default]
    Partial,
}

impl Participation {
    /// Parse a participation token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "total" => Some(Self::Total),
            "partial" => Some(Self::Partial),
            _ => None,
        }
    }

    /// The other value.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Total => Self::Partial,
            Self::Partial => Self::Total,
        }
    }
}

/// One end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSide {
    /// The source end.
    From,
    /// The target end.
    To,
}

/// A directed connection between two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Runtime identifier.
    #[serde(skip)]
    pub id: EdgeId,
    /// Source shape.
    pub from_id: ShapeId,
    /// Target shape.
    pub to_id: ShapeId,
    /// Cardinality at the source end.
    #[serde(default)]
    pub from_label: Cardinality,
    /// Cardinality at the target end.
    #[serde(default)]
    pub to_label: Cardinality,
    /// Participation; total doubles the line.
    #[serde(default)]
    pub participation: Participation,
}

impl Edge {
    /// Create an edge with empty cardinalities and partial participation.
    #[must_use]
    pub fn new(from_id: ShapeId, to_id: ShapeId) -> Self {
        Self {
            id: EdgeId::new(),
            from_id,
            to_id,
            from_label: Cardinality::Empty,
            to_label: Cardinality::Empty,
            participation: Participation::Partial,
        }
    }

    /// Set both cardinalities.
    #[must_use]
    pub fn with_labels(mut self, from_label: Cardinality, to_label: Cardinality) -> Self {
        self.from_label = from_label;
        self.to_label = to_label;
        self
    }

    /// Set participation.
    #[must_use]
    pub fn with_participation(mut self, participation: Participation) -> Self {
        self.participation = participation;
        self
    }

    /// Whether this edge touches `id` at either end.
    #[must_use]
    pub fn references(&self, id: ShapeId) -> bool {
        self.from_id == id || self.to_id == id
    }

    /// Whether this edge joins `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: ShapeId, b: ShapeId) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    /// Cardinality at one end.
    #[must_use]
    pub const fn label(&self, side: EdgeSide) -> Cardinality {
        match side {
            EdgeSide::From => self.from_label,
            EdgeSide::To => self.to_label,
        }
    }

    /// Replace the cardinality at one end.
    pub fn set_label(&mut self, side: EdgeSide, value: Cardinality) {
        match side {
            EdgeSide::From => self.from_label = value,
            EdgeSide::To => self.to_label = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        let entity = Shape::new(ShapeKind::Entity);
        assert_eq!(entity.label, "ENTITY");
        assert_eq!(entity.size, Size::new(120.0, 60.0));

        let circle = Shape::new(ShapeKind::Circle);
        assert_eq!(circle.size, Size::new(40.0, 40.0));

        assert_eq!(
            Shape::new(ShapeKind::IdentifyingRelationship).label,
            "IDR"
        );
    }

    #[test]
    fn test_glyph_is_total() {
        for kind in ShapeKind::ALL {
            let glyph = kind.glyph();
            let doubled = matches!(
                glyph,
                Glyph::Rectangle { double: true } | Glyph::Diamond { double: true }
            );
            assert_eq!(
                doubled,
                matches!(
                    kind,
                    ShapeKind::WeakEntity | ShapeKind::IdentifyingRelationship
                )
            );
        }
    }

    #[test]
    fn test_short_name_round_trip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_short_name(kind.short_name()), Some(kind));
        }
        assert_eq!(ShapeKind::from_short_name("table"), None);
    }

    #[test]
    fn test_cardinality_parse() {
        assert_eq!(Cardinality::parse("1"), Cardinality::One);
        assert_eq!(Cardinality::parse(" n "), Cardinality::N);
        assert_eq!(Cardinality::parse("M"), Cardinality::M);
        assert_eq!(Cardinality::parse("many"), Cardinality::Empty);
        assert_eq!(Cardinality::parse(""), Cardinality::Empty);
        assert_eq!(Cardinality::from_token("N"), Some(Cardinality::N));
        assert_eq!(Cardinality::from_token("n"), None);
        assert_eq!(Cardinality::from_token(" 1"), None);
    }

    #[test]
    fn test_edge_serializes_without_id() {
        let a = ShapeId::new();
        let b = ShapeId::new();
        let edge = Edge::new(a, b).with_labels(Cardinality::One, Cardinality::N);
        let json = serde_json::to_value(&edge).expect("serialize");
        assert_eq!(json["fromLabel"], "1");
        assert_eq!(json["toLabel"], "N");
        assert_eq!(json["participation"], "partial");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_highlight_not_persisted() {
        let mut shape = Shape::new(ShapeKind::Entity);
        shape.highlighted = true;
        let json = serde_json::to_string(&shape).expect("serialize");
        assert!(!json.contains("highlighted"));
        let back: Shape = serde_json::from_str(&json).expect("deserialize");
        assert!(!back.highlighted);
    }

    #[test]
    fn test_connects_is_unordered() {
        let a = ShapeId::new();
        let b = ShapeId::new();
        let edge = Edge::new(a, b);
        assert!(edge.connects(a, b));
        assert!(edge.connects(b, a));
        assert!(!edge.connects(a, ShapeId::new()));
    }
}
