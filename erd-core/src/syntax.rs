//! Declarative diagram syntax.
//!
//! One statement per line, whitespace-separated tokens; blank lines and lines
//! starting with `#` are ignored:
//!
//! ```text
//! entity STUDENT (100, 100)
//! weak_entity DEPENDENT (100, 300)
//! relationship ENROLLS (300, 100)
//! idr HAS (300, 300)
//! circle NOTE (500, 500)
//! attribute NAME of STUDENT
//! connect STUDENT ENROLLS 1 N total
//! ```
//!
//! Names resolve against shape labels, first match wins. A bad line is skipped
//! and reported; it never aborts the load.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::geometry::Point;
use crate::scene::Scene;
use crate::shape::{Cardinality, Edge, Participation, Shape, ShapeKind};

/// Position used when a shape statement has no `(x, y)`.
pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);

/// Horizontal distance between an attribute and its owner.
pub const ATTRIBUTE_OFFSET: f32 = 100.0;

static POSITION: LazyLock<Regex> = LazyLock::new(|| {
    // The pattern is a literal; it cannot fail to compile.
    Regex::new(r"\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)").expect("valid position pattern")
});

/// Why a script line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The first token is not a known statement.
    #[error("Unknown statement: {0}")]
    UnknownStatement(String),

    /// A statement is missing its name argument.
    #[error("Missing name after '{0}'")]
    MissingName(String),

    /// An `attribute` line without `of <owner>`.
    #[error("Expected 'attribute <name> of <owner>'")]
    MissingOwner,

    /// A referenced name matches no shape label.
    #[error("No shape labelled '{0}'")]
    UnknownShape(String),
}

/// A skipped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptIssue {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub error: SyntaxError,
}

/// Outcome of loading a script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Shapes appended to the scene.
    pub shapes_created: usize,
    /// Edges appended to the scene.
    pub edges_created: usize,
    /// Lines that were skipped.
    pub issues: Vec<ScriptIssue>,
}

impl ScriptReport {
    /// Whether every statement applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Extract the first `(<int>, <int>)` anywhere in a line.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn parse_position(line: &str) -> Option<Point> {
    let captures = POSITION.captures(line)?;
    let x: i64 = captures.get(1)?.as_str().parse().ok()?;
    let y: i64 = captures.get(2)?.as_str().parse().ok()?;
    Some(Point::new(x as f32, y as f32))
}

/// Apply every statement of `source` to the scene.
///
/// Shapes created here keep their literal coordinates (no grid snapping) and
/// `connect` does not suppress duplicate edges.
pub fn load_script(scene: &mut Scene, source: &str) -> ScriptReport {
    let mut report = ScriptReport::default();

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match apply_statement(scene, line, &mut report) {
            Ok(()) => {}
            Err(error) => {
                tracing::warn!("Script line {} skipped: {error}", index + 1);
                report.issues.push(ScriptIssue {
                    line: index + 1,
                    error,
                });
            }
        }
    }

    tracing::debug!(
        "Script loaded: {} shapes, {} edges, {} skipped lines",
        report.shapes_created,
        report.edges_created,
        report.issues.len()
    );
    report
}

fn apply_statement(
    scene: &mut Scene,
    line: &str,
    report: &mut ScriptReport,
) -> Result<(), SyntaxError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let keyword = tokens[0];

    match keyword {
        "attribute" => {
            let name = name_token(&tokens, keyword)?;
            let owner_name = match (tokens.get(2), tokens.get(3)) {
                (Some(&"of"), Some(owner)) => *owner,
                _ => return Err(SyntaxError::MissingOwner),
            };
            let owner = scene
                .find_by_label(owner_name)
                .ok_or_else(|| SyntaxError::UnknownShape(owner_name.to_string()))?;
            let position = Point::new(owner.position.x - ATTRIBUTE_OFFSET, owner.position.y);
            let owner_id = owner.id;

            let attribute = scene.insert_shape(
                Shape::new(ShapeKind::Attribute)
                    .with_position(position)
                    .with_label(name),
            );
            scene.insert_edge(Edge::new(attribute, owner_id));
            report.shapes_created += 1;
            report.edges_created += 1;
        }
        "connect" => {
            let from_name = name_token(&tokens, keyword)?;
            let to_name = tokens
                .get(2)
                .copied()
                .ok_or_else(|| SyntaxError::MissingName(keyword.to_string()))?;
            let from = resolve(scene, from_name)?;
            let to = resolve(scene, to_name)?;

            let from_label = tokens
                .get(3)
                .and_then(|t| Cardinality::from_token(t))
                .unwrap_or_default();
            let to_label = tokens
                .get(4)
                .and_then(|t| Cardinality::from_token(t))
                .unwrap_or_default();
            let participation = tokens
                .get(5)
                .and_then(|t| Participation::parse(t))
                .unwrap_or_default();

            scene.add_edge(from, to, from_label, to_label, participation);
            report.edges_created += 1;
        }
        other => {
            let kind = ShapeKind::from_short_name(other)
                .filter(|k| *k != ShapeKind::Attribute)
                .ok_or_else(|| SyntaxError::UnknownStatement(other.to_string()))?;
            let name = name_token(&tokens, keyword)?;
            let position = parse_position(line).unwrap_or(DEFAULT_POSITION);

            scene.insert_shape(Shape::new(kind).with_position(position).with_label(name));
            report.shapes_created += 1;
        }
    }
    Ok(())
}

fn name_token<'a>(tokens: &[&'a str], keyword: &str) -> Result<&'a str, SyntaxError> {
    tokens
        .get(1)
        .copied()
        .filter(|t| !t.starts_with('('))
        .ok_or_else(|| SyntaxError::MissingName(keyword.to_string()))
}

fn resolve(scene: &Scene, name: &str) -> Result<crate::shape::ShapeId, SyntaxError> {
    scene
        .find_by_label(name)
        .map(|s| s.id)
        .ok_or_else(|| SyntaxError::UnknownShape(name.to_string()))
}
