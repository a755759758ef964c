//! Geometry primitives and the viewport transform.
//!
//! Two coordinate spaces exist:
//!
//! ```text
//! document space ──scale(zoom)──▶ ──translate(x, y)──▶ screen space
//! ```
//!
//! Shapes live in document space. Pointer events arrive in screen space and are
//! brought back through [`Camera::to_document`] before any hit-test or mutation.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;

/// A 2D point (or offset) in either coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate (grows downward).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale both coordinates.
    #[must_use]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Snap both coordinates to the grid.
    #[must_use]
    pub fn snapped(self, grid: f32) -> Self {
        Self::new(snap(self.x, grid), snap(self.y, grid))
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in document units.
    pub width: f32,
    /// Height in document units.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width (never negative).
    pub width: f32,
    /// Height (never negative).
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    /// Build a rectangle of the given size centered on a point.
    #[must_use]
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// The rectangle's center.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check whether a point lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Strict overlap test: rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x + self.width > other.x
            && self.x < other.x + other.width
            && self.y + self.height > other.y
            && self.y < other.y + other.height
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Round a coordinate to the nearest multiple of `grid`.
///
/// Halves round toward positive infinity, so `snap(-10.0, 20.0) == 0.0`.
#[must_use]
pub fn snap(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    let snapped = (value / grid + 0.5).floor() * grid;
    // Avoid handing out -0.0.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

/// Pan/zoom state of the viewport.
///
/// Screen = translate(x, y) ∘ scale(zoom) applied to document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal translation in screen pixels.
    pub x: f32,
    /// Vertical translation in screen pixels.
    pub y: f32,
    /// Scale factor (1.0 = 100%).
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Convert a screen-space point to document space.
    #[must_use]
    pub fn to_document(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }

    /// Convert a document-space point to screen space.
    #[must_use]
    pub fn to_screen(&self, doc: Point) -> Point {
        Point::new(doc.x * self.zoom + self.x, doc.y * self.zoom + self.y)
    }

    /// Translate the camera by a raw screen-space delta.
    pub fn pan_by(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Multiply the zoom by `factor`, keeping the document point under
    /// `screen_anchor` fixed on screen. The result is clamped to the config bounds.
    pub fn zoom_around(&mut self, screen_anchor: Point, factor: f32, config: &EditorConfig) {
        let anchor = self.to_document(screen_anchor);
        let old_zoom = self.zoom;
        let new_zoom = config.clamp_zoom(old_zoom * factor);
        self.x += anchor.x * (old_zoom - new_zoom);
        self.y += anchor.y * (old_zoom - new_zoom);
        self.zoom = new_zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_snap_rounds_to_grid() {
        assert!(approx(snap(9.0, 20.0), 0.0));
        assert!(approx(snap(10.0, 20.0), 20.0));
        assert!(approx(snap(29.9, 20.0), 20.0));
        assert!(approx(snap(-10.0, 20.0), 0.0));
        assert!(approx(snap(-11.0, 20.0), -20.0));
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn test_camera_round_trip() {
        let camera = Camera {
            x: 35.0,
            y: -12.0,
            zoom: 2.5,
        };
        let doc = Point::new(140.0, 60.0);
        let back = camera.to_document(camera.to_screen(doc));
        assert!(approx(back.x, doc.x) && approx(back.y, doc.y));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let config = EditorConfig::default();
        let mut camera = Camera {
            x: 20.0,
            y: 40.0,
            zoom: 1.0,
        };
        let anchor = Point::new(300.0, 200.0);
        let before = camera.to_document(anchor);
        camera.zoom_around(anchor, 1.1, &config);
        let after = camera.to_document(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
        assert!(approx(camera.zoom, 1.1));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let config = EditorConfig::default();
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.zoom_around(Point::new(10.0, 10.0), 1.1, &config);
        }
        assert!(approx(camera.zoom, 5.0));
        for _ in 0..200 {
            camera.zoom_around(Point::new(10.0, 10.0), 1.0 / 1.1, &config);
        }
        assert!(approx(camera.zoom, 0.2));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert!(approx(distance_to_segment(Point::new(50.0, 5.0), a, b), 5.0));
        assert!(approx(distance_to_segment(Point::new(-3.0, 4.0), a, b), 5.0));
        assert!(approx(distance_to_segment(Point::new(3.0, 4.0), a, a), 5.0));
    }
}
