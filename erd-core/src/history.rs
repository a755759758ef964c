//! # Undo History
//!
//! Bounded stack of whole-scene snapshots.
//!
//! ```text
//! snapshot() ──▶ push_back        (oldest dropped when full)
//! undo()     ◀── pop_back         (most recent first)
//! ```
//!
//! The history never snapshots by itself: callers push the pre-mutation scene
//! right before each undoable change. There is no redo.

use std::collections::VecDeque;

use crate::scene::Scene;

/// Default number of snapshots kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded undo stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Scene>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a history with a custom capacity (at least one entry).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Deep-copy the scene onto the stack.
    pub fn snapshot(&mut self, scene: &Scene) {
        self.push(scene.clone());
    }

    /// Push an already captured snapshot.
    pub fn push(&mut self, snapshot: Scene) {
        // Drop oldest if at capacity
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
        tracing::trace!("History snapshot ({}/{})", self.entries.len(), self.capacity);
    }

    /// Replace `scene` with the most recent snapshot.
    ///
    /// Returns `false` (and leaves the scene alone) when the history is empty.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        match self.entries.pop_back() {
            Some(previous) => {
                *scene = previous;
                tracing::debug!("Undo applied, {} snapshots left", self.entries.len());
                true
            }
            None => false,
        }
    }

    /// Get the number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nothing to undo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of snapshots kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget all snapshots.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::shape::ShapeKind;

    fn scene_with(n: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..n {
            scene.add_shape(
                ShapeKind::Entity,
                Point::default(),
                Size::new(120.0, 60.0),
                format!("E{i}"),
            );
        }
        scene
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 50);
    }

    #[test]
    fn test_undo_restores_latest_first() {
        let mut history = History::new();
        let mut scene = scene_with(0);
        history.snapshot(&scene);
        scene = scene_with(1);
        history.snapshot(&scene);
        scene = scene_with(2);

        assert!(history.undo(&mut scene));
        assert_eq!(scene.shape_count(), 1);
        assert!(history.undo(&mut scene));
        assert_eq!(scene.shape_count(), 0);
        assert!(!history.undo(&mut scene));
        assert_eq!(scene.shape_count(), 0);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(3);
        for n in 0..5 {
            history.snapshot(&scene_with(n));
        }
        assert_eq!(history.len(), 3);

        // Remaining snapshots are 2, 3, 4 (oldest dropped)
        let mut scene = Scene::new();
        for expected in [4, 3, 2] {
            assert!(history.undo(&mut scene));
            assert_eq!(scene.shape_count(), expected);
        }
        assert!(history.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut history = History::with_capacity(0);
        history.snapshot(&scene_with(1));
        history.snapshot(&scene_with(2));
        assert_eq!(history.len(), 1);
    }
}
