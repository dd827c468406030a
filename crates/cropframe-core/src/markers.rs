//! Capacity-bounded point markers pinned to image content.
//!
//! Markers live in window coordinates. The list order encodes recency: the
//! most recently added or dragged marker is last, the front is the first
//! eviction candidate. Identity is positional; a marker is mutated in place
//! and never recreated by a drag.
//!
//! The set holds no reference to the transform. Whenever the transform
//! changes, the owner passes the before/after snapshots to
//! [`MarkerSet::remap_all`], which runs the same geometry as the image.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{remap_point, Point, TransformParams};

/// Default hit-test radius in window pixels.
pub const DEFAULT_MARKER_RADIUS: f64 = 8.0;

/// A user-placed point in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
}

impl Marker {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Ordered, capacity-bounded marker collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSet {
    capacity: usize,
    radius: f64,
    markers: VecDeque<Marker>,
}

impl MarkerSet {
    /// Create a set holding at most `capacity` markers. A capacity of 0 disables markers.
    pub fn new(capacity: usize, radius: f64) -> Self {
        Self {
            capacity,
            radius,
            markers: VecDeque::new(),
        }
    }

    /// A set on which every operation is a no-op.
    pub fn disabled() -> Self {
        Self::new(0, DEFAULT_MARKER_RADIUS)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Markers from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Append a marker at `(x, y)`, evicting the least recently used one when full.
    ///
    /// Returns the new marker's index (always the last), or `None` when disabled.
    pub fn add(&mut self, x: f64, y: f64) -> Option<usize> {
        if !self.is_enabled() {
            return None;
        }

        if self.markers.len() >= self.capacity {
            if let Some(evicted) = self.markers.pop_front() {
                debug!("Marker set full, evicting marker at ({}, {})", evicted.x, evicted.y);
            }
        }

        self.markers.push_back(Marker { x, y });
        Some(self.markers.len() - 1)
    }

    /// Find the marker whose footprint contains `(x, y)` and make it most recently used.
    ///
    /// When footprints overlap the most recently used marker wins, since it is
    /// drawn on top. Returns the marker's new index, ready for [`Self::drag_move`].
    pub fn hit_test(&mut self, x: f64, y: f64) -> Option<usize> {
        let target = Point::new(x, y);
        let index = self
            .markers
            .iter()
            .rposition(|m| m.position().distance(target) <= self.radius)?;

        let marker = self.markers.remove(index)?;
        self.markers.push_back(marker);
        Some(self.markers.len() - 1)
    }

    /// Translate the marker at `index`. No clamping: markers may leave the window.
    ///
    /// Returns `false` if there is no marker at `index`.
    pub fn drag_move(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        match self.markers.get_mut(index) {
            Some(marker) => {
                marker.x += dx;
                marker.y += dy;
                true
            }
            None => false,
        }
    }

    /// Keep every marker glued to the image across a transform change.
    ///
    /// The pivot is the image center under `from`: the window center plus
    /// the old pan.
    pub fn remap_all(&mut self, from: &TransformParams, to: &TransformParams, window_center: Point) {
        if from == to {
            return;
        }

        let pivot = Point::new(window_center.x + from.offset_x, window_center.y + from.offset_y);
        for marker in self.markers.iter_mut() {
            let p = remap_point(marker.position(), from, to, pivot);
            marker.x = p.x;
            marker.y = p.y;
        }
    }

    /// Drop every marker (new image loaded or explicit reset).
    pub fn remove_all(&mut self) {
        self.markers.clear();
    }

    /// Marker coordinates rounded to the nearest integer, in list order.
    pub fn export_points(&self) -> Vec<(i64, i64)> {
        self.markers
            .iter()
            .map(|m| (m.x.round() as i64, m.y.round() as i64))
            .collect()
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(capacity: usize, points: &[(f64, f64)]) -> MarkerSet {
        let mut set = MarkerSet::new(capacity, DEFAULT_MARKER_RADIUS);
        for &(x, y) in points {
            set.add(x, y);
        }
        set
    }

    #[test]
    fn test_add_below_capacity() {
        let mut set = MarkerSet::new(3, DEFAULT_MARKER_RADIUS);
        assert_eq!(set.add(1.0, 2.0), Some(0));
        assert_eq!(set.add(3.0, 4.0), Some(1));
        assert_eq!(set.len(), 2);
        assert_eq!(set.export_points(), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut set = MarkerSet::new(usize::MAX, DEFAULT_MARKER_RADIUS);
        assert!(set.is_enabled());
        assert_eq!(set.add(5.0, 6.0), Some(0));
        assert_eq!(set.add(50.0, 60.0), Some(1));
        assert_eq!(set.export_points(), vec![(5, 6), (50, 60)]);
    }

    #[test]
    fn test_add_at_capacity_evicts_oldest() {
        let mut set = set_with(2, &[(10.0, 10.0), (20.0, 20.0)]);
        assert_eq!(set.add(30.0, 30.0), Some(1));
        assert_eq!(set.len(), 2);
        assert_eq!(set.export_points(), vec![(20, 20), (30, 30)]);
    }

    #[test]
    fn test_disabled_set_is_noop() {
        let mut set = MarkerSet::disabled();
        assert!(!set.is_enabled());
        assert_eq!(set.add(1.0, 1.0), None);
        assert_eq!(set.hit_test(1.0, 1.0), None);
        assert!(!set.drag_move(0, 1.0, 1.0));
        assert!(set.is_empty());
        assert!(set.export_points().is_empty());
    }

    #[test]
    fn test_hit_test_moves_marker_to_end() {
        let mut set = set_with(3, &[(10.0, 10.0), (50.0, 50.0), (90.0, 90.0)]);
        assert_eq!(set.hit_test(12.0, 9.0), Some(2));
        assert_eq!(set.export_points(), vec![(50, 50), (90, 90), (10, 10)]);
    }

    #[test]
    fn test_hit_test_miss() {
        let mut set = set_with(3, &[(10.0, 10.0)]);
        assert_eq!(set.hit_test(30.0, 30.0), None);
        assert_eq!(set.export_points(), vec![(10, 10)]);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut set = set_with(3, &[(10.0, 10.0), (14.0, 10.0)]);
        assert_eq!(set.hit_test(12.0, 10.0), Some(1));
        // The second marker was already on top, so the order is unchanged
        assert_eq!(set.export_points(), vec![(10, 10), (14, 10)]);
    }

    #[test]
    fn test_dragged_marker_survives_eviction() {
        let mut set = set_with(2, &[(10.0, 10.0), (50.0, 50.0)]);
        let index = set.hit_test(10.0, 10.0).unwrap();
        assert!(set.drag_move(index, 5.0, -5.0));
        set.add(80.0, 80.0);
        assert_eq!(set.export_points(), vec![(15, 5), (80, 80)]);
    }

    #[test]
    fn test_drag_move_is_unclamped() {
        let mut set = set_with(1, &[(5.0, 5.0)]);
        assert!(set.drag_move(0, -100.0, -200.0));
        assert_eq!(set.export_points(), vec![(-95, -195)]);
        assert!(!set.drag_move(1, 1.0, 1.0));
    }

    #[test]
    fn test_remap_all_follows_scale() {
        let mut set = set_with(2, &[(160.0, 100.0)]);
        let from = TransformParams::default();
        let to = TransformParams {
            scale: 2.0,
            ..from
        };
        set.remap_all(&from, &to, Point::new(150.0, 100.0));
        assert_eq!(set.export_points(), vec![(170, 100)]);
    }

    #[test]
    fn test_remap_all_pivots_on_panned_center() {
        let mut set = set_with(2, &[(170.0, 100.0)]);
        let from = TransformParams {
            offset_x: 10.0,
            ..TransformParams::default()
        };
        let to = TransformParams {
            rotation: 0.5,
            ..from
        };
        // Image center is at (160, 100); the marker sits 10px to its right
        set.remap_all(&from, &to, Point::new(150.0, 100.0));
        let m = set.get(0).unwrap();
        assert!((m.x - 160.0).abs() < 1e-9);
        assert!((m.y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_all() {
        let mut set = set_with(3, &[(1.0, 1.0), (2.0, 2.0)]);
        set.remove_all();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 3);
    }

    #[test]
    fn test_export_points_rounding() {
        let set = set_with(3, &[(1.4, 1.6), (-2.4, 7.5)]);
        assert_eq!(set.export_points(), vec![(1, 2), (-2, 8)]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: adding past capacity keeps the size at capacity and drops the front.
        #[test]
        fn prop_capacity_evicts_least_recent(
            capacity in 1usize..=8,
            points in prop::collection::vec((-500i32..500, -500i32..500), 1..30),
        ) {
            let mut set = MarkerSet::new(capacity, 0.5);
            for &(x, y) in &points {
                let before = set.export_points();
                set.add(x as f64, y as f64);
                let after = set.export_points();

                if before.len() < capacity {
                    prop_assert_eq!(after.len(), before.len() + 1);
                    prop_assert_eq!(&after[..before.len()], &before[..]);
                } else {
                    prop_assert_eq!(after.len(), capacity);
                    prop_assert_eq!(&after[..capacity - 1], &before[1..]);
                }
                prop_assert_eq!(after.last().copied(), Some((x as i64, y as i64)));
            }
        }

        /// Property: grabbing a marker never changes the size, only the order.
        #[test]
        fn prop_hit_test_preserves_len(
            points in prop::collection::vec((-500i32..500, -500i32..500), 1..8),
            pick in 0usize..8,
        ) {
            let mut set = MarkerSet::new(8, 0.5);
            for &(x, y) in &points {
                set.add(x as f64 * 10.0, y as f64 * 10.0);
            }
            let pick = pick % set.len();
            let target = *set.get(pick).unwrap();
            let len = set.len();

            let index = set.hit_test(target.x, target.y);
            prop_assert_eq!(set.len(), len);
            prop_assert_eq!(index, Some(len - 1));
            prop_assert_eq!(set.get(len - 1).copied(), Some(target));
        }
    }
}
