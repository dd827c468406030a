//! Click-versus-drag classification for pointer gestures.
//!
//! A pointer-down starts a candidate gesture. Every move accumulates the
//! Euclidean travel since the previous event. On pointer-up the gesture is a
//! click when it travelled less than [`CLICK_MAX_TRAVEL`] window pixels and
//! lasted less than [`CLICK_MAX_DURATION_MS`]; otherwise it is a drag.
//!
//! Timestamps are supplied by the host (e.g. `event.timeStamp`), which keeps
//! the classification deterministic and testable.

use crate::geometry::Point;

/// Maximum accumulated travel, in window pixels, for a click.
pub const CLICK_MAX_TRAVEL: f64 = 4.0;

/// Maximum elapsed time, in milliseconds, for a click.
pub const CLICK_MAX_DURATION_MS: f64 = 500.0;

/// Outcome of a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Click,
    Drag,
}

/// Classify a finished gesture from its travel and duration.
pub fn classify(travel: f64, elapsed_ms: f64) -> GestureKind {
    if travel < CLICK_MAX_TRAVEL && elapsed_ms < CLICK_MAX_DURATION_MS {
        GestureKind::Click
    } else {
        GestureKind::Drag
    }
}

/// Tracks one pointer gesture from down to up.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTracker {
    start_time_ms: f64,
    last: Point,
    travel: f64,
}

impl GestureTracker {
    /// Start tracking at the pointer-down position.
    pub fn begin(x: f64, y: f64, time_ms: f64) -> Self {
        Self {
            start_time_ms: time_ms,
            last: Point::new(x, y),
            travel: 0.0,
        }
    }

    /// Record a move and return the delta since the previous event.
    pub fn move_to(&mut self, x: f64, y: f64) -> (f64, f64) {
        let next = Point::new(x, y);
        let delta = (next.x - self.last.x, next.y - self.last.y);
        self.travel += self.last.distance(next);
        self.last = next;
        delta
    }

    /// Total distance travelled so far.
    pub fn travel(&self) -> f64 {
        self.travel
    }

    /// Finish the gesture at the pointer-up position.
    pub fn finish(mut self, x: f64, y: f64, time_ms: f64) -> GestureKind {
        self.move_to(x, y);
        classify(self.travel, time_ms - self.start_time_ms)
    }
}
