//! Logical position tracker
//!
//! There is no absolute position sensor on the gantry. The logical position
//! is rebuilt from relative motion and limit-switch events, and only the
//! homer, the recovery handler and the scan controller write it.

use crate::core::types::Position;

/// Logical (x, y) in motor-angle units
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    position: Position,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_x(&mut self, x: i64) {
        self.position.x = x;
    }

    #[inline]
    pub fn set_y(&mut self, y: i64) {
        self.position.y = y;
    }

    #[inline]
    pub fn get(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn x(&self) -> i64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> i64 {
        self.position.y
    }
}
