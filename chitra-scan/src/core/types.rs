//! Core data types shared by the homer, recovery handler and scan controller.
//!
//! - [`Position`]: logical (x, y) in motor-angle units
//! - [`Direction`]: scan direction along X
//! - [`BumperEvent`]: what a limit-switch recovery did
//! - [`SessionState`]: scan session lifecycle

use std::fmt;

/// Gantry axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// Scan direction along the X axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards the X end switch (positive motor angle)
    #[default]
    Forward,
    /// Towards the X start switch (negative motor angle)
    Backward,
}

impl Direction {
    /// Sign applied to speeds and angles (+1 / -1)
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// The opposite direction
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Apply the direction sign to a magnitude
    #[inline]
    pub fn apply(self, magnitude: i32) -> i32 {
        self.sign() * magnitude
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Logical gantry position in motor-angle units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Outcome of one limit-switch recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumperEvent {
    /// Axis whose switch fired
    pub axis: Axis,
    /// Direction in effect when the switch fired (X only)
    pub direction: Option<Direction>,
    /// Logical coordinate the axis was reset to
    pub reset_to: i64,
    /// Back-off moves issued before the switch released
    pub release_attempts: u32,
}

/// Scan session lifecycle
///
/// ```text
/// Idle -> Homing -> Ready -> Scanning -> Done
///            \                  \
///             +-> Aborted <------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not homed yet
    #[default]
    Idle,
    /// Homing in progress
    Homing,
    /// Homed, waiting for a scan to start
    Ready,
    /// Rows are being scanned
    Scanning,
    /// Row bound reached
    Done,
    /// Homing or scan failed; motors stopped
    Aborted,
}

impl SessionState {
    /// True while motion is owned by an automatic sequence
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Homing | SessionState::Scanning)
    }
}

/// Result of a scan request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scan rejected because the gantry was not homed
    NotReady,
    /// Every row up to the configured bound was scanned
    Completed {
        /// Rows emitted during this scan
        rows: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign_and_reverse() {
        assert_eq!(Direction::Forward.sign(), 1);
        assert_eq!(Direction::Backward.sign(), -1);
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.reversed().reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.apply(600), -600);
    }

    #[test]
    fn test_busy_states() {
        assert!(SessionState::Homing.is_busy());
        assert!(SessionState::Scanning.is_busy());
        assert!(!SessionState::Ready.is_busy());
        assert!(!SessionState::Aborted.is_busy());
    }
}
