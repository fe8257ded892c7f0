//! Elapsed/remaining time bookkeeping shared by the stopwatch and countdown.
//!
//! A [`TickAccumulator`] is a plain value holder: it knows nothing about
//! frames, clocks or rendering. Each frame the owning state machine hands it
//! the measured delta and reads back the new value.
//!
//! ```rust
//! use bubbletea_chrono::accumulator::{Direction, TickAccumulator};
//! use std::time::Duration;
//!
//! let mut countdown = TickAccumulator::new(Direction::Down);
//! countdown.reset(Duration::from_millis(100));
//! countdown.advance(Duration::from_millis(250));
//! assert_eq!(countdown.value(), Duration::ZERO);
//! assert!(countdown.is_exhausted());
//! ```

use std::time::Duration;

/// Which way an accumulator moves when it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Counts up without bound (stopwatch).
    Up,
    /// Counts down and stops at zero (countdown).
    Down,
}

/// Holds an elapsed or remaining duration and advances it by frame deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickAccumulator {
    direction: Direction,
    value: Duration,
    seed: Duration,
}

impl TickAccumulator {
    /// Creates an accumulator at zero.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            value: Duration::ZERO,
            seed: Duration::ZERO,
        }
    }

    /// Applies one frame delta and returns the new value.
    ///
    /// Counting up saturates at `Duration::MAX`; counting down clamps at zero.
    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.value = match self.direction {
            Direction::Up => self.value.saturating_add(delta),
            Direction::Down => self.value.saturating_sub(delta),
        };
        self.value
    }

    /// Sets the value to `seed` and remembers it for later resets.
    pub fn reset(&mut self, seed: Duration) {
        self.seed = seed;
        self.value = seed;
    }

    /// Returns the value to the last seed.
    pub fn rewind(&mut self) {
        self.value = self.seed;
    }

    /// True once a count-down accumulator has reached zero.
    pub fn is_exhausted(&self) -> bool {
        self.direction == Direction::Down && self.value.is_zero()
    }

    /// Current elapsed (up) or remaining (down) time.
    pub fn value(&self) -> Duration {
        self.value
    }

    /// The value the accumulator was last reset to.
    pub fn seed(&self) -> Duration {
        self.seed
    }

    /// Direction this accumulator advances in.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether any time has been applied since the last reset.
    pub fn is_pristine(&self) -> bool {
        self.value == self.seed
    }
}
