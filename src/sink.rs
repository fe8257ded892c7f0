//! Read interface between the timer core and whatever displays it.
//!
//! The core never formats anything. After every state change it pushes a
//! [`Reading`] into a [`Sink`]; when a countdown runs out it additionally
//! calls [`Sink::countdown_complete`]. Display layers implement the trait,
//! and [`RecordingSink`] keeps everything for headless hosts and tests.

use crate::machine::RunState;
use crate::mode::TimerMode;
use std::time::Duration;

/// Snapshot of the active mode handed to the sink after each state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Mode the reading belongs to.
    pub mode: TimerMode,
    /// Elapsed time (stopwatch) or remaining time (countdown). Always zero
    /// for the clock.
    pub value: Duration,
    /// Run state of the timer behind the reading.
    pub state: RunState,
}

impl Reading {
    /// The value as whole milliseconds.
    pub fn millis(&self) -> u64 {
        u64::try_from(self.value.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Receives renders and completion notices from the timer core.
pub trait Sink {
    /// Called after every state change of the active mode.
    fn render(&mut self, reading: Reading);

    /// Called once per countdown run that ends by reaching zero.
    fn countdown_complete(&mut self);
}

/// Sink that stores every call it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Every reading, oldest first.
    pub readings: Vec<Reading>,
    /// Number of completion notices received.
    pub completions: usize,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent reading, if any.
    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }
}

impl Sink for RecordingSink {
    fn render(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    fn countdown_complete(&mut self) {
        self.completions += 1;
    }
}
