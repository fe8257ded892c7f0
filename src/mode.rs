//! Mode selection across the clock, stopwatch and countdown.
//!
//! The [`ModeController`] owns one [`TimerStateMachine`] per timed mode and
//! forwards operations to whichever mode is active. Switching modes halts a
//! running timer and zeroes both timers; nothing carries over from one mode
//! to the next.

use crate::frame::FrameMsg;
use crate::machine::{Context, RunState, TimerStateMachine, Transition};
use crate::sink::Reading;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The view the widget is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Wall-clock time.
    #[default]
    Clock,
    /// Counts up from zero.
    Stopwatch,
    /// Counts down to zero from a configured target.
    Countdown,
}

impl TimerMode {
    /// All modes in display order.
    pub const ALL: [TimerMode; 3] = [TimerMode::Clock, TimerMode::Stopwatch, TimerMode::Countdown];

    /// The mode after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            TimerMode::Clock => TimerMode::Stopwatch,
            TimerMode::Stopwatch => TimerMode::Countdown,
            TimerMode::Countdown => TimerMode::Clock,
        }
    }

    /// The mode before this one, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            TimerMode::Clock => TimerMode::Countdown,
            TimerMode::Stopwatch => TimerMode::Clock,
            TimerMode::Countdown => TimerMode::Stopwatch,
        }
    }

    /// Human-readable tab label.
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Clock => "Clock",
            TimerMode::Stopwatch => "Stopwatch",
            TimerMode::Countdown => "Countdown",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TimerMode::Clock => "clock",
                TimerMode::Stopwatch => "stopwatch",
                TimerMode::Countdown => "countdown",
            }
        )
    }
}

/// Routes user operations to the timer behind the active mode.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: TimerMode,
    stopwatch: TimerStateMachine,
    countdown: TimerStateMachine,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(TimerMode::default())
    }
}

impl ModeController {
    /// Creates a controller showing `mode` with both timers idle at zero.
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            stopwatch: TimerStateMachine::stopwatch(),
            countdown: TimerStateMachine::countdown(),
        }
    }

    /// Active mode.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// The stopwatch timer.
    pub fn stopwatch(&self) -> &TimerStateMachine {
        &self.stopwatch
    }

    /// The countdown timer.
    pub fn countdown(&self) -> &TimerStateMachine {
        &self.countdown
    }

    /// The timer behind the active mode; `None` in clock mode.
    pub fn active(&self) -> Option<&TimerStateMachine> {
        match self.mode {
            TimerMode::Clock => None,
            TimerMode::Stopwatch => Some(&self.stopwatch),
            TimerMode::Countdown => Some(&self.countdown),
        }
    }

    fn active_mut(&mut self) -> Option<&mut TimerStateMachine> {
        match self.mode {
            TimerMode::Clock => None,
            TimerMode::Stopwatch => Some(&mut self.stopwatch),
            TimerMode::Countdown => Some(&mut self.countdown),
        }
    }

    /// Reading for the active mode. The clock always reads zero and idle.
    pub fn reading(&self) -> Reading {
        match self.active() {
            Some(timer) => timer.reading(),
            None => Reading {
                mode: TimerMode::Clock,
                value: Duration::ZERO,
                state: RunState::Idle,
            },
        }
    }

    /// Shows `next`, halting and zeroing both timers.
    ///
    /// Returns `false` without touching anything if `next` is already active.
    pub fn switch_mode(&mut self, next: TimerMode, cx: &mut Context<'_>) -> bool {
        if next == self.mode {
            return false;
        }

        self.stopwatch.discard(cx.clock);
        self.countdown.discard(cx.clock);
        tracing::debug!(from = %self.mode, to = %next, "mode switched");
        self.mode = next;

        cx.sink.render(self.reading());
        true
    }

    /// Starts the active timer.
    pub fn start(&mut self, cx: &mut Context<'_>) -> Transition {
        self.active_mut()
            .map_or(Transition::Unchanged, |timer| timer.start(cx))
    }

    /// Pauses the active timer.
    pub fn halt(&mut self, cx: &mut Context<'_>) -> Transition {
        self.active_mut()
            .map_or(Transition::Unchanged, |timer| timer.halt(cx))
    }

    /// Resets the active timer to its seed.
    pub fn reset(&mut self, cx: &mut Context<'_>) -> Transition {
        self.active_mut()
            .map_or(Transition::Unchanged, |timer| timer.reset(cx))
    }

    /// Starts a stopped or idle timer, halts a running one.
    pub fn toggle(&mut self, cx: &mut Context<'_>) -> Transition {
        match self.active() {
            Some(timer) if timer.is_running() => self.halt(cx),
            Some(_) => self.start(cx),
            None => Transition::Unchanged,
        }
    }

    /// Forwards a new countdown target. Only applies in countdown mode.
    pub fn set_countdown_seed(&mut self, seed: Duration, cx: &mut Context<'_>) -> Transition {
        if self.mode != TimerMode::Countdown {
            return Transition::Unchanged;
        }
        self.countdown.on_input_changed(seed, cx)
    }

    /// Delivers a frame to the timer that subscribed for it.
    pub fn on_frame(&mut self, frame: &FrameMsg, cx: &mut Context<'_>) -> Transition {
        let owner = frame.subscription.owner();
        if owner == self.stopwatch.id() {
            self.stopwatch.on_frame(frame, cx)
        } else if owner == self.countdown.id() {
            self.countdown.on_frame(frame, cx)
        } else {
            Transition::Unchanged
        }
    }
}
