//! Stopwatch and countdown state machine.
//!
//! A [`TimerStateMachine`] wires a [`TickAccumulator`] to a [`FrameClock`].
//! While running it holds exactly one frame subscription; every frame it
//! measures the gap since the previous one, advances the accumulator and asks
//! for the next frame. Because the delta is measured rather than assumed, a
//! host that throttles or drops frames only produces a larger next delta and
//! the reading stays accurate.
//!
//! ```text
//! Idle ──start──▶ Running ──halt──▶ Stopped ──start──▶ Running ...
//!   ▲                │ (countdown hits zero)  │
//!   └──────reset─────┴────────────▶ Stopped ──┘
//! ```
//!
//! Operations never fail. Anything that does not make sense in the current
//! state is a no-op reported as [`Transition::Unchanged`].
//!
//! # Example
//!
//! ```rust
//! use bubbletea_chrono::frame::ManualFrameClock;
//! use bubbletea_chrono::machine::{Context, RunState, TimerStateMachine};
//! use bubbletea_chrono::sink::RecordingSink;
//! use std::time::Duration;
//!
//! let mut clock = ManualFrameClock::new();
//! let mut sink = RecordingSink::new();
//! let mut stopwatch = TimerStateMachine::stopwatch();
//!
//! stopwatch.start(&mut Context::new(&mut clock, &mut sink));
//! for frame in clock.fire(Duration::from_millis(16)) {
//!     stopwatch.on_frame(&frame, &mut Context::new(&mut clock, &mut sink));
//! }
//! assert_eq!(stopwatch.value(), Duration::from_millis(16));
//! assert_eq!(stopwatch.state(), RunState::Running);
//! ```

use crate::accumulator::{Direction, TickAccumulator};
use crate::frame::{FrameClock, FrameMsg, FrameSubscription};
use crate::mode::TimerMode;
use crate::sink::{Reading, Sink};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Owner ids tag frame subscriptions so frames reach the machine that asked.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Whether a timer is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Never started since the last reset.
    Idle,
    /// Counting; a frame subscription is outstanding.
    Running,
    /// Paused by the user or finished by running out.
    Stopped,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RunState::Idle => "idle",
                RunState::Running => "running",
                RunState::Stopped => "stopped",
            }
        )
    }
}

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle/Stopped to Running.
    Started,
    /// Running to Stopped by request.
    Halted,
    /// Back to Idle at the seed value.
    Reset,
    /// Countdown target replaced.
    Reseeded,
    /// A frame advanced the value and the next frame was requested.
    Ticked,
    /// A countdown frame reached zero.
    Completed,
    /// The operation did not apply in the current state.
    Unchanged,
}

/// Per-call access to the host services a machine needs.
///
/// The host builds one of these around its frame clock and sink whenever it
/// forwards an operation, so no machine keeps a reference to either.
pub struct Context<'a> {
    /// Clock used for timestamps and frame subscriptions.
    pub clock: &'a mut dyn FrameClock,
    /// Receiver for renders and completion notices.
    pub sink: &'a mut dyn Sink,
}

impl<'a> Context<'a> {
    /// Bundles a clock and a sink.
    pub fn new(clock: &'a mut dyn FrameClock, sink: &'a mut dyn Sink) -> Self {
        Self { clock, sink }
    }
}

/// Controller for one stopwatch or countdown.
#[derive(Debug, Clone)]
pub struct TimerStateMachine {
    id: i64,
    mode: TimerMode,
    accumulator: TickAccumulator,
    state: RunState,
    baseline: Duration,
    subscription: Option<FrameSubscription>,
}

impl TimerStateMachine {
    /// A count-up timer starting at zero.
    pub fn stopwatch() -> Self {
        Self::with_direction(TimerMode::Stopwatch, Direction::Up)
    }

    /// A count-down timer with no target yet.
    pub fn countdown() -> Self {
        Self::with_direction(TimerMode::Countdown, Direction::Down)
    }

    fn with_direction(mode: TimerMode, direction: Direction) -> Self {
        Self {
            id: next_id(),
            mode,
            accumulator: TickAccumulator::new(direction),
            state: RunState::Idle,
            baseline: Duration::ZERO,
            subscription: None,
        }
    }

    /// Identifier used as the owner of this machine's frame subscriptions.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Stopwatch or countdown.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether a frame subscription is outstanding.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Elapsed (stopwatch) or remaining (countdown) time.
    pub fn value(&self) -> Duration {
        self.accumulator.value()
    }

    /// The underlying accumulator.
    pub fn accumulator(&self) -> &TickAccumulator {
        &self.accumulator
    }

    /// The outstanding frame request, present exactly while running.
    pub fn subscription(&self) -> Option<FrameSubscription> {
        self.subscription
    }

    /// Current value and state as a sink reading.
    pub fn reading(&self) -> Reading {
        Reading {
            mode: self.mode,
            value: self.value(),
            state: self.state,
        }
    }

    /// Begins counting from the clock's current time.
    ///
    /// Does nothing while already running, or for a countdown that has
    /// nothing left.
    pub fn start(&mut self, cx: &mut Context<'_>) -> Transition {
        if self.is_running() {
            tracing::debug!(timer = self.id, "start ignored: already running");
            return Transition::Unchanged;
        }
        if self.accumulator.is_exhausted() {
            tracing::debug!(timer = self.id, "start ignored: countdown exhausted");
            return Transition::Unchanged;
        }

        self.baseline = cx.clock.now();
        self.state = RunState::Running;
        self.release(cx.clock);
        self.subscription = Some(cx.clock.subscribe(self.id));

        tracing::debug!(timer = self.id, mode = %self.mode, value_ms = self.reading().millis(), "timer started");
        cx.sink.render(self.reading());
        Transition::Started
    }

    /// Pauses a running timer. Does nothing otherwise.
    pub fn halt(&mut self, cx: &mut Context<'_>) -> Transition {
        if !self.is_running() {
            return Transition::Unchanged;
        }

        self.release(cx.clock);
        self.state = RunState::Stopped;

        tracing::debug!(timer = self.id, mode = %self.mode, value_ms = self.reading().millis(), "timer halted");
        cx.sink.render(self.reading());
        Transition::Halted
    }

    /// Returns to Idle at the seed value, halting first if needed.
    pub fn reset(&mut self, cx: &mut Context<'_>) -> Transition {
        self.release(cx.clock);
        self.accumulator.rewind();
        self.state = RunState::Idle;

        tracing::debug!(timer = self.id, mode = %self.mode, "timer reset");
        cx.sink.render(self.reading());
        Transition::Reset
    }

    /// Replaces the countdown target.
    ///
    /// Only applies to a countdown that is idle, stopped before any time ran
    /// off, or stopped at zero. Ignored for the stopwatch and while running.
    pub fn on_input_changed(&mut self, seed: Duration, cx: &mut Context<'_>) -> Transition {
        if self.mode != TimerMode::Countdown {
            return Transition::Unchanged;
        }
        let editable = match self.state {
            RunState::Idle => true,
            RunState::Stopped => self.accumulator.is_pristine() || self.accumulator.is_exhausted(),
            RunState::Running => false,
        };
        if !editable {
            tracing::debug!(timer = self.id, state = %self.state, "countdown input ignored");
            return Transition::Unchanged;
        }

        self.accumulator.reset(seed);
        cx.sink.render(self.reading());
        Transition::Reseeded
    }

    /// Handles a delivered frame.
    ///
    /// Frames for a subscription this machine no longer holds are stale and
    /// ignored; they can still arrive after a halt because hosts cannot always
    /// recall a frame that is already on its way.
    pub fn on_frame(&mut self, frame: &FrameMsg, cx: &mut Context<'_>) -> Transition {
        if !self.is_running() || self.subscription != Some(frame.subscription) {
            tracing::trace!(timer = self.id, "stale frame ignored");
            return Transition::Unchanged;
        }

        let delta = match frame.timestamp.checked_sub(self.baseline) {
            Some(delta) => delta,
            None => {
                tracing::warn!(
                    timer = self.id,
                    baseline_ms = self.baseline.as_millis() as u64,
                    timestamp_ms = frame.timestamp.as_millis() as u64,
                    "frame timestamp went backwards; treating delta as zero"
                );
                Duration::ZERO
            }
        };
        self.baseline = frame.timestamp;
        self.release(cx.clock);
        let value = self.accumulator.advance(delta);
        tracing::trace!(timer = self.id, delta_ms = delta.as_millis() as u64, value_ms = value.as_millis() as u64, "frame");

        if self.accumulator.is_exhausted() {
            self.state = RunState::Stopped;
            cx.sink.render(self.reading());
            tracing::info!(timer = self.id, "countdown complete");
            cx.sink.countdown_complete();
            return Transition::Completed;
        }

        self.subscription = Some(cx.clock.subscribe(self.id));
        cx.sink.render(self.reading());
        Transition::Ticked
    }

    /// Halts if running and zeroes the value and seed without rendering.
    ///
    /// Used when the surrounding widget switches away from this timer.
    pub fn discard(&mut self, clock: &mut dyn FrameClock) {
        self.release(clock);
        self.accumulator.reset(Duration::ZERO);
        self.state = RunState::Idle;
    }

    fn release(&mut self, clock: &mut dyn FrameClock) {
        if let Some(subscription) = self.subscription.take() {
            clock.unsubscribe(subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ManualFrameClock;
    use crate::sink::RecordingSink;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Harness {
        clock: ManualFrameClock,
        sink: RecordingSink,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: ManualFrameClock::new(),
                sink: RecordingSink::new(),
            }
        }

        fn cx(&mut self) -> Context<'_> {
            Context::new(&mut self.clock, &mut self.sink)
        }

        /// Releases pending frames at `at` and feeds them to `machine`.
        fn frame(&mut self, machine: &mut TimerStateMachine, at: u64) -> Vec<Transition> {
            let frames = self.clock.fire(ms(at));
            frames
                .iter()
                .map(|frame| machine.on_frame(frame, &mut self.cx()))
                .collect()
        }
    }

    #[test]
    fn test_stopwatch_frame_deltas_accumulate() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();

        assert_eq!(sw.start(&mut h.cx()), Transition::Started);
        for t in [16, 33, 50] {
            assert_eq!(h.frame(&mut sw, t), vec![Transition::Ticked]);
        }

        assert_eq!(sw.value(), ms(50));
        assert_eq!(sw.state(), RunState::Running);
        assert_eq!(h.clock.pending(), 1);
    }

    #[test]
    fn test_double_start_keeps_one_subscription() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();

        assert_eq!(sw.start(&mut h.cx()), Transition::Started);
        assert_eq!(sw.start(&mut h.cx()), Transition::Unchanged);

        assert_eq!(h.clock.pending(), 1);
        assert!(h.clock.is_pending(sw.subscription().unwrap()));
    }

    #[test]
    fn test_double_halt_is_noop() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        h.frame(&mut sw, 40);

        assert_eq!(sw.halt(&mut h.cx()), Transition::Halted);
        let renders = h.sink.readings.len();
        assert_eq!(sw.halt(&mut h.cx()), Transition::Unchanged);

        assert_eq!(sw.state(), RunState::Stopped);
        assert_eq!(h.sink.readings.len(), renders);
        assert_eq!(h.clock.pending(), 0);
        assert!(sw.subscription().is_none());
    }

    #[test]
    fn test_halt_from_idle_is_noop() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        assert_eq!(sw.halt(&mut h.cx()), Transition::Unchanged);
        assert_eq!(sw.state(), RunState::Idle);
    }

    #[test]
    fn test_paused_time_is_not_counted() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        h.frame(&mut sw, 100);
        sw.halt(&mut h.cx());

        h.clock.set_time(ms(600));
        sw.start(&mut h.cx());
        h.frame(&mut sw, 700);

        assert_eq!(sw.value(), ms(200));
    }

    #[test]
    fn test_reset_stopwatch_from_stopped() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        h.frame(&mut sw, 250);
        sw.halt(&mut h.cx());

        assert_eq!(sw.reset(&mut h.cx()), Transition::Reset);
        assert_eq!(sw.value(), Duration::ZERO);
        assert_eq!(sw.state(), RunState::Idle);
        assert_eq!(h.sink.last().unwrap().state, RunState::Idle);
    }

    #[test]
    fn test_reset_while_running_halts_first() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        h.frame(&mut sw, 20);

        sw.reset(&mut h.cx());
        assert_eq!(sw.state(), RunState::Idle);
        assert_eq!(h.clock.pending(), 0);
        assert!(sw.subscription().is_none());
    }

    #[test]
    fn test_reset_countdown_restores_last_seed() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(3000), &mut h.cx());
        cd.start(&mut h.cx());
        h.frame(&mut cd, 1000);
        cd.halt(&mut h.cx());
        assert_eq!(cd.value(), ms(2000));

        cd.reset(&mut h.cx());
        assert_eq!(cd.value(), ms(3000));
        assert_eq!(cd.state(), RunState::Idle);
    }

    #[test]
    fn test_countdown_exact_exhaustion_completes_once() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(5000), &mut h.cx());
        cd.start(&mut h.cx());

        assert_eq!(h.frame(&mut cd, 2500), vec![Transition::Ticked]);
        assert_eq!(h.frame(&mut cd, 5000), vec![Transition::Completed]);

        assert_eq!(cd.value(), Duration::ZERO);
        assert_eq!(cd.state(), RunState::Stopped);
        assert_eq!(h.sink.completions, 1);
        assert_eq!(h.clock.pending(), 0);

        // Nothing left to fire.
        assert!(h.frame(&mut cd, 6000).is_empty());
        assert_eq!(h.sink.completions, 1);
    }

    #[test]
    fn test_countdown_frame_skip_clamps_to_zero() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(5000), &mut h.cx());
        cd.start(&mut h.cx());

        assert_eq!(h.frame(&mut cd, 6000), vec![Transition::Completed]);
        assert_eq!(cd.value(), Duration::ZERO);
        assert_eq!(h.sink.completions, 1);
    }

    #[test]
    fn test_manual_halt_does_not_complete() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(5000), &mut h.cx());
        cd.start(&mut h.cx());
        h.frame(&mut cd, 1000);
        cd.halt(&mut h.cx());

        assert_eq!(h.sink.completions, 0);
    }

    #[test]
    fn test_start_exhausted_countdown_is_noop() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();

        assert_eq!(cd.start(&mut h.cx()), Transition::Unchanged);
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!(h.clock.pending(), 0);
        assert!(h.sink.readings.is_empty());
    }

    #[test]
    fn test_start_after_completion_is_noop() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(100), &mut h.cx());
        cd.start(&mut h.cx());
        h.frame(&mut cd, 100);

        assert_eq!(cd.start(&mut h.cx()), Transition::Unchanged);
        assert_eq!(cd.state(), RunState::Stopped);
        assert_eq!(h.clock.pending(), 0);
    }

    #[test]
    fn test_stale_frame_after_halt_is_ignored() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        let in_flight = FrameMsg {
            subscription: sw.subscription().unwrap(),
            timestamp: ms(500),
        };
        sw.halt(&mut h.cx());

        assert_eq!(sw.on_frame(&in_flight, &mut h.cx()), Transition::Unchanged);
        assert_eq!(sw.value(), Duration::ZERO);
        assert_eq!(h.clock.pending(), 0);
    }

    #[test]
    fn test_frame_from_previous_run_is_ignored() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        let old = sw.subscription().unwrap();
        sw.halt(&mut h.cx());
        sw.start(&mut h.cx());

        let stale = FrameMsg {
            subscription: old,
            timestamp: ms(900),
        };
        assert_eq!(sw.on_frame(&stale, &mut h.cx()), Transition::Unchanged);
        assert_eq!(sw.value(), Duration::ZERO);
        assert_eq!(h.clock.pending(), 1);
    }

    #[test]
    fn test_backwards_timestamp_counts_as_zero() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        h.clock.set_time(ms(1000));
        sw.start(&mut h.cx());

        assert_eq!(h.frame(&mut sw, 900), vec![Transition::Ticked]);
        assert_eq!(sw.value(), Duration::ZERO);

        // The baseline follows the anomalous stamp, so the next gap is real.
        h.frame(&mut sw, 950);
        assert_eq!(sw.value(), ms(50));
    }

    #[test]
    fn test_input_ignored_while_running_or_mid_run() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(4000), &mut h.cx());
        cd.start(&mut h.cx());

        assert_eq!(cd.on_input_changed(ms(9000), &mut h.cx()), Transition::Unchanged);
        h.frame(&mut cd, 1000);
        cd.halt(&mut h.cx());
        assert_eq!(cd.on_input_changed(ms(9000), &mut h.cx()), Transition::Unchanged);
        assert_eq!(cd.value(), ms(3000));
    }

    #[test]
    fn test_input_accepted_when_stopped_untouched_or_finished() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(200), &mut h.cx());

        // Started and halted before any frame: nothing has elapsed.
        cd.start(&mut h.cx());
        cd.halt(&mut h.cx());
        assert_eq!(cd.on_input_changed(ms(300), &mut h.cx()), Transition::Reseeded);

        cd.start(&mut h.cx());
        h.frame(&mut cd, 300);
        assert_eq!(cd.state(), RunState::Stopped);
        assert_eq!(cd.on_input_changed(ms(700), &mut h.cx()), Transition::Reseeded);
        assert_eq!(cd.value(), ms(700));
    }

    #[test]
    fn test_stopwatch_ignores_input() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        assert_eq!(sw.on_input_changed(ms(1000), &mut h.cx()), Transition::Unchanged);
        assert_eq!(sw.value(), Duration::ZERO);
    }

    #[test]
    fn test_discard_releases_and_zeroes() {
        let mut h = Harness::new();
        let mut cd = TimerStateMachine::countdown();
        cd.on_input_changed(ms(1000), &mut h.cx());
        cd.start(&mut h.cx());

        cd.discard(&mut h.clock);
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!(cd.value(), Duration::ZERO);
        assert_eq!(cd.accumulator().seed(), Duration::ZERO);
        assert_eq!(h.clock.pending(), 0);
    }

    #[test]
    fn test_every_change_renders() {
        let mut h = Harness::new();
        let mut sw = TimerStateMachine::stopwatch();
        sw.start(&mut h.cx());
        h.frame(&mut sw, 10);
        sw.halt(&mut h.cx());
        sw.reset(&mut h.cx());

        let states: Vec<_> = h.sink.readings.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                RunState::Running,
                RunState::Running,
                RunState::Stopped,
                RunState::Idle
            ]
        );
        assert!(h
            .sink
            .readings
            .iter()
            .all(|r| r.mode == TimerMode::Stopwatch));
    }

    proptest! {
        #[test]
        fn prop_running_holds_exactly_one_subscription(ops in prop::collection::vec(0u8..4, 1..40)) {
            let mut h = Harness::new();
            let mut sw = TimerStateMachine::stopwatch();
            let mut now = 0u64;
            for op in ops {
                match op {
                    0 => { sw.start(&mut h.cx()); }
                    1 => { sw.halt(&mut h.cx()); }
                    2 => { sw.reset(&mut h.cx()); }
                    _ => { now += 16; h.frame(&mut sw, now); }
                }
                let expected = usize::from(sw.is_running());
                prop_assert_eq!(h.clock.pending(), expected);
                prop_assert_eq!(sw.subscription().is_some(), sw.is_running());
            }
        }

        #[test]
        fn prop_countdown_completes_exactly_once(
            seed in 1u64..20_000,
            gaps in prop::collection::vec(0u64..3_000, 1..64),
        ) {
            let mut h = Harness::new();
            let mut cd = TimerStateMachine::countdown();
            cd.on_input_changed(ms(seed), &mut h.cx());
            cd.start(&mut h.cx());

            let mut now = 0u64;
            for gap in &gaps {
                now += gap;
                h.frame(&mut cd, now);
            }

            let spent: u64 = gaps.iter().sum();
            prop_assert_eq!(cd.value(), ms(seed.saturating_sub(spent)));
            prop_assert_eq!(h.sink.completions, usize::from(spent >= seed));
        }
    }
}
