//! Frame scheduling for the timer state machines.
//!
//! A [`FrameClock`] hands out one-shot [`FrameSubscription`]s. When the host
//! reaches its next refresh opportunity it delivers a [`FrameMsg`] carrying the
//! subscription and a monotonic timestamp back to the owner, which decides
//! whether to ask for another frame. Continuous ticking is therefore a chain of
//! single subscriptions, never a fixed-rate interval.
//!
//! Two clocks are provided:
//!
//! - [`ManualFrameClock`] for headless hosts and tests. Time only moves when
//!   the host says so and pending frames are released on demand.
//! - [`TickFrameClock`] for bubbletea-rs programs. Each subscription becomes a
//!   `tick` command that fires after the frame interval.
//!
//! # Example
//!
//! ```rust
//! use bubbletea_chrono::frame::{FrameClock, ManualFrameClock};
//! use std::time::Duration;
//!
//! let mut clock = ManualFrameClock::new();
//! let sub = clock.subscribe(7);
//! assert_eq!(clock.pending(), 1);
//!
//! let frames = clock.fire(Duration::from_millis(16));
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].subscription, sub);
//! assert_eq!(frames[0].timestamp, Duration::from_millis(16));
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::time::{Duration, Instant};

/// Default pacing for [`TickFrameClock`], roughly one display refresh at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Opaque handle to one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSubscription {
    owner: i64,
    seq: u64,
}

impl FrameSubscription {
    /// Identifier of the component that requested the frame.
    pub fn owner(&self) -> i64 {
        self.owner
    }
}

/// Delivered once per subscription when its frame arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMsg {
    /// The subscription this frame answers.
    pub subscription: FrameSubscription,
    /// Monotonic time of the frame, measured from the clock's origin.
    pub timestamp: Duration,
}

/// Source of monotonic timestamps and one-shot frame deliveries.
pub trait FrameClock {
    /// Current monotonic time.
    fn now(&self) -> Duration;

    /// Schedules a single frame for `owner` and returns its handle.
    fn subscribe(&mut self, owner: i64) -> FrameSubscription;

    /// Cancels a pending frame.
    ///
    /// Calling this for a frame that already fired or was already cancelled
    /// does nothing.
    fn unsubscribe(&mut self, subscription: FrameSubscription);
}

/// Host-driven frame clock with no wall-clock dependency.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameClock {
    now: Duration,
    next_seq: u64,
    pending: Vec<FrameSubscription>,
}

impl ManualFrameClock {
    /// Creates a clock at time zero with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock to `at`. Going backwards is allowed so hosts can
    /// replay timestamps exactly as they observed them.
    pub fn set_time(&mut self, at: Duration) {
        self.now = at;
    }

    /// Number of frames currently scheduled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether `subscription` is still waiting for its frame.
    pub fn is_pending(&self, subscription: FrameSubscription) -> bool {
        self.pending.contains(&subscription)
    }

    /// Sets the time to `at` and releases every pending frame, oldest first.
    pub fn fire(&mut self, at: Duration) -> Vec<FrameMsg> {
        self.now = at;
        self.pending
            .drain(..)
            .map(|subscription| FrameMsg {
                subscription,
                timestamp: at,
            })
            .collect()
    }
}

impl FrameClock for ManualFrameClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn subscribe(&mut self, owner: i64) -> FrameSubscription {
        self.next_seq += 1;
        let subscription = FrameSubscription {
            owner,
            seq: self.next_seq,
        };
        self.pending.push(subscription);
        subscription
    }

    fn unsubscribe(&mut self, subscription: FrameSubscription) {
        self.pending.retain(|pending| *pending != subscription);
    }
}

/// Frame clock backed by bubbletea-rs tick commands.
///
/// Subscribing records the request; [`TickFrameClock::take_cmd`] turns it into
/// the command the program has to run. A tick that was already handed to the
/// runtime cannot be pulled back, so cancelling only drops requests that have
/// not been taken yet. Owners must ignore frames for subscriptions they no
/// longer hold.
#[derive(Debug, Clone)]
pub struct TickFrameClock {
    origin: Instant,
    interval: Duration,
    next_seq: u64,
    scheduled: Option<FrameSubscription>,
}

impl Default for TickFrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl TickFrameClock {
    /// Creates a clock whose frames fire `interval` after being requested.
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval,
            next_seq: 0,
            scheduled: None,
        }
    }

    /// Time between a subscription and its frame.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a frame request is waiting to be turned into a command.
    pub fn has_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Converts the outstanding frame request, if any, into a tick command.
    pub fn take_cmd(&mut self) -> Option<Cmd> {
        let subscription = self.scheduled.take()?;
        let origin = self.origin;

        Some(bubbletea_tick(self.interval, move |_| {
            Box::new(FrameMsg {
                subscription,
                timestamp: origin.elapsed(),
            }) as Msg
        }))
    }
}

impl FrameClock for TickFrameClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn subscribe(&mut self, owner: i64) -> FrameSubscription {
        self.next_seq += 1;
        let subscription = FrameSubscription {
            owner,
            seq: self.next_seq,
        };
        if let Some(replaced) = self.scheduled.replace(subscription) {
            tracing::warn!(owner = replaced.owner, "frame request replaced before dispatch");
        }
        subscription
    }

    fn unsubscribe(&mut self, subscription: FrameSubscription) {
        if self.scheduled == Some(subscription) {
            self.scheduled = None;
        }
    }
}
