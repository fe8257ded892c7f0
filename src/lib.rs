#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-chrono/")]

//! # bubbletea-chrono
//!
//! A clock, stopwatch and countdown widget for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications, built on a frame-driven timer core that can also run headless.
//!
//! ## Overview
//!
//! The crate is split in two layers:
//!
//! - **Timer core**: [`accumulator`], [`machine`], [`mode`], [`frame`] and
//!   [`sink`]. Timers never read the wall clock directly. They ask a
//!   [`frame::FrameClock`] for one frame at a time, measure the real gap
//!   between frames and push readings into a [`sink::Sink`]. Dropped or
//!   throttled frames only make the next delta larger.
//! - **Widget**: [`widget::Model`] wires the core to bubbletea-rs tick
//!   commands, handles key presses and renders the readout with lipgloss.
//!
//! ## Headless Usage
//!
//! ```rust
//! use bubbletea_chrono::prelude::*;
//! use std::time::Duration;
//!
//! let mut clock = ManualFrameClock::new();
//! let mut sink = RecordingSink::new();
//! let mut modes = ModeController::new(TimerMode::Countdown);
//!
//! let mut cx = Context::new(&mut clock, &mut sink);
//! modes.set_countdown_seed(Duration::from_secs(2), &mut cx);
//! modes.start(&mut cx);
//!
//! for frame in clock.fire(Duration::from_secs(2)) {
//!     modes.on_frame(&frame, &mut Context::new(&mut clock, &mut sink));
//! }
//! assert_eq!(modes.reading().state, RunState::Stopped);
//! assert_eq!(sink.completions, 1);
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use bubbletea_chrono::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//!
//! struct App {
//!     chrono: Chrono,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut chrono = Chrono::new(&Config::default());
//!         let cmd = chrono.init();
//!         (Self { chrono }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.chrono.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.chrono.view()
//!     }
//! }
//! ```

pub mod accumulator;
pub mod config;
pub mod error;
pub mod face;
pub mod frame;
pub mod input;
pub mod key;
pub mod machine;
pub mod mode;
pub mod sink;
pub mod widget;

pub use accumulator::{Direction, TickAccumulator};
pub use config::{Config, Theme};
pub use error::{Error, Result};
pub use frame::{FrameClock, FrameMsg, FrameSubscription, ManualFrameClock, TickFrameClock};
pub use machine::{Context, RunState, TimerStateMachine, Transition};
pub use mode::{ModeController, TimerMode};
pub use sink::{Reading, RecordingSink, Sink};
pub use widget::{
    ChronoKeyMap, ClockTickMsg, CountdownCompleteMsg, Model as Chrono,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_chrono::prelude::*;
///
/// let chrono = Chrono::default();
/// assert_eq!(chrono.mode(), TimerMode::Clock);
/// ```
pub mod prelude {
    pub use crate::config::{Config, Theme};
    pub use crate::face::{format_hms, HandAngles};
    pub use crate::frame::{FrameClock, FrameMsg, ManualFrameClock, TickFrameClock};
    pub use crate::input::{CountdownInput, Field};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::machine::{Context, RunState, TimerStateMachine, Transition};
    pub use crate::mode::{ModeController, TimerMode};
    pub use crate::sink::{Reading, RecordingSink, Sink};
    pub use crate::widget::{
        ChronoKeyMap, ClockTickMsg, CountdownCompleteMsg, Model as Chrono,
    };
}
