//! Clock, stopwatch and countdown widget for Bubble Tea applications.
//!
//! The widget drives a [`ModeController`] with a [`TickFrameClock`]: every
//! running timer asks for one frame at a time and each answered frame turns
//! into the next tick command. Clock mode refreshes on its own slower tick.
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_chrono::widget::{CountdownCompleteMsg, Model as Chrono};
//! use bubbletea_chrono::config::Config;
//!
//! struct App {
//!     chrono: Chrono,
//!     alert: Option<String>,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut chrono = Chrono::new(&Config::default());
//!         let cmd = chrono.init();
//!         (Self { chrono, alert: None }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(done) = msg.downcast_ref::<CountdownCompleteMsg>() {
//!             if done.id == self.chrono.id() {
//!                 self.alert = Some("Countdown complete!".to_string());
//!                 return None;
//!             }
//!         }
//!         self.chrono.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.chrono.view()
//!     }
//! }
//! ```

use crate::config::{Config, Theme};
use crate::face::{big_digits, center, format_hms, HandAngles};
use crate::frame::{FrameMsg, TickFrameClock};
use crate::input::{CountdownInput, Field};
use crate::key::{help_pairs, Binding, KeyMap};
use crate::machine::{Context, RunState, Transition};
use crate::mode::{ModeController, TimerMode};
use crate::sink::{Reading, Sink};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Refreshes the clock face while clock mode is showing.
#[derive(Debug, Clone)]
pub struct ClockTickMsg {
    /// Widget the tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Sent once when a countdown runs out on its own.
#[derive(Debug, Clone)]
pub struct CountdownCompleteMsg {
    /// Widget whose countdown finished.
    pub id: i64,
}

/// Key bindings for the widget.
#[derive(Debug, Clone)]
pub struct ChronoKeyMap {
    /// Show the next mode.
    pub next_mode: Binding,
    /// Show the previous mode.
    pub prev_mode: Binding,
    /// Start or pause the active timer.
    pub toggle: Binding,
    /// Start the active timer.
    pub start: Binding,
    /// Pause the active timer.
    pub halt: Binding,
    /// Reset the active timer.
    pub reset: Binding,
    /// Switch between light and dark palettes.
    pub theme: Binding,
    /// Focus the next countdown field.
    pub next_field: Binding,
    /// Focus the previous countdown field.
    pub prev_field: Binding,
}

impl Default for ChronoKeyMap {
    fn default() -> Self {
        Self {
            next_mode: Binding::new(vec![KeyCode::Tab]).with_help("tab", "mode"),
            prev_mode: Binding::new(vec![KeyCode::BackTab]),
            toggle: Binding::new(vec![KeyCode::Char(' ')]).with_help("space", "start/pause"),
            start: Binding::new(vec![KeyCode::Char('s')]),
            halt: Binding::new(vec![KeyCode::Char('p')]),
            reset: Binding::new(vec![KeyCode::Char('r')]).with_help("r", "reset"),
            theme: Binding::new(vec![KeyCode::Char('t')]).with_help("t", "theme"),
            next_field: Binding::new(vec![KeyCode::Right]).with_help("←/→", "field"),
            prev_field: Binding::new(vec![KeyCode::Left]),
        }
    }
}

impl KeyMap for ChronoKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.next_mode,
            &self.toggle,
            &self.reset,
            &self.next_field,
            &self.theme,
        ]
    }
}

// Collects core output between an operation and the command it produces.
#[derive(Debug, Default)]
struct WidgetSink {
    last: Option<Reading>,
    completed: bool,
}

impl Sink for WidgetSink {
    fn render(&mut self, reading: Reading) {
        self.last = Some(reading);
    }

    fn countdown_complete(&mut self) {
        self.completed = true;
    }
}

struct Palette {
    digits: Style,
    active_tab: Style,
    tab: Style,
    status: Style,
    field: Style,
    focused_field: Style,
    help_key: Style,
    help_desc: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        let (text, accent, muted, faint) = match theme {
            Theme::Light => ("#1a1a1a", "#5a56e0", "#909090", "#b2b2b2"),
            Theme::Dark => ("#f0f0f0", "#8c89ff", "#626262", "#4a4a4a"),
        };
        Self {
            digits: Style::new().inline(true).foreground(Color::from(text)).bold(true),
            active_tab: Style::new().inline(true).foreground(Color::from(accent)).bold(true),
            tab: Style::new().inline(true).foreground(Color::from(muted)),
            status: Style::new().inline(true).foreground(Color::from(muted)),
            field: Style::new().inline(true).foreground(Color::from(text)),
            focused_field: Style::new().inline(true).foreground(Color::from(accent)).bold(true),
            help_key: Style::new().inline(true).foreground(Color::from(muted)),
            help_desc: Style::new().inline(true).foreground(Color::from(faint)),
        }
    }
}

/// The chrono widget.
#[derive(Debug)]
pub struct Model {
    /// Key bindings; replace or disable entries to customise controls.
    pub keymap: ChronoKeyMap,
    input: CountdownInput,
    controller: ModeController,
    frames: TickFrameClock,
    sink: WidgetSink,
    theme: Theme,
    clock_refresh: Duration,
    id: i64,
    clock_tag: i64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Model {
    /// Creates a widget from `config`. Both timers start idle at zero.
    pub fn new(config: &Config) -> Self {
        Self {
            keymap: ChronoKeyMap::default(),
            input: CountdownInput::new(),
            controller: ModeController::new(config.initial_mode),
            frames: TickFrameClock::new(config.frame_interval()),
            sink: WidgetSink::default(),
            theme: config.theme,
            clock_refresh: config.clock_refresh(),
            id: next_id(),
            clock_tag: 0,
        }
    }

    /// Identifier carried by this widget's messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Mode being shown.
    pub fn mode(&self) -> TimerMode {
        self.controller.mode()
    }

    /// Current palette.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Read access to the timers.
    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    /// Countdown target fields.
    pub fn input(&self) -> &CountdownInput {
        &self.input
    }

    /// The reading most recently pushed by the timer core.
    pub fn last_reading(&self) -> Option<Reading> {
        self.sink.last
    }

    /// Analog hand positions for what the widget is showing.
    pub fn hand_angles(&self) -> HandAngles {
        match self.controller.active() {
            Some(timer) => HandAngles::for_duration(timer.value()),
            None => HandAngles::for_time(&chrono::Local::now()),
        }
    }

    /// Starts the clock face refresh when opening in clock mode.
    pub fn init(&mut self) -> Option<Cmd> {
        if self.mode() == TimerMode::Clock {
            return Some(self.clock_tick_cmd());
        }
        None
    }

    /// Shows `next`, discarding both timers and the countdown input.
    pub fn switch_mode(&mut self, next: TimerMode) -> Option<Cmd> {
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        if !self.controller.switch_mode(next, &mut cx) {
            return None;
        }
        self.input.clear();
        if next == TimerMode::Clock {
            return Some(self.clock_tick_cmd());
        }
        self.follow_up()
    }

    /// Starts the active timer.
    pub fn start(&mut self) -> Option<Cmd> {
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        self.controller.start(&mut cx);
        self.follow_up()
    }

    /// Pauses the active timer.
    pub fn halt(&mut self) -> Option<Cmd> {
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        self.controller.halt(&mut cx);
        self.follow_up()
    }

    /// Resets the active timer.
    pub fn reset(&mut self) -> Option<Cmd> {
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        self.controller.reset(&mut cx);
        self.follow_up()
    }

    /// Starts or pauses the active timer.
    pub fn toggle(&mut self) -> Option<Cmd> {
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        self.controller.toggle(&mut cx);
        self.follow_up()
    }

    /// Switches between the light and dark palettes.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Handles frames, clock ticks and key presses.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(frame) = msg.downcast_ref::<FrameMsg>() {
            let mut cx = Context::new(&mut self.frames, &mut self.sink);
            self.controller.on_frame(frame, &mut cx);
            return self.follow_up();
        }

        if let Some(tick) = msg.downcast_ref::<ClockTickMsg>() {
            if tick.id != self.id || tick.tag != self.clock_tag {
                return None;
            }
            if self.mode() != TimerMode::Clock {
                return None;
            }
            return Some(self.clock_tick_cmd());
        }

        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            return self.handle_key(key);
        }

        None
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.keymap.next_mode.matches(key) {
            return self.switch_mode(self.mode().next());
        }
        if self.keymap.prev_mode.matches(key) {
            return self.switch_mode(self.mode().prev());
        }
        if self.keymap.toggle.matches(key) {
            return self.toggle();
        }
        if self.keymap.start.matches(key) {
            return self.start();
        }
        if self.keymap.halt.matches(key) {
            return self.halt();
        }
        if self.keymap.reset.matches(key) {
            return self.reset();
        }
        if self.keymap.theme.matches(key) {
            self.toggle_theme();
            return None;
        }

        if self.mode() != TimerMode::Countdown {
            return None;
        }
        if self.keymap.next_field.matches(key) {
            self.input.focus_next();
            return None;
        }
        if self.keymap.prev_field.matches(key) {
            self.input.focus_prev();
            return None;
        }
        match key.key {
            KeyCode::Char(c) if c.is_ascii_digit() => self.edit_input(|input| input.push_digit(c)),
            KeyCode::Backspace => self.edit_input(CountdownInput::backspace),
            _ => None,
        }
    }

    // Applies an edit and forwards the new target; rolls the edit back when
    // the countdown is not accepting input.
    fn edit_input(&mut self, edit: impl FnOnce(&mut CountdownInput) -> bool) -> Option<Cmd> {
        let before = self.input.clone();
        if !edit(&mut self.input) {
            return None;
        }
        let seed = self.input.seed();
        let mut cx = Context::new(&mut self.frames, &mut self.sink);
        if self.controller.set_countdown_seed(seed, &mut cx) == Transition::Unchanged {
            self.input = before;
        }
        self.follow_up()
    }

    // At most one timer runs at a time, so at most one command is pending:
    // either the completion notice or the next frame.
    fn follow_up(&mut self) -> Option<Cmd> {
        if std::mem::take(&mut self.sink.completed) {
            let id = self.id;
            return Some(bubbletea_tick(Duration::from_nanos(1), move |_| {
                Box::new(CountdownCompleteMsg { id }) as Msg
            }));
        }
        self.frames.take_cmd()
    }

    fn clock_tick_cmd(&mut self) -> Cmd {
        self.clock_tag += 1;
        let id = self.id;
        let tag = self.clock_tag;
        bubbletea_tick(self.clock_refresh, move |_| {
            Box::new(ClockTickMsg { id, tag }) as Msg
        })
    }

    /// Renders tabs, the large readout, a status line, the countdown fields
    /// when relevant, and the help line.
    pub fn view(&self) -> String {
        let palette = Palette::for_theme(self.theme);
        let reading = self.controller.reading();

        let (readout, status) = match self.mode() {
            TimerMode::Clock => {
                let now = chrono::Local::now();
                (
                    now.format("%H:%M:%S").to_string(),
                    now.format("%A %d %B %Y").to_string(),
                )
            }
            TimerMode::Stopwatch => (format_hms(reading.value, true), status_label(&reading)),
            TimerMode::Countdown => (format_hms(reading.value, false), status_label(&reading)),
        };

        let glyphs = big_digits(&readout);
        let tabs = self.tabs_line();
        let help = self.help_line();
        let fields = self.fields_line();

        let mut width = glyphs
            .iter()
            .chain([&tabs, &help, &status])
            .map(|line| UnicodeWidthStr::width(line.as_str()))
            .max()
            .unwrap_or(0);
        if let Some(fields) = &fields {
            width = width.max(UnicodeWidthStr::width(fields.as_str()));
        }

        let mut lines = Vec::new();
        lines.push(self.styled_tabs(&palette, width));
        lines.push(String::new());
        for row in &glyphs {
            lines.push(palette.digits.render(&center(row, width)));
        }
        lines.push(String::new());
        lines.push(palette.status.render(&center(&status, width)));
        if let Some(fields) = &fields {
            lines.push(self.styled_fields(&palette, width, UnicodeWidthStr::width(fields.as_str())));
        }
        lines.push(self.styled_help(&palette, width));
        lines.join("\n")
    }

    fn tabs_line(&self) -> String {
        TimerMode::ALL
            .iter()
            .map(|mode| format!(" {} ", mode.label()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn styled_tabs(&self, palette: &Palette, width: usize) -> String {
        let pad = width.saturating_sub(UnicodeWidthStr::width(self.tabs_line().as_str())) / 2;
        let tabs = TimerMode::ALL
            .iter()
            .map(|mode| {
                let label = format!(" {} ", mode.label());
                if *mode == self.mode() {
                    palette.active_tab.render(&label)
                } else {
                    palette.tab.render(&label)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}{}", " ".repeat(pad), tabs)
    }

    fn fields_line(&self) -> Option<String> {
        if self.mode() != TimerMode::Countdown {
            return None;
        }
        Some(
            [Field::Hours, Field::Minutes, Field::Seconds]
                .iter()
                .map(|field| format!("[{:>2}]", self.field_text(*field)))
                .collect::<Vec<_>>()
                .join(" : "),
        )
    }

    fn field_text(&self, field: Field) -> String {
        let raw = self.input.raw(field);
        if raw.is_empty() {
            "00".to_string()
        } else {
            raw.to_string()
        }
    }

    fn styled_fields(&self, palette: &Palette, width: usize, used: usize) -> String {
        let pad = width.saturating_sub(used) / 2;
        let fields = [Field::Hours, Field::Minutes, Field::Seconds]
            .iter()
            .map(|field| {
                let text = format!("[{:>2}]", self.field_text(*field));
                if *field == self.input.focus() {
                    palette.focused_field.render(&text)
                } else {
                    palette.field.render(&text)
                }
            })
            .collect::<Vec<_>>()
            .join(" : ");
        format!("{}{}", " ".repeat(pad), fields)
    }

    fn help_line(&self) -> String {
        help_pairs(&self.keymap)
            .iter()
            .map(|(key, desc)| format!("{} {}", key, desc))
            .collect::<Vec<_>>()
            .join(" • ")
    }

    fn styled_help(&self, palette: &Palette, width: usize) -> String {
        let pad = width.saturating_sub(UnicodeWidthStr::width(self.help_line().as_str())) / 2;
        let help = help_pairs(&self.keymap)
            .iter()
            .map(|(key, desc)| {
                format!(
                    "{} {}",
                    palette.help_key.render(key),
                    palette.help_desc.render(desc)
                )
            })
            .collect::<Vec<_>>()
            .join(&palette.help_desc.render(" • "));
        format!("{}{}", " ".repeat(pad), help)
    }
}

fn status_label(reading: &Reading) -> String {
    match (reading.mode, reading.state) {
        (TimerMode::Countdown, RunState::Stopped) if reading.value.is_zero() => "done".to_string(),
        (_, state) => state.to_string(),
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Self::default();
        let cmd = model.init();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
