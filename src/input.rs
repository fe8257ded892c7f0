//! Hours/minutes/seconds entry for the countdown target.
//!
//! Fields hold at most two typed digits. Values are clamped when read, so a
//! typed `75` in the minutes field reads as 59.
//!
//! ```rust
//! use bubbletea_chrono::input::{CountdownInput, Field};
//! use std::time::Duration;
//!
//! let mut input = CountdownInput::new();
//! input.set_focus(Field::Minutes);
//! input.push_digit('2');
//! input.focus_next();
//! input.push_digit('3');
//! input.push_digit('0');
//! assert_eq!(input.seed(), Duration::from_secs(2 * 60 + 30));
//! ```

use std::time::Duration;

const MAX_DIGITS: usize = 2;

/// One of the three countdown fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Hours, up to 99.
    Hours,
    /// Minutes, up to 59.
    Minutes,
    /// Seconds, up to 59.
    Seconds,
}

impl Field {
    /// Largest value the field reads as.
    pub fn max(self) -> u64 {
        match self {
            Field::Hours => 99,
            Field::Minutes | Field::Seconds => 59,
        }
    }

    /// Lowercase field name.
    pub fn label(self) -> &'static str {
        match self {
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
        }
    }

    fn index(self) -> usize {
        match self {
            Field::Hours => 0,
            Field::Minutes => 1,
            Field::Seconds => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Field::Hours => Field::Minutes,
            Field::Minutes => Field::Seconds,
            Field::Seconds => Field::Hours,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Hours => Field::Seconds,
            Field::Minutes => Field::Hours,
            Field::Seconds => Field::Minutes,
        }
    }
}

/// Editable countdown target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownInput {
    text: [String; 3],
    focus: Field,
}

impl Default for CountdownInput {
    fn default() -> Self {
        Self {
            text: Default::default(),
            focus: Field::Hours,
        }
    }
}

impl CountdownInput {
    /// Empty input focused on hours.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field receiving digits.
    pub fn focus(&self) -> Field {
        self.focus
    }

    /// Moves focus to `field`.
    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    /// Moves focus right, wrapping.
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Moves focus left, wrapping.
    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Appends a digit to the focused field. Returns whether anything changed.
    pub fn push_digit(&mut self, c: char) -> bool {
        let text = &mut self.text[self.focus.index()];
        if !c.is_ascii_digit() || text.len() >= MAX_DIGITS {
            return false;
        }
        text.push(c);
        true
    }

    /// Removes the last digit of the focused field. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        self.text[self.focus.index()].pop().is_some()
    }

    /// Typed text of `field`, possibly empty.
    pub fn raw(&self, field: Field) -> &str {
        &self.text[field.index()]
    }

    /// Value of `field`: empty reads as zero, anything above the maximum as
    /// the maximum.
    pub fn value(&self, field: Field) -> u64 {
        self.raw(field)
            .parse::<u64>()
            .unwrap_or(0)
            .min(field.max())
    }

    /// Countdown target described by the three fields.
    pub fn seed(&self) -> Duration {
        let secs = self.value(Field::Hours) * 3600
            + self.value(Field::Minutes) * 60
            + self.value(Field::Seconds);
        Duration::from_secs(secs)
    }

    /// Empties every field and focuses hours.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
