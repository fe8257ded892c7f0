//! Display helpers: digit formatting, large glyphs and analog hand angles.
//!
//! Nothing here touches timer state. The widget feeds it readings and wall
//! clock times and gets strings and angles back.

use chrono::Timelike;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Formats `value` as `HH:MM:SS`, or `HH:MM:SS.cc` with centiseconds.
///
/// Hours are not wrapped; they widen past two digits when needed.
///
/// ```rust
/// use bubbletea_chrono::face::format_hms;
/// use std::time::Duration;
///
/// assert_eq!(format_hms(Duration::from_millis(3_723_456), true), "01:02:03.45");
/// assert_eq!(format_hms(Duration::from_millis(59_999), false), "00:00:59");
/// ```
pub fn format_hms(value: Duration, with_fraction: bool) -> String {
    let total = value.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if with_fraction {
        let centis = value.subsec_millis() / 10;
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Rotation of the three hands of an analog face, in degrees clockwise from
/// twelve o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    /// Hour hand.
    pub hour: f64,
    /// Minute hand.
    pub minute: f64,
    /// Second hand.
    pub second: f64,
}

impl HandAngles {
    /// Angles for a wall-clock time. The hour and minute hands sweep
    /// continuously with the smaller units.
    pub fn for_time<T: Timelike>(time: &T) -> Self {
        let (h, m, s) = (
            f64::from(time.hour() % 12),
            f64::from(time.minute()),
            f64::from(time.second()),
        );
        Self {
            hour: (h * 3600.0 + m * 60.0 + s) / 43_200.0 * 360.0,
            minute: (m * 60.0 + s) / 3600.0 * 360.0,
            second: s / 60.0 * 360.0,
        }
    }

    /// Angles for a stopwatch or countdown value, treating it as time on a
    /// twelve hour dial.
    pub fn for_duration(value: Duration) -> Self {
        let total = value.as_secs();
        let h = ((total / 3600) % 12) as f64;
        let m = ((total % 3600) / 60) as f64;
        let s = (total % 60) as f64;
        Self {
            hour: h / 12.0 * 360.0 + m / 60.0 * 30.0,
            minute: m / 60.0 * 360.0 + s / 60.0 * 6.0,
            second: s / 60.0 * 360.0,
        }
    }
}

const GLYPH_ROWS: usize = 3;

static GLYPHS: Lazy<HashMap<char, [&'static str; GLYPH_ROWS]>> = Lazy::new(|| {
    HashMap::from([
        ('0', ["┌─┐", "│ │", "└─┘"]),
        ('1', ["  ╷", "  │", "  ╵"]),
        ('2', ["╶─┐", "┌─┘", "└─╴"]),
        ('3', ["╶─┐", " ─┤", "╶─┘"]),
        ('4', ["╷ ╷", "└─┤", "  ╵"]),
        ('5', ["┌─╴", "└─┐", "╶─┘"]),
        ('6', ["┌─╴", "├─┐", "└─┘"]),
        ('7', ["╶─┐", "  │", "  ╵"]),
        ('8', ["┌─┐", "├─┤", "└─┘"]),
        ('9', ["┌─┐", "└─┤", "╶─┘"]),
        (':', [" ", ":", " "]),
        ('.', [" ", " ", "."]),
    ])
});

/// Renders digits, `:` and `.` as three rows of box-drawing glyphs.
///
/// Characters without a glyph are drawn as blanks of the same width.
pub fn big_digits(text: &str) -> [String; GLYPH_ROWS] {
    let mut rows: [String; GLYPH_ROWS] = Default::default();
    for (i, c) in text.chars().enumerate() {
        for (row, line) in rows.iter_mut().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            match GLYPHS.get(&c) {
                Some(glyph) => line.push_str(glyph[row]),
                None => line.push_str(&" ".repeat(UnicodeWidthStr::width(c.to_string().as_str()))),
            }
        }
    }
    rows
}

/// Pads `text` on both sides so it sits in the middle of `width` columns.
pub fn center(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    if used >= width {
        return text.to_string();
    }
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_hms(Duration::ZERO, true), "00:00:00.00");
        assert_eq!(format_hms(Duration::ZERO, false), "00:00:00");
    }

    #[test]
    fn test_format_long_values_do_not_wrap() {
        assert_eq!(
            format_hms(Duration::from_secs(100 * 3600 + 5), false),
            "100:00:05"
        );
    }

    #[test]
    fn test_format_stopwatch_scenario() {
        assert_eq!(format_hms(Duration::from_millis(50), true), "00:00:00.05");
    }

    #[test]
    fn test_wall_clock_angles() {
        let three = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        let angles = HandAngles::for_time(&three);
        assert_eq!(angles.hour, 90.0);
        assert_eq!(angles.minute, 0.0);
        assert_eq!(angles.second, 0.0);

        let half = NaiveTime::from_hms_opt(6, 30, 15).unwrap();
        let angles = HandAngles::for_time(&half);
        assert!((angles.hour - 195.125).abs() < 1e-9);
        assert!((angles.minute - 181.5).abs() < 1e-9);
        assert_eq!(angles.second, 90.0);
    }

    #[test]
    fn test_duration_angles() {
        let angles = HandAngles::for_duration(Duration::from_secs(90 * 60 + 30));
        assert!((angles.hour - 45.0).abs() < 1e-9);
        assert_eq!(angles.minute, 180.0 + 3.0);
        assert_eq!(angles.second, 180.0);
    }

    #[test]
    fn test_big_digits_rows_line_up() {
        let rows = big_digits("12:30.5");
        let widths: Vec<usize> = rows.iter().map(|r| UnicodeWidthStr::width(r.as_str())).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(rows[1].contains(':'));
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("toolong", 3), "toolong");
    }
}
