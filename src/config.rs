//! Widget configuration and preference persistence.
//!
//! Settings are plain TOML. Every field is optional; anything missing falls
//! back to [`Config::default`].
//!
//! ```rust
//! use bubbletea_chrono::config::{Config, Theme};
//! use bubbletea_chrono::mode::TimerMode;
//!
//! let config = Config::from_toml_str(r#"
//!     initial_mode = "countdown"
//!     theme = "dark"
//! "#).unwrap();
//! assert_eq!(config.initial_mode, TimerMode::Countdown);
//! assert_eq!(config.theme, Theme::Dark);
//! assert_eq!(config.frame_interval_ms, 16);
//! ```

use crate::error::{Error, Result};
use crate::mode::TimerMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Color palette preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light terminal.
    #[default]
    Light,
    /// Light text on a dark terminal.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Settings for the chrono widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between a frame request and its delivery, in milliseconds.
    pub frame_interval_ms: u64,
    /// How often the clock face refreshes, in milliseconds.
    pub clock_refresh_ms: u64,
    /// Mode shown when the widget starts.
    pub initial_mode: TimerMode,
    /// Palette used when rendering.
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            clock_refresh_ms: 1000,
            initial_mode: TimerMode::Clock,
            theme: Theme::Light,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the config as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(Error::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Writes the config to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        let write = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write)?;
        }
        std::fs::write(path, text).map_err(write)
    }

    /// Rejects values the widget cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(Error::Invalid {
                field: "frame_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.clock_refresh_ms == 0 {
            return Err(Error::Invalid {
                field: "clock_refresh_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Frame interval as a duration.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Clock refresh period as a duration.
    pub fn clock_refresh(&self) -> Duration {
        Duration::from_millis(self.clock_refresh_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str("frame_interval_ms = 33").unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(33));
        assert_eq!(config.clock_refresh(), Duration::from_secs(1));
        assert_eq!(config.initial_mode, TimerMode::Clock);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = Config::from_toml_str("frame_interval_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            Error::Invalid {
                field: "frame_interval_ms",
                ..
            }
        ));
        assert!(Config::from_toml_str("clock_refresh_ms = 0").is_err());
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let err = Config::from_toml_str(r#"initial_mode = "lap""#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("bubbletea-chrono-{}", std::process::id()));
        let path = dir.join("nested").join("chrono.toml");
        let config = Config {
            initial_mode: TimerMode::Stopwatch,
            theme: Theme::Dark,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("bubbletea-chrono-does-not-exist.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }
}
