//! Key bindings with attached help text.
//!
//! ```rust
//! use bubbletea_chrono::key::Binding;
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let reset = Binding::new(vec![KeyCode::Char('r')]).with_help("r", "reset");
//! let msg = KeyMsg { key: KeyCode::Char('r'), modifiers: KeyModifiers::NONE };
//! assert!(reset.matches(&msg));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A set of keys that trigger one action, plus how to describe it.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyCode>,
    help_key: String,
    help_desc: String,
    enabled: bool,
}

impl Binding {
    /// Creates an enabled binding for `keys` with no help text.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys,
            help_key: String::new(),
            help_desc: String::new(),
            enabled: true,
        }
    }

    /// Sets the key label and description shown in help.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help_key = key.into();
        self.help_desc = desc.into();
        self
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the binding can match.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Keys that trigger the binding.
    pub fn keys(&self) -> &[KeyCode] {
        &self.keys
    }

    /// Key label and description for help output.
    pub fn help(&self) -> (&str, &str) {
        (&self.help_key, &self.help_desc)
    }

    /// Whether `msg` triggers this binding.
    ///
    /// Presses held with Ctrl or Alt never match, so they stay available to
    /// the host application.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if !self.enabled {
            return false;
        }
        if msg
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        self.keys.contains(&msg.key)
    }
}

/// Something that can describe its bindings for a help line.
pub trait KeyMap {
    /// Bindings worth showing in a single-line help view.
    fn short_help(&self) -> Vec<&Binding>;
}

/// `(key, description)` pairs for the enabled, labelled bindings of `keymap`.
pub fn help_pairs(keymap: &dyn KeyMap) -> Vec<(String, String)> {
    keymap
        .short_help()
        .into_iter()
        .filter(|b| b.enabled() && !b.help_key.is_empty())
        .map(|b| (b.help_key.clone(), b.help_desc.clone()))
        .collect()
}
