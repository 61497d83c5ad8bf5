//! Keyboard mapping for navigation commands.
//!
//! ## Learning: Lookup Tables Over Match Trees
//!
//! Key handling is a table from chord to command. Defaults go in first
//! and user bindings from the config are layered on top, replacing a
//! default on the same chord.

use crate::command::NavCommand;
use crate::config::Config;
use crate::navigator::NavDirection;
use crate::NavError;
use mathnav_model::Direction;
use std::collections::HashMap;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Shift modifier.
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Alt modifier.
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Alt+Shift.
    pub const ALT_SHIFT: Modifiers = Modifiers {
        alt: true,
        shift: true,
        ..Modifiers::NONE
    };

    /// Ctrl+Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Parses modifiers from a string like "ctrl+shift".
    pub fn parse(s: &str) -> Self {
        let mut mods = Modifiers::NONE;
        for part in s.split('+').map(str::to_lowercase) {
            match part.as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "shift" => mods.shift = true,
                "meta" | "cmd" | "win" => mods.meta = true,
                _ => {}
            }
        }
        mods
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl Key {
    /// Parses a key from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "tab" => Some(Key::Tab),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::Tab => write!(f, "Tab"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses a chord like "ctrl+a" or "Shift+Right".
    pub fn parse(s: &str) -> Option<Self> {
        let (mod_str, key_str) = match s.rsplit_once('+') {
            // "Ctrl++" binds the plus key
            Some((mods, "")) => (mods.strip_suffix('+')?, "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };
        let key = Key::parse(key_str)?;
        Some(Self {
            key,
            modifiers: Modifiers::parse(mod_str),
        })
    }

    /// Parses a whitespace-separated list of chords.
    pub fn parse_sequence(s: &str) -> Result<Vec<KeyPress>, NavError> {
        s.split_whitespace()
            .map(|chord| Self::parse(chord).ok_or_else(|| NavError::UnknownKey(chord.to_string())))
            .collect()
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Result of processing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapResult {
    /// A command was matched.
    Match(NavCommand),
    /// No binding matches.
    NoMatch,
}

/// Keyboard mapping configuration.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyPress, NavCommand>,
}

impl Keymap {
    /// Creates a new keymap with default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// Bindings that don't parse are logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        // Add user bindings
        for (key_str, cmd_str) in &config.keyboard.bindings {
            let Some(key) = KeyPress::parse(key_str) else {
                tracing::warn!(chord = %key_str, "ignoring binding with unknown key");
                continue;
            };
            match cmd_str.parse::<NavCommand>() {
                Ok(cmd) => keymap.bind(key, cmd),
                Err(err) => tracing::warn!(chord = %key_str, %err, "ignoring binding"),
            }
        }
        keymap
    }

    /// Adds default key bindings.
    fn add_default_bindings(&mut self) {
        use Direction::{Backward, Forward};

        let arrows = [
            (Key::Right, NavDirection::Forward),
            (Key::Left, NavDirection::Backward),
            (Key::Up, NavDirection::Upward),
            (Key::Down, NavDirection::Downward),
        ];
        for (key, direction) in arrows {
            self.bind(KeyPress::new(key, Modifiers::NONE), NavCommand::step(direction));
            self.bind(KeyPress::new(key, Modifiers::SHIFT), NavCommand::extend(direction));
        }

        for (key, direction) in [(Key::Right, Forward), (Key::Left, Backward)] {
            self.bind(
                KeyPress::new(key, Modifiers::ALT),
                NavCommand::Skip {
                    direction,
                    extend: false,
                },
            );
            self.bind(
                KeyPress::new(key, Modifiers::ALT_SHIFT),
                NavCommand::Skip {
                    direction,
                    extend: true,
                },
            );
        }

        for (key, direction) in [(Key::Home, Backward), (Key::End, Forward)] {
            for (modifiers, extend) in [(Modifiers::NONE, false), (Modifiers::SHIFT, true)] {
                self.bind(
                    KeyPress::new(key, modifiers),
                    NavCommand::GroupEdge { direction, extend },
                );
            }
            for (modifiers, extend) in [(Modifiers::CTRL, false), (Modifiers::CTRL_SHIFT, true)] {
                self.bind(
                    KeyPress::new(key, modifiers),
                    NavCommand::Edge { direction, extend },
                );
            }
        }

        // Tab hops between branches like a step
        self.bind(
            KeyPress::new(Key::Tab, Modifiers::NONE),
            NavCommand::step(NavDirection::Forward),
        );
        self.bind(
            KeyPress::new(Key::Tab, Modifiers::SHIFT),
            NavCommand::step(NavDirection::Backward),
        );

        self.bind(
            KeyPress::new(Key::Char('a'), Modifiers::CTRL),
            NavCommand::SelectAll,
        );
        self.bind(
            KeyPress::new(Key::Char('d'), Modifiers::CTRL),
            NavCommand::SelectWord,
        );
    }

    /// Binds `key` to `command`, replacing any previous binding.
    pub fn bind(&mut self, key: KeyPress, command: NavCommand) {
        self.bindings.insert(key, command);
    }

    /// Processes a key press.
    pub fn process(&self, key: KeyPress) -> KeymapResult {
        match self.bindings.get(&key) {
            Some(cmd) => KeymapResult::Match(*cmd),
            None => KeymapResult::NoMatch,
        }
    }

    /// Like [`Keymap::process`], with a missing binding as an error.
    pub fn command_for(&self, key: KeyPress) -> Result<NavCommand, NavError> {
        match self.process(key) {
            KeymapResult::Match(cmd) => Ok(cmd),
            KeymapResult::NoMatch => Err(NavError::Unbound(key.to_string())),
        }
    }

    /// Returns the bindings sorted by chord name.
    pub fn bindings(&self) -> Vec<(KeyPress, NavCommand)> {
        let mut bindings: Vec<_> = self.bindings.iter().map(|(k, c)| (*k, *c)).collect();
        bindings.sort_by_key(|(key, _)| key.to_string());
        bindings
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
