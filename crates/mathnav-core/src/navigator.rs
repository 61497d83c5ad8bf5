//! The navigation facade.
//!
//! ## Learning: The Facade Pattern
//!
//! `Navigator` owns the model, the announcement log and the effect log.
//! Callers talk to it alone; the engines in `skip`, `step`, `vertical`
//! and `edges` are `impl Navigator` blocks in their own modules.
//!
//! ## Escapes
//!
//! When a move runs past the edge of the formula the engines don't call
//! the host. They return [`Outcome::Escaped`] and [`Navigator::settle`]
//! asks the [`MoveOutHandler`] what to do, at most once per call.

use std::fmt;
use std::str::FromStr;

use mathnav_model::{AtomId, AtomKind, Direction, FormulaSpec, Model, Offset};
use serde::{Deserialize, Serialize};

use crate::command::NavCommand;
use crate::config::Config;
use crate::event::{Announcement, EventLog, NavEffect, NavEvent};
use crate::word::WordScanner;
use crate::{NavError, NavResult};

/// Direction of a navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Forward,
    Backward,
    Upward,
    Downward,
}

impl NavDirection {
    /// The horizontal component, `None` for vertical directions.
    pub fn horizontal(self) -> Option<Direction> {
        match self {
            NavDirection::Forward => Some(Direction::Forward),
            NavDirection::Backward => Some(Direction::Backward),
            NavDirection::Upward | NavDirection::Downward => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        self.horizontal().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavDirection::Forward => "forward",
            NavDirection::Backward => "backward",
            NavDirection::Upward => "upward",
            NavDirection::Downward => "downward",
        }
    }
}

impl From<Direction> for NavDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => NavDirection::Forward,
            Direction::Backward => NavDirection::Backward,
        }
    }
}

impl FromStr for NavDirection {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(NavDirection::Forward),
            "backward" => Ok(NavDirection::Backward),
            "upward" => Ok(NavDirection::Upward),
            "downward" => Ok(NavDirection::Downward),
            _ => Err(NavError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for NavDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by the navigation entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavOptions {
    /// Move the active end of the selection and keep the anchor
    pub extend: bool,
}

impl NavOptions {
    pub const MOVE: NavOptions = NavOptions { extend: false };
    pub const EXTEND: NavOptions = NavOptions { extend: true };
}

/// What an engine did, before escapes are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The caret or selection changed
    Moved,
    /// Nothing could happen
    Rejected,
    /// The move left the formula in this direction
    Escaped(NavDirection),
}

/// Host hook consulted when navigation leaves the formula.
///
/// Returning `true` asks for the default behavior (the caret stays and a
/// plonk is announced). Returning `false` means the host handled it, for
/// example by focusing a neighbouring field.
pub trait MoveOutHandler {
    fn move_out(&mut self, model: &Model, direction: NavDirection) -> bool;
}

/// A host that never takes an escape.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPlonk;

impl MoveOutHandler for AlwaysPlonk {
    fn move_out(&mut self, _model: &Model, _direction: NavDirection) -> bool {
        true
    }
}

/// Caret navigation over one formula.
///
/// Announcements and formula effects accumulate until the host takes
/// them with [`Navigator::take_events`] and [`Navigator::take_effects`].
/// A long-lived host should drain both after every call; nothing is
/// dropped on its behalf.
#[derive(Debug, Clone)]
pub struct Navigator {
    pub(crate) model: Model,
    config: Config,
    events: EventLog,
    effects: Vec<NavEffect>,
    scanner: WordScanner,
}

impl Navigator {
    /// Creates a navigator with the default configuration.
    pub fn new(model: Model) -> Self {
        Self::with_config(model, Config::default())
    }

    /// Creates a navigator with the given configuration.
    pub fn with_config(mut model: Model, config: Config) -> Self {
        if config.navigation.suppress_change_notifications {
            model.suppress_change_notifications = true;
        }
        Self {
            model,
            events: EventLog::new(config.announce.trace_events),
            effects: Vec::new(),
            scanner: WordScanner::new(config.words.extra_word_chars.clone()),
            config,
        }
    }

    /// Builds the formula described by `spec` and wraps it.
    pub fn from_spec(spec: &FormulaSpec, config: Config) -> NavResult<Self> {
        let tree = spec.build()?;
        Ok(Self::with_config(Model::new(tree), config))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Removes and returns the announcements made so far.
    pub fn take_events(&mut self) -> Vec<NavEvent> {
        self.events.drain()
    }

    pub fn effects(&self) -> &[NavEffect] {
        &self.effects
    }

    /// Removes and returns the formula changes made so far.
    pub fn take_effects(&mut self) -> Vec<NavEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn word_scanner(&self) -> &WordScanner {
        &self.scanner
    }

    // ==================== Entry points ====================

    /// Moves one step in `direction` and settles any escape with `host`.
    pub fn move_cursor(
        &mut self,
        direction: NavDirection,
        options: NavOptions,
        host: &mut dyn MoveOutHandler,
    ) -> bool {
        let outcome = self.step(direction, options);
        self.settle(outcome, host)
    }

    /// Turns an engine outcome into the boolean result protocol.
    pub fn settle(&mut self, outcome: Outcome, host: &mut dyn MoveOutHandler) -> bool {
        let direction = match outcome {
            Outcome::Moved => return true,
            Outcome::Rejected => return false,
            Outcome::Escaped(direction) => direction,
        };

        let default_behavior = if self.model.suppress_change_notifications {
            true
        } else {
            host.move_out(&self.model, direction)
        };
        tracing::debug!(%direction, default_behavior, "move out");

        if direction.is_vertical() {
            let announcement = if default_behavior {
                Announcement::Plonk
            } else {
                Announcement::Line
            };
            self.announce(announcement, None);
        } else if default_behavior {
            self.announce(Announcement::Plonk, None);
        }
        default_behavior
    }

    /// Runs a command.
    pub fn execute(&mut self, command: NavCommand, host: &mut dyn MoveOutHandler) -> bool {
        tracing::debug!(%command, position = self.model.position(), "execute");
        match command {
            NavCommand::Move { direction, extend } => {
                self.move_cursor(direction, NavOptions { extend }, host)
            }
            NavCommand::Skip { direction, extend } => self.skip(direction, NavOptions { extend }),
            NavCommand::GroupEdge { direction, extend } => {
                self.move_to_group_edge(direction, NavOptions { extend })
            }
            NavCommand::Edge { direction, extend } => {
                self.move_to_edge(direction, NavOptions { extend })
            }
            NavCommand::SelectAll => self.select_all(),
            NavCommand::SelectWord => self.select_word(),
        }
    }

    // ==================== Shared helpers ====================

    pub(crate) fn announce(&mut self, announcement: Announcement, previous: Option<Offset>) {
        self.events.emit(announcement, previous);
    }

    pub(crate) fn record(&mut self, effect: NavEffect) {
        tracing::debug!(?effect, "navigation effect");
        self.effects.push(effect);
    }

    /// Announces a plonk and reports failure.
    pub(crate) fn plonk(&mut self) -> bool {
        self.announce(Announcement::Plonk, None);
        false
    }

    /// Puts the caret (or the active end, when extending) at `target`.
    pub(crate) fn land(&mut self, target: Offset, previous: Offset, options: NavOptions) -> bool {
        if options.extend {
            let anchor = self.model.anchor();
            if !self.model.set_selection(anchor, target) {
                return self.plonk();
            }
        } else {
            if target == self.model.position() && self.model.is_collapsed() {
                return self.plonk();
            }
            self.model.set_position(target);
        }
        self.announce(Announcement::Move, Some(previous));
        true
    }

    /// Sets the caret, selecting a placeholder at or right after it.
    pub(crate) fn set_position_handling_placeholder(&mut self, offset: Offset) {
        let tree = self.model.tree();
        let here = self.model.at(offset);
        let is_placeholder = |id: AtomId| tree.atom(id).kind == AtomKind::Placeholder;

        if here.is_some_and(is_placeholder) {
            self.model.set_selection(offset.saturating_sub(1), offset);
        } else if here
            .and_then(|id| tree.right_sibling(id))
            .is_some_and(is_placeholder)
        {
            self.model.set_selection(offset, offset + 1);
        } else {
            self.model.set_position(offset);
        }
    }

    /// Commits a pending autocomplete character.
    pub(crate) fn accept_suggestion(&mut self, id: AtomId) {
        if self.model.atom(id).is_pending_suggestion() {
            self.model.set_suggestion(id, false);
            self.record(NavEffect::SuggestionAccepted(id));
        }
    }

    /// Deletes the pending autocomplete run, if any.
    pub(crate) fn discard_suggestion(&mut self) {
        if let Some(range) = self.model.command_suggestion_range() {
            let atoms = self.model.delete_atoms(range);
            self.record(NavEffect::SuggestionDiscarded { range, atoms });
        }
    }
}

impl From<Model> for Navigator {
    fn from(model: Model) -> Self {
        Self::new(model)
    }
}
