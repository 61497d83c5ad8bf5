//! Announcements and side effects produced by navigation.
//!
//! ## Learning: Events as Values
//!
//! Navigation doesn't hold a reference to whatever speaks announcements
//! or repaints the formula. Each call appends plain values to a log and
//! the host drains it when convenient. Nothing borrows across calls and
//! a test can simply compare vectors.

use std::fmt;

use mathnav_model::{AtomId, Branch, Offset};
use serde::{Deserialize, Serialize};

/// What the accessibility layer is told after a navigation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Announcement {
    /// The caret or selection moved
    Move,
    /// Moved into a branch or cell above
    MoveUp,
    /// Moved into a branch or cell below
    MoveDown,
    /// Nothing happened (edge reached, degenerate move)
    Plonk,
    /// A vertical escape was taken by the host
    Line,
}

impl Announcement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Announcement::Move => "move",
            Announcement::MoveUp => "move up",
            Announcement::MoveDown => "move down",
            Announcement::Plonk => "plonk",
            Announcement::Line => "line",
        }
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One announcement with the caret position before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEvent {
    pub announcement: Announcement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_position: Option<Offset>,
}

/// A change navigation made to the formula itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    /// A pending autocomplete character was committed
    SuggestionAccepted(AtomId),
    /// A pending suggestion run was deleted
    SuggestionDiscarded {
        range: (Offset, Offset),
        atoms: Vec<AtomId>,
    },
    /// An empty branch was added so the caret could enter it
    BranchCreated { atom: AtomId, branch: Branch },
}

/// Append-only log of announcements.
///
/// The log is unbounded; callers empty it with [`EventLog::drain`].
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<NavEvent>,
    /// Mirror every announcement as a tracing event
    trace: bool,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new(trace: bool) -> Self {
        Self {
            events: Vec::new(),
            trace,
        }
    }

    /// Records an announcement.
    pub fn emit(&mut self, announcement: Announcement, previous_position: Option<Offset>) {
        if self.trace {
            tracing::debug!(event = %announcement, previous = ?previous_position, "announce");
        }
        self.events.push(NavEvent {
            announcement,
            previous_position,
        });
    }

    pub fn events(&self) -> &[NavEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&NavEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and returns everything logged so far.
    pub fn drain(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(true)
    }
}
