//! Navigation commands.
//!
//! ## Learning: The Command Pattern
//!
//! Commands turn navigation intents into values:
//! - they can be bound to keys, replayed from a script, logged
//! - the keymap and the CLI share one parser (`FromStr`)
//! - `Display` prints the same name back, so parsing round-trips
//!
//! Names are kebab-case: `move-forward`, `extend-upward`,
//! `skip-backward`, `extend-skip-forward`, `group-start`, `end`,
//! `select-all`, `select-word`.

use std::fmt;
use std::str::FromStr;

use mathnav_model::Direction;
use serde::{Deserialize, Serialize};

use crate::navigator::NavDirection;
use crate::NavError;

/// Built-in navigation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NavCommand {
    /// One step (`move-*`, or `extend-*` when extending)
    Move { direction: NavDirection, extend: bool },
    /// Word, command, fence or run (`skip-*`)
    Skip { direction: Direction, extend: bool },
    /// Start or end of the current branch (`group-start`, `group-end`)
    GroupEdge { direction: Direction, extend: bool },
    /// Start or end of the formula (`start`, `end`)
    Edge { direction: Direction, extend: bool },
    SelectAll,
    SelectWord,
}

impl NavCommand {
    pub const fn step(direction: NavDirection) -> Self {
        NavCommand::Move {
            direction,
            extend: false,
        }
    }

    pub const fn extend(direction: NavDirection) -> Self {
        NavCommand::Move {
            direction,
            extend: true,
        }
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            NavCommand::Move { direction, extend } => match (direction, extend) {
                (NavDirection::Forward, false) => "Move Forward",
                (NavDirection::Backward, false) => "Move Backward",
                (NavDirection::Upward, false) => "Move Up",
                (NavDirection::Downward, false) => "Move Down",
                (NavDirection::Forward, true) => "Extend Forward",
                (NavDirection::Backward, true) => "Extend Backward",
                (NavDirection::Upward, true) => "Extend Up",
                (NavDirection::Downward, true) => "Extend Down",
            },
            NavCommand::Skip { direction, extend } => match (direction, extend) {
                (Direction::Forward, false) => "Skip Forward",
                (Direction::Backward, false) => "Skip Backward",
                (Direction::Forward, true) => "Extend Skip Forward",
                (Direction::Backward, true) => "Extend Skip Backward",
            },
            NavCommand::GroupEdge { direction, .. } => match direction {
                Direction::Forward => "Move to Group End",
                Direction::Backward => "Move to Group Start",
            },
            NavCommand::Edge { direction, .. } => match direction {
                Direction::Forward => "Move to End",
                Direction::Backward => "Move to Start",
            },
            NavCommand::SelectAll => "Select All",
            NavCommand::SelectWord => "Select Word",
        }
    }

    /// Returns true if the command keeps the selection anchor.
    pub fn extends(&self) -> bool {
        match self {
            NavCommand::Move { extend, .. }
            | NavCommand::Skip { extend, .. }
            | NavCommand::GroupEdge { extend, .. }
            | NavCommand::Edge { extend, .. } => *extend,
            NavCommand::SelectAll | NavCommand::SelectWord => false,
        }
    }

    /// Parses a whitespace-separated list of command names.
    pub fn parse_script(script: &str) -> Result<Vec<NavCommand>, NavError> {
        script.split_whitespace().map(str::parse).collect()
    }
}

fn parse_horizontal(s: &str, whole: &str) -> Result<Direction, NavError> {
    match s {
        "forward" => Ok(Direction::Forward),
        "backward" => Ok(Direction::Backward),
        _ => Err(NavError::UnknownCommand(whole.to_string())),
    }
}

impl FromStr for NavCommand {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || NavError::UnknownCommand(s.to_string());
        let (extend, rest) = match s.strip_prefix("extend-") {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let command = match rest {
            "start" => NavCommand::Edge {
                direction: Direction::Backward,
                extend,
            },
            "end" => NavCommand::Edge {
                direction: Direction::Forward,
                extend,
            },
            "group-start" => NavCommand::GroupEdge {
                direction: Direction::Backward,
                extend,
            },
            "group-end" => NavCommand::GroupEdge {
                direction: Direction::Forward,
                extend,
            },
            "select-all" if !extend => NavCommand::SelectAll,
            "select-word" if !extend => NavCommand::SelectWord,
            _ => {
                if let Some(direction) = rest.strip_prefix("skip-") {
                    NavCommand::Skip {
                        direction: parse_horizontal(direction, s)?,
                        extend,
                    }
                } else if extend {
                    NavCommand::Move {
                        direction: rest.parse().map_err(|_| unknown())?,
                        extend,
                    }
                } else if let Some(direction) = rest.strip_prefix("move-") {
                    NavCommand::Move {
                        direction: direction.parse().map_err(|_| unknown())?,
                        extend,
                    }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(command)
    }
}

impl fmt::Display for NavCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.extends() { "extend-" } else { "" };
        let horizontal = |direction: &Direction| match direction {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        };
        match self {
            NavCommand::Move {
                direction,
                extend: false,
            } => write!(f, "move-{direction}"),
            NavCommand::Move { direction, .. } => write!(f, "extend-{direction}"),
            NavCommand::Skip { direction, .. } => {
                write!(f, "{prefix}skip-{}", horizontal(direction))
            }
            NavCommand::GroupEdge { direction, .. } => match direction {
                Direction::Forward => write!(f, "{prefix}group-end"),
                Direction::Backward => write!(f, "{prefix}group-start"),
            },
            NavCommand::Edge { direction, .. } => match direction {
                Direction::Forward => write!(f, "{prefix}end"),
                Direction::Backward => write!(f, "{prefix}start"),
            },
            NavCommand::SelectAll => f.write_str("select-all"),
            NavCommand::SelectWord => f.write_str("select-word"),
        }
    }
}

impl TryFrom<String> for NavCommand {
    type Error = NavError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NavCommand> for String {
    fn from(command: NavCommand) -> Self {
        command.to_string()
    }
}
