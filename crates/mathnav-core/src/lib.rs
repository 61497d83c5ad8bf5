//! # Mathnav Core
//!
//! Caret and selection navigation over a [`mathnav_model::Model`].
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Navigator                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌──────────────────────┐│
//! │  │   Keymap    │ │   Config    │ │  EventLog / effects  ││
//! │  └─────────────┘ └─────────────┘ └──────────────────────┘│
//! │         │                                                 │
//! │  ┌──────┴───────────────────────────────────────┐        │
//! │  │                  Engines                      │        │
//! │  │  ┌──────┐ ┌──────┐ ┌──────────┐ ┌──────────┐ │        │
//! │  │  │ word │ │ skip │ │   step   │ │ vertical │ │        │
//! │  │  └──────┘ └──────┘ └──────────┘ └──────────┘ │        │
//! │  └───────────────────────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Engines never call back into the host. A move that runs off the edge of
//! the formula comes back as [`Outcome::Escaped`], and the `Navigator`
//! settles it with the caller's [`MoveOutHandler`].

pub mod command;
pub mod config;
mod edges;
pub mod event;
pub mod keymap;
pub mod navigator;
mod skip;
mod step;
#[cfg(test)]
mod testing;
mod vertical;
pub mod word;

pub use command::NavCommand;
pub use config::{Config, ConfigError};
pub use event::{Announcement, EventLog, NavEffect, NavEvent};
pub use keymap::{Key, KeyPress, Keymap, KeymapResult, Modifiers};
pub use navigator::{
    AlwaysPlonk, MoveOutHandler, NavDirection, NavOptions, Navigator, Outcome,
};
pub use word::{word_boundary_offset, WordScanner};

/// Result type for core operations
pub type NavResult<T> = Result<T, NavError>;

/// Errors raised outside of navigation itself (parsing, setup).
///
/// Navigation never fails with an error: a move that can't happen
/// returns `false` and announces a plonk.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown direction: {0}")]
    UnknownDirection(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("No binding for {0}")]
    Unbound(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] mathnav_model::ModelError),
}
