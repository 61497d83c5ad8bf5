//! # Mathnav Model
//!
//! The formula tree and its linear offset index.
//!
//! ## Key Concepts
//!
//! - `AtomTree` is an arena: atoms refer to each other by `AtomId`.
//! - `OffsetMap` flattens the tree so every caret gap has an integer offset.
//! - `Model` owns both plus the selection, and keeps them consistent:
//!   any mutation of the tree rebuilds the offsets before returning.

mod atom;
mod fixture;
mod model;
mod offsets;
mod selection;
mod tree;

pub use atom::{Atom, AtomId, AtomKind, Branch, Mode};
pub use fixture::{AtomSpec, FormulaSpec};
pub use model::Model;
pub use offsets::OffsetMap;
pub use selection::{Direction, Offset, Range, Selection, SelectionDirection};
pub use tree::AtomTree;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or editing a tree
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown atom: {0}")]
    UnknownAtom(AtomId),

    #[error("Atoms of kind {0} cannot hold branches")]
    NoBranches(AtomKind),

    #[error("Atom {0} is not an array")]
    NotAnArray(AtomId),

    #[error("Atom {atom} already has a {branch} branch")]
    BranchExists { atom: AtomId, branch: Branch },

    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
