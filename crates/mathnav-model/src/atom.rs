//! Atom types: the nodes of a formula tree.
//!
//! ## Learning: Closed Enums over Class Hierarchies
//!
//! Every atom carries an `AtomKind` tag. Navigation code asks the tag
//! for capabilities (`is_fence_open`, `is_text`, ...) instead of checking
//! a runtime type. Adding a kind forces every exhaustive `match` to be
//! revisited, which is exactly what we want for cursor policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable index of an atom inside an [`AtomTree`](crate::AtomTree) arena.
///
/// Ids are never reused: atoms detached from the tree keep their slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomId(pub(crate) u32);

impl AtomId {
    /// Returns the arena slot of this atom.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an atom. Determines navigation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomKind {
    /// The tree root. Never part of the offset flattening.
    Root,
    /// Synthetic sentinel at the start of every branch.
    First,
    /// Ordinary symbol (`x`, `2`, ...)
    Ord,
    /// Binary operator (`+`, `-`, ...)
    Bin,
    /// Relation (`=`, `<`, ...)
    Rel,
    Punct,
    /// Opening fence (`(`, `[`, ...)
    Open,
    /// Closing fence (`)`, `]`, ...)
    Close,
    Inner,
    /// Large operator (`\sum`, `\int`), may carry limits
    Op,
    /// Free-standing superscript/subscript attached to its left sibling
    SubSup,
    Placeholder,
    /// Fraction-like construct with `above`/`below` branches
    Genfrac,
    /// Square root
    Surd,
    /// Matrix/array whose branches are `[row, col]` cells
    Array,
    Group,
    /// A single character of a text zone
    Text,
    /// A single character of a LaTeX command being typed
    Latex,
    /// Container of the characters of a LaTeX command being typed
    LatexGroup,
}

impl AtomKind {
    /// Returns true for the branch sentinel.
    pub fn is_sentinel(self) -> bool {
        self == AtomKind::First
    }

    pub fn is_fence_open(self) -> bool {
        self == AtomKind::Open
    }

    pub fn is_fence_close(self) -> bool {
        self == AtomKind::Close
    }

    pub fn is_text(self) -> bool {
        self == AtomKind::Text
    }

    /// Returns true for the characters of a LaTeX command.
    pub fn is_command(self) -> bool {
        self == AtomKind::Latex
    }

    pub fn is_array(self) -> bool {
        self == AtomKind::Array
    }

    pub fn is_placeholder(self) -> bool {
        self == AtomKind::Placeholder
    }

    /// Returns true if atoms of this kind may own branches.
    pub fn can_have_branches(self) -> bool {
        !matches!(
            self,
            AtomKind::First | AtomKind::Placeholder | AtomKind::Text | AtomKind::Latex
        )
    }

    /// The mode an atom of this kind lives in unless told otherwise.
    pub fn default_mode(self) -> Mode {
        match self {
            AtomKind::Text => Mode::Text,
            AtomKind::Latex | AtomKind::LatexGroup => Mode::Latex,
            _ => Mode::Math,
        }
    }

    /// Returns the conventional short name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            AtomKind::Root => "root",
            AtomKind::First => "first",
            AtomKind::Ord => "mord",
            AtomKind::Bin => "mbin",
            AtomKind::Rel => "mrel",
            AtomKind::Punct => "mpunct",
            AtomKind::Open => "mopen",
            AtomKind::Close => "mclose",
            AtomKind::Inner => "minner",
            AtomKind::Op => "mop",
            AtomKind::SubSup => "msubsup",
            AtomKind::Placeholder => "placeholder",
            AtomKind::Genfrac => "genfrac",
            AtomKind::Surd => "surd",
            AtomKind::Array => "array",
            AtomKind::Group => "group",
            AtomKind::Text => "text",
            AtomKind::Latex => "latex",
            AtomKind::LatexGroup => "latexgroup",
        }
    }
}

impl std::fmt::Display for AtomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing mode of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Math,
    Text,
    Latex,
}

/// Names a child sequence of an atom.
///
/// The derived ordering is the canonical branch order used by the offset
/// flattening: named branches first, then array cells in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Body,
    Above,
    Below,
    Superscript,
    Subscript,
    /// An array cell addressed by `(row, col)`
    Cell(usize, usize),
}

impl Branch {
    /// The named (non-cell) branches, in canonical order.
    pub const NAMED: [Branch; 5] = [
        Branch::Body,
        Branch::Above,
        Branch::Below,
        Branch::Superscript,
        Branch::Subscript,
    ];

    /// Returns `(row, col)` for cell branches.
    pub fn cell(self) -> Option<(usize, usize)> {
        match self {
            Branch::Cell(row, col) => Some((row, col)),
            _ => None,
        }
    }

    pub fn is_cell(self) -> bool {
        self.cell().is_some()
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Branch::Body => write!(f, "body"),
            Branch::Above => write!(f, "above"),
            Branch::Below => write!(f, "below"),
            Branch::Superscript => write!(f, "superscript"),
            Branch::Subscript => write!(f, "subscript"),
            Branch::Cell(row, col) => write!(f, "[{}, {}]", row, col),
        }
    }
}

/// A node of the formula tree.
///
/// Structural links (`parent`, `branches`) are arena indices owned by the
/// tree, so they are only mutable through [`AtomTree`](crate::AtomTree).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// What this atom is
    pub kind: AtomKind,
    /// Mode the atom was typed in
    pub mode: Mode,
    /// Literal character(s) the atom stands for
    pub value: String,
    /// Selecting anything inside this atom selects the atom as a whole
    pub capture_selection: bool,
    /// Entering or leaving this atom's branches is a single step
    pub skip_boundary: bool,
    /// Uncommitted autocomplete character (latex atoms only)
    pub is_suggestion: bool,

    pub(crate) parent: Option<AtomId>,
    pub(crate) tree_branch: Option<Branch>,
    pub(crate) branches: BTreeMap<Branch, Vec<AtomId>>,
}

impl Atom {
    /// Creates a detached atom in the default mode of its kind.
    pub fn new(kind: AtomKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            mode: kind.default_mode(),
            value: value.into(),
            capture_selection: false,
            skip_boundary: false,
            is_suggestion: false,
            parent: None,
            tree_branch: None,
            branches: BTreeMap::new(),
        }
    }

    /// A single text-mode character.
    pub fn text(c: char) -> Self {
        Self::new(AtomKind::Text, c.to_string())
    }

    /// A single character of a LaTeX command.
    pub fn latex(c: char) -> Self {
        Self::new(AtomKind::Latex, c.to_string())
    }

    pub fn placeholder() -> Self {
        Self::new(AtomKind::Placeholder, "")
    }

    pub(crate) fn sentinel(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::new(AtomKind::First, "")
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_capture_selection(mut self) -> Self {
        self.capture_selection = true;
        self
    }

    pub fn with_skip_boundary(mut self) -> Self {
        self.skip_boundary = true;
        self
    }

    /// Marks a latex atom as a pending suggestion.
    pub fn as_suggestion(mut self) -> Self {
        self.is_suggestion = true;
        self
    }

    /// The parent atom, `None` for the root and detached atoms.
    pub fn parent(&self) -> Option<AtomId> {
        self.parent
    }

    /// Which branch of the parent this atom belongs to.
    pub fn tree_branch(&self) -> Option<Branch> {
        self.tree_branch
    }

    /// Returns true if the atom owns the given branch.
    pub fn has_branch(&self, branch: Branch) -> bool {
        self.branches.contains_key(&branch)
    }

    /// Returns true if this is a latex atom waiting to be accepted.
    pub fn is_pending_suggestion(&self) -> bool {
        self.kind.is_command() && self.is_suggestion
    }

    /// Returns true if the value is a single ASCII letter or digit.
    pub fn is_alphanumeric(&self) -> bool {
        !self.value.is_empty() && self.value.chars().all(|c| c.is_ascii_alphanumeric())
    }

    pub fn is_whitespace(&self) -> bool {
        self.value.chars().any(char::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_canonical_order() {
        let mut branches = vec![
            Branch::Cell(1, 0),
            Branch::Subscript,
            Branch::Cell(0, 1),
            Branch::Body,
            Branch::Above,
            Branch::Cell(0, 0),
        ];
        branches.sort();
        assert_eq!(
            branches,
            vec![
                Branch::Body,
                Branch::Above,
                Branch::Subscript,
                Branch::Cell(0, 0),
                Branch::Cell(0, 1),
                Branch::Cell(1, 0),
            ]
        );
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(AtomKind::Open.is_fence_open());
        assert!(AtomKind::Close.is_fence_close());
        assert!(!AtomKind::First.can_have_branches());
        assert!(AtomKind::Genfrac.can_have_branches());
        assert_eq!(AtomKind::Text.default_mode(), Mode::Text);
        assert_eq!(AtomKind::SubSup.to_string(), "msubsup");
    }

    #[test]
    fn test_character_classes() {
        assert!(Atom::text('a').is_alphanumeric());
        assert!(Atom::text('7').is_alphanumeric());
        assert!(!Atom::text('+').is_alphanumeric());
        assert!(Atom::text(' ').is_whitespace());
        assert!(!Atom::placeholder().is_alphanumeric());
    }
}
