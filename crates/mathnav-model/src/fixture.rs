//! Serializable description of a formula tree.
//!
//! Trees are normally built by the editor itself; fixtures exist so tests,
//! benchmarks and the replay CLI can describe formulas as JSON:
//!
//! ```json
//! { "body": [
//!     { "kind": "ord", "value": "x" },
//!     { "kind": "genfrac",
//!       "above": [{ "kind": "ord", "value": "1" }],
//!       "below": [{ "kind": "placeholder" }] },
//!     { "kind": "text", "value": " where" }
//! ] }
//! ```
//!
//! A `text` or `latex` spec with a multi-character value expands to one
//! atom per character.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atom::{Atom, AtomId, AtomKind, Branch, Mode};
use crate::tree::AtomTree;
use crate::ModelResult;

/// A whole formula: the content of the root body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaSpec {
    #[serde(default)]
    pub body: Vec<AtomSpec>,
}

/// One atom and its branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSpec {
    pub kind: AtomKind,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<AtomSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<Vec<AtomSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<Vec<AtomSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superscript: Option<Vec<AtomSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscript: Option<Vec<AtomSpec>>,
    /// Array cells, row-major: `cells[row][col]` is the cell content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Vec<Vec<AtomSpec>>>>,

    #[serde(default)]
    pub capture_selection: bool,
    #[serde(default)]
    pub skip_boundary: bool,
    #[serde(default)]
    pub suggestion: bool,
}

impl AtomSpec {
    /// A leaf spec of the given kind.
    pub fn leaf(kind: AtomKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            mode: None,
            body: None,
            above: None,
            below: None,
            superscript: None,
            subscript: None,
            cells: None,
            capture_selection: false,
            skip_boundary: false,
            suggestion: false,
        }
    }

    fn to_atom(&self, value: String) -> Atom {
        let mut atom = Atom::new(self.kind, value);
        if let Some(mode) = self.mode {
            atom = atom.with_mode(mode);
        }
        atom.capture_selection = self.capture_selection;
        atom.skip_boundary = self.skip_boundary;
        atom.is_suggestion = self.suggestion;
        atom
    }

    fn expands(&self) -> bool {
        matches!(self.kind, AtomKind::Text | AtomKind::Latex) && self.value.chars().count() > 1
    }

    fn named_branches(&self) -> [(Branch, Option<&Vec<AtomSpec>>); 5] {
        [
            (Branch::Body, self.body.as_ref()),
            (Branch::Above, self.above.as_ref()),
            (Branch::Below, self.below.as_ref()),
            (Branch::Superscript, self.superscript.as_ref()),
            (Branch::Subscript, self.subscript.as_ref()),
        ]
    }
}

impl FormulaSpec {
    /// Parses a JSON fixture.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Builds the described tree.
    pub fn build(&self) -> ModelResult<AtomTree> {
        let mut tree = AtomTree::new();
        let root = tree.root();
        build_into(&mut tree, root, Branch::Body, &self.body)?;
        Ok(tree)
    }
}

fn build_into(
    tree: &mut AtomTree,
    parent: AtomId,
    branch: Branch,
    specs: &[AtomSpec],
) -> ModelResult<()> {
    for spec in specs {
        if spec.expands() {
            for c in spec.value.chars() {
                tree.push(parent, branch, spec.to_atom(c.to_string()))?;
            }
            continue;
        }

        let id = tree.push(parent, branch, spec.to_atom(spec.value.clone()))?;
        for (name, children) in spec.named_branches() {
            if let Some(children) = children {
                tree.create_branch(id, name)?;
                build_into(tree, id, name, children)?;
            }
        }
        if let Some(rows) = &spec.cells {
            for (row, cells) in rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    let name = Branch::Cell(row, col);
                    tree.create_branch(id, name)?;
                    build_into(tree, id, name, cell)?;
                }
            }
        }
    }
    Ok(())
}
