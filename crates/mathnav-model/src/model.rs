//! The navigation model: tree, offset index and selection state.
//!
//! ## Learning: Derived State
//!
//! `offsets` is computed from `tree`. Every method that mutates the tree
//! calls `reindex()` before returning, so no caller can observe offsets
//! that disagree with the tree.

use std::cmp::Ordering;

use crate::atom::{Atom, AtomId, AtomKind, Branch};
use crate::offsets::OffsetMap;
use crate::selection::{Direction, Offset, Range, Selection, SelectionDirection};
use crate::tree::AtomTree;
use crate::ModelResult;

/// A formula tree together with its caret/selection state.
#[derive(Debug, Clone)]
pub struct Model {
    tree: AtomTree,
    offsets: OffsetMap,

    /// Pivot of the selection
    anchor: Offset,
    /// Active end of the selection (the caret)
    position: Offset,
    selection: Selection,

    /// While set, host hooks must not be consulted (bulk/programmatic edits)
    pub suppress_change_notifications: bool,
}

impl Model {
    /// Creates a model with the caret at offset 0.
    pub fn new(tree: AtomTree) -> Self {
        let offsets = OffsetMap::build(&tree);
        Self {
            tree,
            offsets,
            anchor: 0,
            position: 0,
            selection: Selection::collapsed(0),
            suppress_change_notifications: false,
        }
    }

    pub fn tree(&self) -> &AtomTree {
        &self.tree
    }

    pub fn offsets(&self) -> &OffsetMap {
        &self.offsets
    }

    // ==================== Offset queries ====================

    /// The atom at `offset`.
    pub fn at(&self, offset: Offset) -> Option<AtomId> {
        self.offsets.atom_at(offset)
    }

    /// Like [`Model::at`], for offsets computed with signed arithmetic.
    pub fn at_signed(&self, offset: isize) -> Option<AtomId> {
        usize::try_from(offset).ok().and_then(|o| self.at(o))
    }

    pub fn atom(&self, id: AtomId) -> &Atom {
        self.tree.atom(id)
    }

    pub fn atom_at(&self, offset: Offset) -> Option<&Atom> {
        self.at(offset).map(|id| self.tree.atom(id))
    }

    pub fn kind_at(&self, offset: Offset) -> Option<AtomKind> {
        self.atom_at(offset).map(|atom| atom.kind)
    }

    pub fn offset_of(&self, id: AtomId) -> Option<Offset> {
        self.offsets.offset_of(id)
    }

    pub fn last_offset(&self) -> Offset {
        self.offsets.last_offset()
    }

    // ==================== Selection state ====================

    pub fn position(&self) -> Offset {
        self.position
    }

    pub fn anchor(&self) -> Offset {
        self.anchor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns true if the selection is a bare caret.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.position && self.selection.is_collapsed()
    }

    /// Collapses the selection at `offset` (clamped).
    pub fn set_position(&mut self, offset: Offset) {
        self.set_selection(offset, offset);
    }

    /// Selects from `anchor` to `position`. Returns true if the selection
    /// changed.
    pub fn set_selection(&mut self, anchor: Offset, position: Offset) -> bool {
        let last = self.last_offset();
        let anchor = anchor.min(last);
        let position = position.min(last);
        let direction = match position.cmp(&anchor) {
            Ordering::Greater => SelectionDirection::Forward,
            Ordering::Less => SelectionDirection::Backward,
            Ordering::Equal => SelectionDirection::None,
        };
        self.apply(anchor, position, Selection::single(anchor, position, direction))
    }

    /// Replaces the selection with explicit ranges. Returns true if the
    /// selection changed.
    pub fn set_selection_ranges(&mut self, mut selection: Selection) -> bool {
        selection.normalize(self.last_offset());
        let (anchor, position) = match selection.direction {
            SelectionDirection::Backward => (selection.end(), selection.start()),
            _ => (selection.start(), selection.end()),
        };
        self.apply(anchor, position, selection)
    }

    fn apply(&mut self, anchor: Offset, position: Offset, selection: Selection) -> bool {
        let changed =
            self.anchor != anchor || self.position != position || self.selection != selection;
        self.anchor = anchor;
        self.position = position;
        self.selection = selection;
        changed
    }

    /// Collapses a non-empty selection to its start (backward) or end
    /// (forward). Returns false if it was already collapsed.
    pub fn collapse_selection(&mut self, direction: Direction) -> bool {
        if self.is_collapsed() {
            return false;
        }
        let offset = match direction {
            Direction::Backward => self.selection.start(),
            Direction::Forward => self.selection.end(),
        };
        self.set_position(offset);
        true
    }

    /// Keeps the anchor and moves the caret one offset. Returns false at
    /// the edges of the model.
    pub fn extend_selection(&mut self, direction: Direction) -> bool {
        let position = match direction {
            Direction::Forward if self.position < self.last_offset() => self.position + 1,
            Direction::Backward if self.position > 0 => self.position - 1,
            _ => return false,
        };
        self.set_selection(self.anchor, position)
    }

    /// Returns true if the selection covers exactly one placeholder.
    pub fn selection_is_placeholder(&self) -> bool {
        self.anchor.abs_diff(self.position) == 1
            && self.kind_at(self.anchor.max(self.position)) == Some(AtomKind::Placeholder)
    }

    // ==================== Mutation ====================

    /// The first run of pending suggestion atoms, as the caret range
    /// `(offset before the run, offset of its last atom)`.
    pub fn command_suggestion_range(&self) -> Option<(Offset, Offset)> {
        let last = self.last_offset();
        let is_pending = |offset: Offset| {
            self.atom_at(offset)
                .is_some_and(Atom::is_pending_suggestion)
        };
        let start = (0..=last).find(|&offset| is_pending(offset))?;
        let end = (start..=last)
            .find(|&offset| !is_pending(offset))
            .unwrap_or(last + 1);
        Some((start.saturating_sub(1), end - 1))
    }

    /// Removes the atoms covered by the caret range `(from, to)` and puts
    /// the caret at `from`. Returns the detached atoms.
    pub fn delete_atoms(&mut self, range: (Offset, Offset)) -> Vec<AtomId> {
        let Range { start, end } = Range::new(range.0, range.1);
        let covered: Vec<AtomId> = (start + 1..=end).filter_map(|o| self.at(o)).collect();
        let top_level: Vec<AtomId> = covered
            .iter()
            .copied()
            .filter(|&id| {
                !self
                    .tree
                    .parent(id)
                    .is_some_and(|parent| covered.contains(&parent))
            })
            .collect();

        let removed: Vec<AtomId> = top_level
            .into_iter()
            .filter(|&id| self.tree.detach(id))
            .collect();
        tracing::debug!(start, end, removed = removed.len(), "deleted atoms");

        self.reindex();
        self.set_position(start);
        removed
    }

    /// Adds an empty branch to `id` and reindexes.
    pub fn create_branch(&mut self, id: AtomId, branch: Branch) -> ModelResult<()> {
        self.tree.create_branch(id, branch)?;
        tracing::debug!(atom = %id, %branch, "created branch");
        self.reindex();
        Ok(())
    }

    /// Sets or clears the pending-suggestion flag of a latex atom.
    pub fn set_suggestion(&mut self, id: AtomId, pending: bool) {
        self.tree.atom_mut(id).is_suggestion = pending;
    }

    fn reindex(&mut self) {
        self.offsets = OffsetMap::build(&self.tree);
        let last = self.last_offset();
        self.anchor = self.anchor.min(last);
        self.position = self.position.min(last);
        self.selection.normalize(last);
    }
}

impl From<AtomTree> for Model {
    fn from(tree: AtomTree) -> Self {
        Self::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `x + [placeholder]` followed by a latex command `\fr` + suggestion `ac`.
    fn sample() -> Model {
        let mut tree = AtomTree::new();
        let root = tree.root();
        tree.push(root, Branch::Body, Atom::new(AtomKind::Ord, "x")).unwrap();
        tree.push(root, Branch::Body, Atom::new(AtomKind::Bin, "+")).unwrap();
        tree.push(root, Branch::Body, Atom::placeholder()).unwrap();
        let group = tree
            .push(root, Branch::Body, Atom::new(AtomKind::LatexGroup, ""))
            .unwrap();
        for c in ['\\', 'f', 'r'] {
            tree.push(group, Branch::Body, Atom::latex(c)).unwrap();
        }
        for c in ['a', 'c'] {
            tree.push(group, Branch::Body, Atom::latex(c).as_suggestion())
                .unwrap();
        }
        Model::new(tree)
    }

    #[test]
    fn test_set_selection_clamps_and_reports_change() {
        let mut model = sample();
        assert!(model.set_selection(1, 100));
        assert_eq!(model.position(), model.last_offset());
        assert_eq!(model.selection().direction, SelectionDirection::Forward);
        assert!(!model.set_selection(1, 100));
    }

    #[test]
    fn test_collapse_selection() {
        let mut model = sample();
        assert!(!model.collapse_selection(Direction::Forward));

        model.set_selection(3, 1);
        assert!(model.collapse_selection(Direction::Backward));
        assert_eq!(model.position(), 1);

        model.set_selection(1, 3);
        assert!(model.collapse_selection(Direction::Forward));
        assert_eq!(model.position(), 3);
    }

    #[test]
    fn test_extend_selection_stops_at_edges() {
        let mut model = sample();
        assert!(!model.extend_selection(Direction::Backward));
        assert!(model.extend_selection(Direction::Forward));
        assert_eq!(model.anchor(), 0);
        assert_eq!(model.position(), 1);

        model.set_position(model.last_offset());
        assert!(!model.extend_selection(Direction::Forward));
    }

    #[test]
    fn test_placeholder_selection() {
        let mut model = sample();
        model.set_selection(2, 3);
        assert!(model.selection_is_placeholder());
        model.set_selection(1, 3);
        assert!(!model.selection_is_placeholder());
    }

    #[test]
    fn test_suggestion_range_and_delete() {
        let mut model = sample();
        // first, x, +, placeholder, [first, \, f, r, a, c], group
        assert_eq!(model.command_suggestion_range(), Some((7, 9)));

        let removed = model.delete_atoms((7, 9));
        assert_eq!(removed.len(), 2);
        assert_eq!(model.position(), 7);
        assert_eq!(model.command_suggestion_range(), None);
        assert_eq!(model.last_offset(), 8);
    }

    #[test]
    fn test_create_branch_reindexes() {
        let mut model = sample();
        let x = model.at(1).unwrap();
        let before = model.last_offset();
        model.create_branch(x, Branch::Superscript).unwrap();
        assert_eq!(model.last_offset(), before + 1);
        // The new sentinel precedes its owner in the flattening
        assert_eq!(model.kind_at(1), Some(AtomKind::First));
        assert_eq!(model.offset_of(x), Some(2));
    }
}
